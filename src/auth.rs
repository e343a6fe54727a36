//! Auth-domain identifiers, secrets, permission sets, service grants, and token claims.

pub mod claims;
pub mod grant;
pub mod id;
pub mod permission;
pub mod secret;

pub use claims::*;
pub use grant::*;
pub use id::*;
pub use permission::*;
pub use secret::*;
