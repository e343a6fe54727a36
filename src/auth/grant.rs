//! Service grants issued per tenant by the login endpoint.

// self
use crate::{
	_prelude::*,
	auth::{PermissionSet, ServiceName, TokenSecret},
};

/// Bearer token plus permissions scoped to one backend service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGrant {
	/// Service the grant authorizes.
	pub service: ServiceName,
	/// Bearer token attached to requests for the service.
	pub token: TokenSecret,
	/// Permissions the token carries.
	#[serde(default)]
	pub permissions: PermissionSet,
}
impl ServiceGrant {
	/// Creates a grant from its parts.
	pub fn new(service: ServiceName, token: impl Into<String>, permissions: PermissionSet) -> Self {
		Self { service, token: TokenSecret::new(token), permissions }
	}

	/// Returns `true` when the grant carries a usable token.
	pub fn is_usable(&self) -> bool {
		!self.token.is_empty()
	}
}
