//! Storage contracts, persisted key layout, and built-in key-value stores.

pub mod credential;
pub mod file;
pub mod memory;

pub use credential::*;
pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	error::{self, DecodeError},
};

/// Key → value mapping exchanged with a [`KeyValueStore`]; absent keys are simply missing.
pub type Entries = BTreeMap<String, String>;

/// Boxed future returned by [`KeyValueStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Asynchronous, string-valued persistence contract scoped by exact key name.
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	/// Reads every requested key in one batch; missing keys are omitted from the result.
	fn get_many<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, Entries>;

	/// Writes every entry in one batch, replacing prior values key by key.
	fn set_many(&self, entries: Entries) -> StoreFuture<'_, ()>;

	/// Removes the provided keys; unknown keys are ignored.
	fn remove<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`KeyValueStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Logical keys of the persisted session layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Stored credential email.
	Email,
	/// Stored credential password.
	Password,
	/// Identifier of the selected tenant.
	SelectedTenant,
	/// JSON snapshot of the eligible tenants.
	Tenants,
	/// JSON appearance envelope for the selected tenant.
	Appearance,
	/// JSON printer configuration.
	Printer,
	/// Login flag, `"true"` while a credential is stored.
	LoggedIn,
}
impl StorageKey {
	/// Keys removed on logout; the printer configuration is device state and survives.
	pub const SESSION: [Self; 6] = [
		Self::Email,
		Self::Password,
		Self::SelectedTenant,
		Self::Tenants,
		Self::Appearance,
		Self::LoggedIn,
	];

	/// Returns the exact key name used in storage.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Email => "@Email",
			Self::Password => "@Password",
			Self::SelectedTenant => "@SelectedChurchId",
			Self::Tenants => "@UserChurches",
			Self::Appearance => "@ChurchAppearance",
			Self::Printer => "@Printer",
			Self::LoggedIn => "@Login",
		}
	}
}
impl Display for StorageKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of decoding a cached JSON value.
#[derive(Debug)]
pub enum Decoded<T> {
	/// Value was stored and decoded.
	Present(T),
	/// Nothing was stored under the key.
	Absent,
	/// A value was stored but could not be decoded; callers discard it and re-fetch.
	Corrupt(DecodeError),
}
impl<T> Decoded<T>
where
	T: serde::de::DeserializeOwned,
{
	/// Decodes an optional raw string, separating absence from corruption.
	pub fn from_raw(what: &'static str, raw: Option<&str>) -> Self {
		match raw {
			None => Self::Absent,
			Some(raw) if raw.trim().is_empty() => Self::Absent,
			Some(raw) => match error::decode_str(what, raw) {
				Ok(value) => Self::Present(value),
				Err(e) => Self::Corrupt(e),
			},
		}
	}
}
impl<T> Decoded<T> {
	/// Converts into an option, discarding corruption details.
	pub fn present(self) -> Option<T> {
		match self {
			Self::Present(value) => Some(value),
			Self::Absent | Self::Corrupt(_) => None,
		}
	}

	/// Returns `true` when a stored value failed to decode.
	pub fn is_corrupt(&self) -> bool {
		matches!(self, Self::Corrupt(_))
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_session_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let session_error: Error = store_error.clone().into();

		assert!(matches!(session_error, Error::Storage(_)));
		assert!(session_error.to_string().contains("database unreachable"));

		let source = StdError::source(&session_error)
			.expect("Session error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn decoded_separates_absence_from_corruption() {
		assert!(matches!(Decoded::<Vec<u8>>::from_raw("fixture", None), Decoded::Absent));
		assert!(matches!(Decoded::<Vec<u8>>::from_raw("fixture", Some("")), Decoded::Absent));
		assert!(Decoded::<Vec<u8>>::from_raw("fixture", Some("[1, 2")).is_corrupt());

		let decoded = Decoded::<Vec<u8>>::from_raw("fixture", Some("[1,2]"));

		assert_eq!(decoded.present(), Some(vec![1, 2]));
	}

	#[test]
	fn session_keys_keep_the_printer() {
		assert!(!StorageKey::SESSION.contains(&StorageKey::Printer));
		assert_eq!(StorageKey::SelectedTenant.as_str(), "@SelectedChurchId");
	}
}
