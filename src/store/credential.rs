//! Typed facade over a [`KeyValueStore`] that never lets storage failures stop a session.
//!
//! Reads absorb backend failures (logged, then reported as "absent") so callers always take
//! their fallback path. Writes return [`StoreError`] and callers decide whether to log or
//! propagate. Structured values are JSON-encoded here and decoded into [`Decoded`] so a
//! corrupt cache entry is an explicit branch rather than an error.

// self
use crate::{
	_prelude::*,
	auth::Password,
	device::PrinterConfig,
	obs,
	store::{Decoded, Entries, KeyValueStore, StorageKey, StoreError},
	tenant::CachedAppearance,
};

/// Stored login credential; both fields are always present together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
	/// Account email.
	pub email: String,
	/// Account password (or password placeholder token).
	pub password: Password,
}
impl Credential {
	/// Builds a credential, returning `None` unless both fields are non-empty.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Option<Self> {
		let email = email.into();
		let password = password.into();

		if email.trim().is_empty() || password.is_empty() {
			return None;
		}

		Some(Self { email, password: Password::new(password) })
	}

	/// Storage entries written for this credential, including the login flag.
	pub fn entries(&self) -> Vec<(StorageKey, String)> {
		vec![
			(StorageKey::Email, self.email.clone()),
			(StorageKey::Password, self.password.expose().to_owned()),
			(StorageKey::LoggedIn, "true".to_owned()),
		]
	}

	fn from_values(values: &HashMap<StorageKey, String>) -> Option<Self> {
		let email = values.get(&StorageKey::Email)?;
		let password = values.get(&StorageKey::Password)?;

		Self::new(email.as_str(), password.as_str())
	}
}

/// Everything the bootstrap reads in its single batched restore.
#[derive(Debug)]
pub struct StoredSession {
	/// Stored credential, when both halves are present.
	pub credential: Option<Credential>,
	/// Identifier of the previously selected tenant.
	pub selected_tenant: Option<String>,
	/// Cached appearance envelope.
	pub appearance: Decoded<CachedAppearance>,
	/// Cached printer configuration.
	pub printer: Decoded<PrinterConfig>,
}

/// Scoped session persistence built on a shared [`KeyValueStore`].
#[derive(Clone)]
pub struct CredentialStore {
	backend: Arc<dyn KeyValueStore>,
}
impl CredentialStore {
	/// Wraps a backing store.
	pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
		Self { backend }
	}

	/// Reads the provided keys; a backend failure is logged and yields an empty mapping.
	pub async fn get(&self, keys: &[StorageKey]) -> HashMap<StorageKey, String> {
		let names = keys.iter().map(|key| key.as_str()).collect::<Vec<_>>();
		let entries = match self.backend.get_many(&names).await {
			Ok(entries) => entries,
			Err(e) => {
				obs::fallback("store.get", &e);

				return HashMap::new();
			},
		};

		keys.iter()
			.filter_map(|key| entries.get(key.as_str()).map(|value| (*key, value.clone())))
			.collect()
	}

	/// Reads and decodes one JSON-encoded key.
	pub async fn get_json<T>(&self, key: StorageKey, what: &'static str) -> Decoded<T>
	where
		T: serde::de::DeserializeOwned,
	{
		let values = self.get(&[key]).await;

		Decoded::from_raw(what, values.get(&key).map(String::as_str))
	}

	/// Writes a single key.
	pub async fn set(&self, key: StorageKey, value: impl Into<String>) -> Result<(), StoreError> {
		self.set_many([(key, value.into())]).await
	}

	/// JSON-encodes and writes a single key.
	pub async fn set_json<T>(&self, key: StorageKey, value: &T) -> Result<(), StoreError>
	where
		T: Serialize,
	{
		self.set(key, encode_json(key, value)?).await
	}

	/// Writes every entry in one batch.
	pub async fn set_many<I>(&self, entries: I) -> Result<(), StoreError>
	where
		I: IntoIterator<Item = (StorageKey, String)>,
	{
		let entries = entries
			.into_iter()
			.map(|(key, value)| (key.as_str().to_owned(), value))
			.collect::<Entries>();

		self.backend.set_many(entries).await
	}

	/// Removes the provided keys.
	pub async fn remove(&self, keys: &[StorageKey]) -> Result<(), StoreError> {
		let names = keys.iter().map(|key| key.as_str()).collect::<Vec<_>>();

		self.backend.remove(&names).await
	}

	/// Reads the stored credential, if both halves are present.
	pub async fn load_credential(&self) -> Option<Credential> {
		let values = self.get(&[StorageKey::Email, StorageKey::Password]).await;

		Credential::from_values(&values)
	}

	/// Persists the credential and the login flag in one batch.
	pub async fn save_credential(&self, credential: &Credential) -> Result<(), StoreError> {
		self.set_many(credential.entries()).await
	}

	/// Removes every session key; the printer configuration is kept.
	pub async fn forget_session(&self) -> Result<(), StoreError> {
		self.remove(&StorageKey::SESSION).await
	}

	/// Reads credential, selection, and cached device state in a single batch.
	pub async fn restore_session(&self) -> StoredSession {
		let values = self
			.get(&[
				StorageKey::Email,
				StorageKey::Password,
				StorageKey::SelectedTenant,
				StorageKey::Appearance,
				StorageKey::Printer,
			])
			.await;
		let raw = |key: StorageKey| values.get(&key).map(String::as_str);

		StoredSession {
			credential: Credential::from_values(&values),
			selected_tenant: raw(StorageKey::SelectedTenant)
				.map(str::trim)
				.filter(|id| !id.is_empty())
				.map(str::to_owned),
			appearance: Decoded::from_raw("appearance cache", raw(StorageKey::Appearance)),
			printer: Decoded::from_raw("printer config", raw(StorageKey::Printer)),
		}
	}
}
impl Debug for CredentialStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CredentialStore(..)")
	}
}

/// JSON-encodes a value destined for `key`.
pub(crate) fn encode_json<T>(key: StorageKey, value: &T) -> Result<String, StoreError>
where
	T: Serialize,
{
	serde_json::to_string(value).map_err(|e| StoreError::Serialization {
		message: format!("Failed to encode {key}: {e}"),
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::FailingStore, store::MemoryStore};

	fn store_over(backend: MemoryStore) -> CredentialStore {
		CredentialStore::new(Arc::new(backend))
	}

	#[tokio::test]
	async fn partial_credentials_read_as_absent() {
		let store = store_over(MemoryStore::seeded([("@Email", "usher@example.com")]));

		assert!(store.load_credential().await.is_none());

		let store = store_over(MemoryStore::seeded([("@Email", ""), ("@Password", "pw")]));

		assert!(store.load_credential().await.is_none());
	}

	#[tokio::test]
	async fn save_credential_sets_the_login_flag() {
		let backend = MemoryStore::default();
		let store = store_over(backend.clone());
		let credential =
			Credential::new("usher@example.com", "pw").expect("Credential should be valid.");

		store.save_credential(&credential).await.expect("Credential should persist.");

		assert_eq!(backend.peek("@Login").as_deref(), Some("true"));
		assert_eq!(store.load_credential().await, Some(credential));
	}

	#[tokio::test]
	async fn backend_failures_read_as_absent() {
		let store = CredentialStore::new(Arc::new(FailingStore));
		let restored = store.restore_session().await;

		assert!(restored.credential.is_none());
		assert!(matches!(restored.appearance, Decoded::Absent));
		assert!(store.set(StorageKey::Email, "x").await.is_err());
	}

	#[tokio::test]
	async fn forget_session_keeps_the_printer() {
		let backend = MemoryStore::seeded([
			("@Email", "usher@example.com"),
			("@Password", "pw"),
			("@SelectedChurchId", "42"),
			("@Login", "true"),
			("@Printer", "{\"ipAddress\":\"10.0.0.9\"}"),
		]);
		let store = store_over(backend.clone());

		store.forget_session().await.expect("Session keys should be removed.");

		assert_eq!(
			backend.snapshot().into_keys().collect::<Vec<_>>(),
			vec!["@Printer".to_owned()]
		);
	}

	#[tokio::test]
	async fn corrupt_printer_cache_is_reported_not_raised() {
		let store = store_over(MemoryStore::seeded([("@Printer", "{\"ipAddress\":")]));

		assert!(store.restore_session().await.printer.is_corrupt());
	}
}
