// std
use std::{path::PathBuf, sync::Arc};
// self
use checkin_session::{
	device::PrinterConfig,
	store::{
		Credential, CredentialStore, Decoded, FileStore, KeyValueStore, MemoryStore, StorageKey,
	},
};

fn scratch_path(name: &str) -> PathBuf {
	let dir = std::env::temp_dir().join(format!("checkin-session-it-{}", std::process::id()));

	dir.join(format!("{name}.json"))
}

fn credential_store(backend: impl KeyValueStore + 'static) -> CredentialStore {
	CredentialStore::new(Arc::new(backend))
}

#[tokio::test]
async fn file_store_survives_reopen() {
	let path = scratch_path("reopen");

	let _ = std::fs::remove_file(&path);

	let store = credential_store(FileStore::open(path.clone()).expect("Store should open."));
	let credential =
		Credential::new("usher@example.com", "pw").expect("Credential fixture should be complete.");

	store.save_credential(&credential).await.expect("Saving the credential should succeed.");
	store.set(StorageKey::SelectedTenant, "42").await.expect("Saving the selection should work.");

	let reopened = credential_store(FileStore::open(path.clone()).expect("Store should reopen."));
	let restored = reopened.restore_session().await;

	assert_eq!(restored.credential, Some(credential));
	assert_eq!(restored.selected_tenant.as_deref(), Some("42"));
	assert!(matches!(restored.appearance, Decoded::Absent));

	let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn logout_removal_keeps_device_configuration() {
	let backend = MemoryStore::seeded([
		("@Email", "usher@example.com"),
		("@Password", "pw"),
		("@SelectedChurchId", "42"),
		("@UserChurches", "[]"),
		("@ChurchAppearance", "{}"),
		("@Login", "true"),
		("@Printer", "{\"ipAddress\":\"10.0.0.9\",\"model\":\"QL-820NWB\"}"),
	]);
	let store = credential_store(backend.clone());

	store.forget_session().await.expect("Forgetting the session should succeed.");

	assert_eq!(backend.snapshot().len(), 1);

	let restored = store.restore_session().await;

	assert!(restored.credential.is_none());
	assert!(restored.selected_tenant.is_none());
	assert_eq!(
		restored.printer.present().and_then(|printer: PrinterConfig| printer.model),
		Some("QL-820NWB".to_owned())
	);
}

#[tokio::test]
async fn partial_credentials_never_restore() {
	let store = credential_store(MemoryStore::seeded([("@Password", "pw")]));

	assert!(store.load_credential().await.is_none());
	assert!(store.restore_session().await.credential.is_none());
}

#[tokio::test]
async fn corrupt_caches_decode_as_corrupt_not_errors() {
	let store = credential_store(MemoryStore::seeded([
		("@ChurchAppearance", "{\"tenantId\":"),
		("@Printer", "not json"),
	]));
	let restored = store.restore_session().await;

	assert!(restored.appearance.is_corrupt());
	assert!(restored.printer.is_corrupt());
}
