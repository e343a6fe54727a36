//! Logout: drops identity-derived state in memory and on disk.

// self
use crate::{
	_prelude::*,
	flows::Session,
	http::ApiClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Session<C>
where
	C: ?Sized + ApiClient,
{
	/// Clears the registry and the tenant state, then removes the persisted session keys.
	///
	/// In-memory state is cleared first so no request built afterwards carries a token, even
	/// when the storage removal fails.
	pub async fn logout(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Logout;

		let _run = self.run_guard.lock().await;
		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.context.reset();
				self.store.forget_session().await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{
		_preludet::*,
		device::PrinterConfig,
		flows::common,
		http::ApiMethod,
		store::MemoryStore,
	};

	#[tokio::test]
	async fn logout_removes_credentials_and_empties_the_registry() {
		let api = ScriptedApiClient::default();
		let store = Arc::new(MemoryStore::seeded([("@Printer", "{\"ipAddress\":\"10.0.0.9\"}")]));

		api.reply(
			ApiMethod::Post,
			common::LOGIN_PATH,
			Reply::Json(login_body(vec![(json!(1), "First", vec![("MembershipApi", "jwt")])])),
		);

		let (session, context) = scripted_session(api, store.clone());

		context.set_printer(Some(PrinterConfig {
			ip_address: Some("10.0.0.9".into()),
			..Default::default()
		}));
		session.login("usher@example.com", "pw").await.expect("Login should succeed.");
		session.select_tenant("1").await.expect("Tenant should resolve.");
		session.logout().await.expect("Logout should succeed.");

		assert!(context.registry().snapshot().is_empty());
		assert!(context.tenants().is_empty());
		assert!(context.selected_tenant().is_none());
		assert!(context.printer().is_some());

		let remaining = store.snapshot();

		assert_eq!(remaining.keys().map(String::as_str).collect::<Vec<_>>(), ["@Printer"]);
	}

	#[tokio::test]
	async fn storage_failures_surface_after_memory_is_cleared() {
		let context = Arc::new(crate::session::SessionContext::default());
		let session: ScriptedSession = Session::with_api_client(
			test_config(),
			Arc::new(FailingStore),
			context.clone(),
			ScriptedApiClient::default(),
		);

		context.registry().set_grant(
			crate::auth::ServiceName::membership(),
			crate::auth::TokenSecret::new("jwt"),
			Default::default(),
		);

		let err = session.logout().await.expect_err("Failing store must surface.");

		assert!(matches!(err, Error::Storage(_)));
		assert!(context.registry().snapshot().is_empty());
	}
}
