//! Interactive login from the login screen.

// self
use crate::{
	_prelude::*,
	error::AuthError,
	flows::Session,
	http::ApiClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::Credential,
	tenant::Tenant,
};

impl<C> Session<C>
where
	C: ?Sized + ApiClient,
{
	/// Logs in with `email` and `password` and returns the eligible tenants.
	///
	/// On success the credential, the login flag, and the tenant snapshot are written in one
	/// batch and any previous selection is cleared; the caller routes to tenant selection.
	/// A failed write is logged and the in-memory session still proceeds.
	pub async fn login(&self, email: &str, password: &str) -> Result<Vec<Tenant>> {
		const KIND: FlowKind = FlowKind::Login;

		let _run = self.run_guard.lock().await;
		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let credential = Credential::new(email, password).ok_or_else(|| {
					AuthError::Rejected { reason: "Email and password are required".into() }
				})?;
				let response = self.submit_login(&credential).await?;

				if let Some(reason) = response.first_error() {
					return Err(AuthError::Rejected { reason }.into());
				}

				let directory = self.directory();
				let tenants = directory.from_login_response(&response);
				let mut entries = credential.entries();

				match directory.snapshot_entry(&tenants) {
					Ok(entry) => entries.push(entry),
					Err(e) => obs::fallback("login.snapshot", &e),
				}

				if let Err(e) = self.store.set_many(entries).await {
					obs::fallback("login.persist", &e);
				}

				self.context.clear_selection();
				self.context.set_tenants(tenants.clone());

				Ok(tenants)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
