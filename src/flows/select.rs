//! Explicit tenant switch from the selection screen.

// self
use crate::{
	_prelude::*,
	error::AuthError,
	flows::Session,
	http::ApiClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::StorageKey,
	tenant::{CachedAppearance, Tenant, TenantDirectory},
};

impl<C> Session<C>
where
	C: ?Sized + ApiClient,
{
	/// Switches the session to `tenant_id` and returns the selected tenant.
	///
	/// The id is resolved against the in-memory snapshot, falling back to the persisted one.
	/// The registry is swapped to the tenant's grants before anything else suspends. A failure
	/// to persist the selection is logged and the switch still completes.
	pub async fn select_tenant(&self, tenant_id: &str) -> Result<Tenant> {
		const KIND: FlowKind = FlowKind::SelectTenant;

		let _run = self.run_guard.lock().await;
		let span = FlowSpan::new(KIND, "select_tenant");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let tenant = self.resolve_tenant(tenant_id).await?;
				let id = tenant.id.as_str();

				if let Err(e) = self.store.set(StorageKey::SelectedTenant, id).await {
					obs::fallback("select.persist", &e);
				}

				let cached = self
					.store
					.get_json::<CachedAppearance>(StorageKey::Appearance, "appearance cache")
					.await;

				self.activate_tenant(&tenant, cached).await;

				Ok(tenant)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn resolve_tenant(&self, tenant_id: &str) -> Result<Tenant> {
		let mut tenants = self.context.tenants();

		if tenants.is_empty() {
			tenants = self.directory().restore().await;

			self.context.set_tenants(tenants.clone());
		}

		TenantDirectory::select(tenant_id, &tenants)
			.cloned()
			.ok_or_else(|| AuthError::TenantNotFound { tenant: tenant_id.trim().to_owned() }.into())
	}
}
