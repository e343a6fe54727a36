//! Explicitly owned session context shared by flows, transports, and screens.

// self
use crate::{
	_prelude::*,
	device::PrinterConfig,
	registry::AuthorizationRegistry,
	tenant::{AppearanceConfig, Tenant},
};

#[derive(Debug, Default)]
struct TenantState {
	tenants: Vec<Tenant>,
	selected: Option<Tenant>,
	appearance: Option<AppearanceConfig>,
}

/// Session state constructed once at process start and passed around by `Arc`.
#[derive(Debug, Default)]
pub struct SessionContext {
	registry: AuthorizationRegistry,
	tenant: RwLock<TenantState>,
	printer: RwLock<Option<PrinterConfig>>,
}
impl SessionContext {
	/// Authorization registry for the selected tenant.
	pub fn registry(&self) -> &AuthorizationRegistry {
		&self.registry
	}

	/// Eligible tenants known to the session.
	pub fn tenants(&self) -> Vec<Tenant> {
		self.tenant.read().tenants.clone()
	}

	/// Replaces the eligible tenant snapshot.
	pub fn set_tenants(&self, tenants: Vec<Tenant>) {
		self.tenant.write().tenants = tenants;
	}

	/// Currently selected tenant.
	pub fn selected_tenant(&self) -> Option<Tenant> {
		self.tenant.read().selected.clone()
	}

	/// Records `tenant` as selected and drops the previous tenant's appearance.
	pub fn select(&self, tenant: Tenant) {
		let mut state = self.tenant.write();

		if state.selected.as_ref().is_none_or(|current| current.id != tenant.id) {
			state.appearance = None;
		}

		state.selected = Some(tenant);
	}

	/// Appearance of the selected tenant.
	pub fn appearance(&self) -> Option<AppearanceConfig> {
		self.tenant.read().appearance.clone()
	}

	/// Replaces the selected tenant's appearance.
	pub fn set_appearance(&self, appearance: Option<AppearanceConfig>) {
		self.tenant.write().appearance = appearance;
	}

	/// Cached printer configuration.
	pub fn printer(&self) -> Option<PrinterConfig> {
		self.printer.read().clone()
	}

	/// Replaces the cached printer configuration.
	pub fn set_printer(&self, printer: Option<PrinterConfig>) {
		*self.printer.write() = printer;
	}

	/// Clears the selection, its appearance, and the registry, keeping the tenant list.
	pub fn clear_selection(&self) {
		let mut state = self.tenant.write();

		self.registry.clear();
		state.selected = None;
		state.appearance = None;
	}

	/// Drops every identity-derived value; the printer configuration is device state and stays.
	pub fn reset(&self) {
		let mut state = self.tenant.write();

		self.registry.clear();
		*state = TenantState::default();
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{PermissionSet, ServiceGrant, ServiceName, TenantId};

	fn tenant(id: &str) -> Tenant {
		Tenant::new(
			TenantId::new(id).expect("Tenant fixture should be valid."),
			format!("Church {id}"),
			[ServiceGrant::new(ServiceName::membership(), "jwt", PermissionSet::default())],
		)
	}

	#[test]
	fn switching_tenants_drops_the_old_appearance() {
		let context = SessionContext::default();

		context.select(tenant("1"));
		context.set_appearance(Some(AppearanceConfig::default()));
		context.select(tenant("1"));

		assert!(context.appearance().is_some());

		context.select(tenant("2"));

		assert!(context.appearance().is_none());
	}

	#[test]
	fn reset_keeps_the_printer() {
		let context = SessionContext::default();

		context.set_tenants(vec![tenant("1")]);
		context.select(tenant("1"));
		context.set_printer(Some(PrinterConfig::default()));
		context.registry().replace_all(tenant("1").grants);
		context.reset();

		assert!(context.tenants().is_empty());
		assert!(context.selected_tenant().is_none());
		assert!(context.registry().snapshot().is_empty());
		assert!(context.printer().is_some());
	}
}
