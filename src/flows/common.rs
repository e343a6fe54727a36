//! Shared helpers for flow implementations (bounded calls, login, tenant activation).

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	auth::ServiceName,
	error::{self, TransportError},
	flows::Session,
	http::ApiClient,
	obs,
	store::{Credential, Decoded, StorageKey},
	tenant::{AppearanceConfig, CachedAppearance, LoginResponse, Tenant, TenantDirectory},
};

/// Path of the anonymous login endpoint on the membership service.
pub const LOGIN_PATH: &str = "/users/login";

/// Path of the anonymous public-settings endpoint for `tenant`.
pub fn appearance_path(tenant: &str) -> String {
	format!("/settings/public/{tenant}")
}

/// Runs `fut`, turning an elapsed bound into [`TransportError::Timeout`].
pub(crate) async fn bounded<T, F>(operation: &'static str, after: StdDuration, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match tokio::time::timeout(after, fut).await {
		Ok(result) => result,
		Err(_) => Err(TransportError::Timeout { operation, after }.into()),
	}
}

impl<C> Session<C>
where
	C: ?Sized + ApiClient,
{
	/// Submits `credential` to the anonymous login endpoint within the network bound.
	pub(crate) async fn submit_login(&self, credential: &Credential) -> Result<LoginResponse> {
		let body = json!({ "email": credential.email, "password": credential.password.expose() });
		let value = bounded(
			"login",
			self.config.network_timeout,
			self.api.post_anonymous(LOGIN_PATH, body, ServiceName::membership()),
		)
		.await?;

		Ok(error::decode_value("login response", value)?)
	}

	/// Atomically installs `tenant` as the selected tenant and refreshes its appearance.
	pub(crate) async fn activate_tenant(&self, tenant: &Tenant, cached: Decoded<CachedAppearance>) {
		TenantDirectory::apply_grants(self.context.registry(), tenant);
		self.context.select(tenant.clone());

		let appearance = self.resolve_appearance(tenant, cached).await;

		self.context.set_appearance(appearance);
	}

	/// Uses the cached appearance when it belongs to `tenant`, otherwise fetches and caches it.
	///
	/// Appearance is soft state: every failure is logged and yields `None`.
	pub(crate) async fn resolve_appearance(
		&self,
		tenant: &Tenant,
		cached: Decoded<CachedAppearance>,
	) -> Option<AppearanceConfig> {
		match cached {
			Decoded::Present(cached) => match cached.for_tenant(&tenant.id) {
				Some(appearance) => return Some(appearance),
				None => obs::note("appearance", "cached appearance belongs to another tenant"),
			},
			Decoded::Corrupt(e) => obs::discard("appearance cache", &e),
			Decoded::Absent => {},
		}

		let fetched = bounded(
			"appearance",
			self.config.network_timeout,
			self.api.get_anonymous(&appearance_path(&tenant.id), ServiceName::membership()),
		)
		.await
		.and_then(|value| Ok(error::decode_value::<AppearanceConfig>("appearance", value)?));
		let appearance = match fetched {
			Ok(appearance) => appearance,
			Err(e) => {
				obs::fallback("appearance.fetch", &e);

				return None;
			},
		};
		let envelope = CachedAppearance { tenant_id: tenant.id.clone(), appearance };

		if let Err(e) = self.store.set_json(StorageKey::Appearance, &envelope).await {
			obs::fallback("appearance.cache", &e);
		}

		Some(envelope.appearance)
	}
}
