//! Tenant branding metadata and its tenant-tagged cache envelope.

// self
use crate::{_prelude::*, auth::TenantId};

/// Tenant-scoped display metadata used for theming.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceConfig {
	/// Logo for light backgrounds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logo_light: Option<String>,
	/// Logo for dark backgrounds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logo_dark: Option<String>,
	/// Primary brand color.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub primary_color: Option<String>,
	/// Fields this crate does not interpret, preserved verbatim.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// Cached appearance tagged with the tenant it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAppearance {
	/// Tenant the appearance was fetched for.
	pub tenant_id: TenantId,
	/// Cached appearance.
	pub appearance: AppearanceConfig,
}
impl CachedAppearance {
	/// Returns the appearance only when it was cached for `tenant`.
	pub fn for_tenant(self, tenant: &TenantId) -> Option<AppearanceConfig> {
		(self.tenant_id == *tenant).then_some(self.appearance)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn envelope_for_another_tenant_is_a_miss() {
		let cached: CachedAppearance = serde_json::from_value(json!({
			"tenantId": 42,
			"appearance": { "primaryColor": "#03a9f4", "favicon_400x400": "x.png" }
		}))
		.expect("Envelope should decode.");
		let ours = TenantId::new("42").expect("Tenant fixture should be valid.");
		let theirs = TenantId::new("43").expect("Tenant fixture should be valid.");

		assert!(cached.clone().for_tenant(&theirs).is_none());

		let appearance = cached.for_tenant(&ours).expect("Matching tenant should hit the cache.");

		assert_eq!(appearance.primary_color.as_deref(), Some("#03a9f4"));
		assert!(appearance.extra.contains_key("favicon_400x400"));
	}
}
