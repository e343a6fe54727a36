//! Wire shapes of the login response and the persisted tenant snapshot.

// self
use crate::{_prelude::*, auth::PermissionSet};

/// Body returned by `POST /users/login`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
	/// Server-reported login errors; any entry means the login failed.
	#[serde(default)]
	pub errors: Option<Vec<Value>>,
	/// Authenticated user profile, kept opaque.
	#[serde(default)]
	pub user: Option<Value>,
	/// Tenants the identity belongs to, with per-service grants.
	#[serde(default)]
	pub user_churches: Option<Vec<UserChurch>>,
}
impl LoginResponse {
	/// Returns the first server error as text, if the response carries any.
	pub fn first_error(&self) -> Option<String> {
		let first = self.errors.as_ref()?.first()?;

		Some(match first {
			Value::String(message) => message.clone(),
			other => other.to_string(),
		})
	}
}

/// One tenant membership as sent by the server and kept in the snapshot.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserChurch {
	/// Tenant header.
	#[serde(default)]
	pub church: Option<WireChurch>,
	/// Per-service grants.
	#[serde(default)]
	pub apis: Option<Vec<WireApi>>,
	/// Membership fields this crate does not interpret (`person`, `groups`), preserved verbatim.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// Tenant header; the id may be a JSON number or string.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WireChurch {
	/// Tenant identifier.
	#[serde(default)]
	pub id: Option<Value>,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Fields this crate does not interpret, preserved verbatim.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// One service grant as sent by the server.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireApi {
	/// Service name, e.g. `MembershipApi`.
	#[serde(default)]
	pub key_name: Option<String>,
	/// Bearer token for the service.
	#[serde(default)]
	pub jwt: Option<String>,
	/// Permissions the token carries.
	#[serde(default)]
	pub permissions: PermissionSet,
	/// Fields this crate does not interpret, preserved verbatim.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn tolerates_missing_and_null_sections() {
		let response: LoginResponse = serde_json::from_value(json!({
			"errors": null,
			"userChurches": [{ "church": { "id": 7 } }, {}]
		}))
		.expect("Sparse login response should decode.");

		assert!(response.first_error().is_none());
		assert_eq!(response.user_churches.map(|churches| churches.len()), Some(2));
	}

	#[test]
	fn first_error_prefers_text() {
		let response: LoginResponse =
			serde_json::from_value(json!({ "errors": ["Invalid login", "second"] }))
				.expect("Error response should decode.");

		assert_eq!(response.first_error().as_deref(), Some("Invalid login"));
	}

	#[test]
	fn membership_fields_survive_re_encoding() {
		let body = json!({
			"church": { "id": "7", "name": "Grace", "subDomain": "grace" },
			"person": { "photo": "/photos/7.png" },
			"groups": [{ "id": "g1" }],
			"apis": [{ "keyName": "MembershipApi", "jwt": "jwt-7", "permissions": [], "note": 1 }]
		});
		let church: UserChurch =
			serde_json::from_value(body.clone()).expect("Membership should decode.");
		let encoded = serde_json::to_value(&church).expect("Membership should encode.");

		assert_eq!(encoded["person"], body["person"]);
		assert_eq!(encoded["groups"], body["groups"]);
		assert_eq!(encoded["church"]["subDomain"], json!("grace"));
		assert_eq!(encoded["apis"][0]["note"], json!(1));
	}
}
