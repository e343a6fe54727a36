//! Process-wide authorization registry mapping service names to bearer tokens and
//! permission sets.
//!
//! The table is copy-on-write: readers take a cheap [`RegistrySnapshot`] and keep using it
//! while writers swap in a new table under the lock. [`AuthorizationRegistry::clear`] and
//! [`AuthorizationRegistry::replace_all`] are single swaps, so request construction never
//! sees a mix of two tenants' grants.

// self
use crate::{
	_prelude::*,
	auth::{PermissionSet, ServiceGrant, ServiceName, TokenClaims, TokenSecret},
	obs,
};

/// Token and permissions registered for one service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEntry {
	/// Bearer token attached to requests.
	pub token: TokenSecret,
	/// Permissions granted by the token.
	pub permissions: PermissionSet,
}

/// Immutable view of the registry at one instant.
#[derive(Clone, Debug, Default)]
pub struct RegistrySnapshot(Arc<HashMap<ServiceName, RegistryEntry>>);
impl RegistrySnapshot {
	/// Returns the entry registered for `service`.
	pub fn entry(&self, service: &str) -> Option<&RegistryEntry> {
		self.0.get(service)
	}

	/// Returns the bearer token registered for `service`.
	pub fn token_for(&self, service: &str) -> Option<&TokenSecret> {
		self.entry(service).map(|entry| &entry.token)
	}

	/// Returns `true` when `service` is registered with `permission`.
	pub fn has_permission(&self, service: &str, permission: &str) -> bool {
		self.entry(service).is_some_and(|entry| entry.permissions.contains(permission))
	}

	/// Registered service names in sorted order.
	pub fn services(&self) -> Vec<ServiceName> {
		let mut services = self.0.keys().cloned().collect::<Vec<_>>();

		services.sort();

		services
	}

	/// Number of registered services.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no service is registered.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Shared service → token/permission table.
#[derive(Debug, Default)]
pub struct AuthorizationRegistry {
	table: RwLock<RegistrySnapshot>,
}
impl AuthorizationRegistry {
	/// Registers a grant for `service`, fully replacing any prior entry.
	pub fn set_grant(&self, service: ServiceName, token: TokenSecret, permissions: PermissionSet) {
		let mut table = self.table.write();

		Arc::make_mut(&mut table.0).insert(service, RegistryEntry { token, permissions });
	}

	/// Returns `true` when `service` is registered with `permission`.
	pub fn has_permission(&self, service: &str, permission: &str) -> bool {
		self.table.read().has_permission(service, permission)
	}

	/// Returns the bearer token registered for `service`.
	pub fn token_for(&self, service: &str) -> Option<TokenSecret> {
		self.table.read().token_for(service).cloned()
	}

	/// Returns the `Authorization` header value for `service`.
	pub fn authorization_header(&self, service: &str) -> Option<String> {
		self.token_for(service).map(|token| format!("Bearer {}", token.expose()))
	}

	/// Decodes the JWT payload registered for `service`; undecodable tokens yield `None`.
	pub fn claims(&self, service: &str) -> Option<TokenClaims> {
		let token = self.token_for(service)?;

		match TokenClaims::decode(&token) {
			Ok(claims) => Some(claims),
			Err(e) => {
				obs::discard("token claims", &e);

				None
			},
		}
	}

	/// Registered service names in sorted order.
	pub fn services(&self) -> Vec<ServiceName> {
		self.table.read().services()
	}

	/// Returns a cheap copy of the current table.
	pub fn snapshot(&self) -> RegistrySnapshot {
		self.table.read().clone()
	}

	/// Removes every entry in one swap.
	pub fn clear(&self) {
		*self.table.write() = RegistrySnapshot::default();
	}

	/// Replaces the whole table with `grants` in one swap; later grants win per service.
	pub fn replace_all<I>(&self, grants: I)
	where
		I: IntoIterator<Item = ServiceGrant>,
	{
		let next = grants
			.into_iter()
			.map(|ServiceGrant { service, token, permissions }| {
				(service, RegistryEntry { token, permissions })
			})
			.collect::<HashMap<_, _>>();

		*self.table.write() = RegistrySnapshot(Arc::new(next));
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::_preludet::unsigned_jwt;

	fn grant(service: ServiceName, token: &str, permissions: &[&str]) -> ServiceGrant {
		ServiceGrant::new(service, token, PermissionSet::new(permissions.iter().copied()))
	}

	#[test]
	fn set_grant_replaces_without_merging() {
		let registry = AuthorizationRegistry::default();

		registry.set_grant(
			ServiceName::attendance(),
			TokenSecret::new("first"),
			PermissionSet::new(["Attendance.Edit"]),
		);
		registry.set_grant(
			ServiceName::attendance(),
			TokenSecret::new("second"),
			PermissionSet::new(["Attendance.View"]),
		);

		assert_eq!(
			registry.token_for(ServiceName::ATTENDANCE).as_ref().map(TokenSecret::expose),
			Some("second")
		);
		assert!(registry.has_permission(ServiceName::ATTENDANCE, "Attendance.View"));
		assert!(!registry.has_permission(ServiceName::ATTENDANCE, "Attendance.Edit"));
	}

	#[test]
	fn snapshots_are_isolated_from_later_writes() {
		let registry = AuthorizationRegistry::default();

		registry.replace_all([grant(ServiceName::membership(), "m-1", &[])]);

		let before = registry.snapshot();

		registry.replace_all([grant(ServiceName::attendance(), "a-2", &[])]);

		assert_eq!(before.services(), vec![ServiceName::membership()]);
		assert_eq!(registry.services(), vec![ServiceName::attendance()]);
		assert!(registry.token_for(ServiceName::MEMBERSHIP).is_none());
	}

	#[test]
	fn clear_empties_the_table() {
		let registry = AuthorizationRegistry::default();

		registry.replace_all([grant(ServiceName::membership(), "m-1", &["People.View"])]);
		registry.clear();

		assert!(registry.snapshot().is_empty());
		assert!(registry.authorization_header(ServiceName::MEMBERSHIP).is_none());
		assert!(!registry.has_permission(ServiceName::MEMBERSHIP, "People.View"));
	}

	#[test]
	fn header_and_claims_come_from_the_registered_token() {
		let registry = AuthorizationRegistry::default();
		let jwt = unsigned_jwt(json!({ "exp": 4_102_444_800_i64, "churchId": "42" }));

		registry.replace_all([
			grant(ServiceName::attendance(), &jwt, &[]),
			grant(ServiceName::membership(), "opaque", &[]),
		]);

		assert_eq!(
			registry.authorization_header(ServiceName::ATTENDANCE),
			Some(format!("Bearer {jwt}"))
		);

		let claims =
			registry.claims(ServiceName::ATTENDANCE).expect("JWT payload should decode.");

		assert_eq!(claims.str_claim("churchId"), Some("42"));
		assert!(registry.claims(ServiceName::MEMBERSHIP).is_none());
	}
}
