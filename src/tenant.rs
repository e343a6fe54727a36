//! Tenant directory: derivation from login responses, eligibility, snapshot persistence,
//! selection by id, and projection of grants into the authorization registry.

pub mod appearance;
pub mod response;

pub use appearance::*;
pub use response::*;

// self
use crate::{
	_prelude::*,
	auth::{ServiceGrant, ServiceName, TenantId},
	obs,
	registry::AuthorizationRegistry,
	store::{self, CredentialStore, Decoded, StorageKey, StoreError},
};

/// Organization (church) the identity belongs to, with its usable service grants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tenant {
	/// Tenant identifier in string form.
	pub id: TenantId,
	/// Human-readable name.
	pub display_name: String,
	/// Usable grants, unique by service, in server order.
	pub grants: Vec<ServiceGrant>,
	church_extra: BTreeMap<String, Value>,
	membership_extra: BTreeMap<String, Value>,
	grant_extra: BTreeMap<ServiceName, BTreeMap<String, Value>>,
}
impl Tenant {
	/// Creates a tenant, keeping only usable grants and the last grant per service.
	pub fn new(
		id: TenantId,
		display_name: impl Into<String>,
		grants: impl IntoIterator<Item = ServiceGrant>,
	) -> Self {
		let mut unique: Vec<ServiceGrant> = Vec::new();

		for grant in grants.into_iter().filter(ServiceGrant::is_usable) {
			match unique.iter_mut().find(|held| held.service == grant.service) {
				Some(held) => *held = grant,
				None => unique.push(grant),
			}
		}

		Self {
			id,
			display_name: display_name.into(),
			grants: unique,
			church_extra: BTreeMap::new(),
			membership_extra: BTreeMap::new(),
			grant_extra: BTreeMap::new(),
		}
	}

	/// Membership fields the server sent alongside the tenant, such as `person` and `groups`.
	pub fn membership(&self) -> &BTreeMap<String, Value> {
		&self.membership_extra
	}

	/// Returns the grant for `service`, if the tenant holds one.
	pub fn grant(&self, service: &str) -> Option<&ServiceGrant> {
		self.grants.iter().find(|grant| grant.service.as_str() == service)
	}

	/// Returns `true` when the tenant passes `policy`.
	pub fn is_eligible(&self, policy: &TenantEligibility) -> bool {
		match policy {
			TenantEligibility::AnyGrant => !self.grants.is_empty(),
			TenantEligibility::RequireServices(services) =>
				!self.grants.is_empty()
					&& services.iter().all(|service| self.grant(service).is_some()),
		}
	}

	fn from_wire(wire: UserChurch) -> Option<Self> {
		let church = wire.church.unwrap_or_default();
		let id = match church.id.map(serde_json::from_value::<TenantId>) {
			Some(Ok(id)) => id,
			Some(Err(e)) => {
				obs::discard("tenant id", &e);

				return None;
			},
			None => {
				obs::note("tenant.derive", "tenant without an id skipped");

				return None;
			},
		};
		let mut grant_extra = BTreeMap::new();
		let mut grants = Vec::new();

		for api in wire.apis.unwrap_or_default() {
			let service = match ServiceName::new(api.key_name.unwrap_or_default()) {
				Ok(service) => service,
				Err(e) => {
					obs::discard("grant service name", &e);

					continue;
				},
			};
			let grant = ServiceGrant::new(service, api.jwt.unwrap_or_default(), api.permissions);

			if grant.is_usable() {
				grant_extra.insert(grant.service.clone(), api.extra);
			}

			grants.push(grant);
		}

		let mut tenant = Self::new(id, church.name.unwrap_or_default(), grants);

		tenant.church_extra = church.extra;
		tenant.membership_extra = wire.extra;
		tenant.grant_extra = grant_extra;

		Some(tenant)
	}

	fn to_wire(&self) -> UserChurch {
		UserChurch {
			church: Some(WireChurch {
				id: Some(Value::String(self.id.to_string())),
				name: Some(self.display_name.clone()),
				extra: self.church_extra.clone(),
			}),
			apis: Some(
				self.grants
					.iter()
					.map(|grant| WireApi {
						key_name: Some(grant.service.to_string()),
						jwt: Some(grant.token.expose().to_owned()),
						permissions: grant.permissions.clone(),
						extra: self.grant_extra.get(&grant.service).cloned().unwrap_or_default(),
					})
					.collect(),
			),
			extra: self.membership_extra.clone(),
		}
	}
}

/// Policy deciding which tenants can be offered for selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantEligibility {
	/// Any tenant holding at least one usable grant.
	#[default]
	AnyGrant,
	/// Tenants holding usable grants for every named service.
	RequireServices(Vec<ServiceName>),
}

/// Derives, persists, and restores the eligible tenant list.
#[derive(Clone, Debug)]
pub struct TenantDirectory {
	store: CredentialStore,
	eligibility: TenantEligibility,
}
impl TenantDirectory {
	/// Creates a directory persisting through `store`.
	pub fn new(store: CredentialStore, eligibility: TenantEligibility) -> Self {
		Self { store, eligibility }
	}

	/// Active eligibility policy.
	pub fn eligibility(&self) -> &TenantEligibility {
		&self.eligibility
	}

	/// Builds the eligible tenants from a login response, in server order.
	pub fn from_login_response(&self, response: &LoginResponse) -> Vec<Tenant> {
		self.from_wire(response.user_churches.clone().unwrap_or_default())
	}

	/// Drops ineligible tenants; applying it twice yields the same list.
	pub fn filter_eligible(&self, tenants: Vec<Tenant>) -> Vec<Tenant> {
		tenants.into_iter().filter(|tenant| tenant.is_eligible(&self.eligibility)).collect()
	}

	/// Writes the eligible snapshot to storage.
	pub async fn persist(&self, tenants: &[Tenant]) -> Result<(), StoreError> {
		self.store.set_many([self.snapshot_entry(tenants)?]).await
	}

	/// Encoded snapshot entry, for callers batching it with other writes.
	pub(crate) fn snapshot_entry(
		&self,
		tenants: &[Tenant],
	) -> Result<(StorageKey, String), StoreError> {
		let snapshot = tenants
			.iter()
			.filter(|tenant| tenant.is_eligible(&self.eligibility))
			.map(Tenant::to_wire)
			.collect::<Vec<_>>();

		Ok((StorageKey::Tenants, store::encode_json(StorageKey::Tenants, &snapshot)?))
	}

	/// Reads the snapshot; absence and corruption both yield an empty list.
	pub async fn restore(&self) -> Vec<Tenant> {
		let snapshot =
			self.store.get_json::<Vec<UserChurch>>(StorageKey::Tenants, "tenant snapshot").await;

		match snapshot {
			Decoded::Present(wire) => self.from_wire(wire),
			Decoded::Absent => Vec::new(),
			Decoded::Corrupt(e) => {
				obs::discard("tenant snapshot", &e);

				Vec::new()
			},
		}
	}

	/// Finds the tenant whose id, compared as a string, equals `tenant_id`.
	pub fn select<'a>(tenant_id: &str, tenants: &'a [Tenant]) -> Option<&'a Tenant> {
		tenants.iter().find(|tenant| tenant.id.matches(tenant_id))
	}

	/// Replaces every registry entry with `tenant`'s grants in one swap.
	pub fn apply_grants(registry: &AuthorizationRegistry, tenant: &Tenant) {
		registry.replace_all(tenant.grants.iter().cloned());
	}

	fn from_wire(&self, wire: Vec<UserChurch>) -> Vec<Tenant> {
		self.filter_eligible(wire.into_iter().filter_map(Tenant::from_wire).collect())
	}
}
