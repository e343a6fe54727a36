//! Session flow orchestrators: startup bootstrap plus explicit login, tenant switch, and
//! logout.

pub mod bootstrap;
pub mod common;
pub mod status;

mod login;
mod logout;
mod select;

pub use bootstrap::*;
pub use status::*;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	http::ApiClient,
	session::SessionContext,
	store::{CredentialStore, KeyValueStore},
	tenant::TenantDirectory,
	update::{DisabledUpdates, UpdateChecker},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestApiClient;

#[cfg(feature = "reqwest")]
/// Session specialized for the crate's default reqwest transport.
pub type ReqwestSession = Session<ReqwestApiClient>;

/// Coordinates every session flow against one API client, store, and context.
///
/// The session owns the transport, the credential store, and the shared
/// [`SessionContext`]. Every flow takes the same run guard, so a bootstrap, a login, a
/// tenant switch, and a logout never interleave their suspension points.
pub struct Session<C>
where
	C: ?Sized + ApiClient,
{
	/// Transport used for every backend call.
	pub api: Arc<C>,
	/// Scoped persistence for credentials and caches.
	pub store: CredentialStore,
	/// Shared registry, tenant, appearance, and printer state.
	pub context: Arc<SessionContext>,
	/// Remote update platform consulted by the bootstrap.
	pub updates: Arc<dyn UpdateChecker>,
	/// Validated configuration.
	pub config: ClientConfig,
	status: StatusSlot,
	run_guard: Arc<AsyncMutex<()>>,
}
impl<C> Session<C>
where
	C: ?Sized + ApiClient,
{
	/// Creates a session that reuses the caller-provided transport.
	pub fn with_api_client(
		config: ClientConfig,
		backend: Arc<dyn KeyValueStore>,
		context: Arc<SessionContext>,
		api: impl Into<Arc<C>>,
	) -> Self {
		Self {
			api: api.into(),
			store: CredentialStore::new(backend),
			context,
			updates: Arc::new(DisabledUpdates),
			config,
			status: StatusSlot::default(),
			run_guard: Default::default(),
		}
	}

	/// Sets the update platform consulted during bootstrap.
	pub fn with_update_checker(mut self, updates: Arc<dyn UpdateChecker>) -> Self {
		self.updates = updates;

		self
	}

	/// Startup phase label published for the splash screen.
	pub fn status(&self) -> &StatusSlot {
		&self.status
	}

	/// Tenant directory bound to this session's store and eligibility policy.
	pub fn directory(&self) -> TenantDirectory {
		TenantDirectory::new(self.store.clone(), self.config.eligibility.clone())
	}
}
#[cfg(feature = "reqwest")]
impl Session<ReqwestApiClient> {
	/// Creates a session with its own reqwest transport reading tokens from `context`.
	pub fn new(
		config: ClientConfig,
		backend: Arc<dyn KeyValueStore>,
		context: Arc<SessionContext>,
	) -> Result<Self> {
		let api = ReqwestApiClient::new(&config, context.clone())?;

		Ok(Self::with_api_client(config, backend, context, api))
	}
}
impl<C> Clone for Session<C>
where
	C: ?Sized + ApiClient,
{
	fn clone(&self) -> Self {
		Self {
			api: self.api.clone(),
			store: self.store.clone(),
			context: self.context.clone(),
			updates: self.updates.clone(),
			config: self.config.clone(),
			status: self.status.clone(),
			run_guard: self.run_guard.clone(),
		}
	}
}
impl<C> Debug for Session<C>
where
	C: ?Sized + ApiClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("config", &self.config)
			.field("status", &self.status.get())
			.finish()
	}
}
