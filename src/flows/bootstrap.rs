//! Startup bootstrap state machine.
//!
//! One run walks `CheckUpdate → RestoreCredential → SilentLogin → DeriveTenants` strictly in
//! order and always ends in exactly one [`BootstrapOutcome`]. Every suspension point is
//! bounded and every failure has a fallback, so the run never stalls and never errors.

// self
use crate::{
	_prelude::*,
	flows::{Session, StartupStatus, common},
	http::ApiClient,
	nav::{GateOutcome, NavigationGate, Navigator, StartupRoute},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{Credential, Decoded, StorageKey, StoredSession},
	tenant::TenantDirectory,
};

/// Why a run ended at the login screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoginReason {
	/// No complete credential was stored.
	NoCredential,
	/// The server rejected the stored credential.
	Rejected,
	/// The login call failed (network, status, malformed body, or timeout).
	LoginFailed,
}

/// Terminal outcome of one bootstrap run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BootstrapOutcome {
	/// Route to the login screen.
	NeedsLogin(LoginReason),
	/// Route to tenant selection.
	NeedsTenantSelection,
	/// Route to the selected tenant's services.
	RouteToServices,
}
impl BootstrapOutcome {
	/// Route this outcome maps to.
	pub const fn route(self) -> StartupRoute {
		match self {
			Self::NeedsLogin(_) => StartupRoute::Login,
			Self::NeedsTenantSelection => StartupRoute::SelectChurch,
			Self::RouteToServices => StartupRoute::Services,
		}
	}
}

impl<C> Session<C>
where
	C: ?Sized + ApiClient,
{
	/// Runs the bootstrap once; concurrent runs wait for each other.
	pub async fn bootstrap(&self) -> BootstrapOutcome {
		const KIND: FlowKind = FlowKind::Bootstrap;

		let _run = self.run_guard.lock().await;
		let span = FlowSpan::new(KIND, "bootstrap");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let outcome = span.instrument(self.run_bootstrap()).await;

		match outcome {
			BootstrapOutcome::NeedsLogin(LoginReason::Rejected | LoginReason::LoginFailed) =>
				obs::record_flow_outcome(KIND, FlowOutcome::Failure),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Success),
		}

		outcome
	}

	/// Runs the bootstrap and hands its route to `gate`.
	///
	/// When no credential was stored, or the login call itself failed, the splash lingers for
	/// [`ClientConfig::splash_linger`](crate::config::ClientConfig::splash_linger) first.
	pub async fn start<N>(&self, gate: &NavigationGate<N>) -> (BootstrapOutcome, GateOutcome)
	where
		N: ?Sized + Navigator,
	{
		let outcome = self.bootstrap().await;

		if matches!(
			outcome,
			BootstrapOutcome::NeedsLogin(LoginReason::NoCredential | LoginReason::LoginFailed)
		) && !self.config.splash_linger.is_zero()
		{
			tokio::time::sleep(self.config.splash_linger).await;
		}

		let navigation = gate.request(outcome.route()).await;

		(outcome, navigation)
	}

	async fn run_bootstrap(&self) -> BootstrapOutcome {
		self.status.set(StartupStatus::Initializing);
		self.context.reset();

		if self.config.update_checks {
			self.check_updates().await;
		}

		let mut stored = self.restore_stored().await;
		let outcome = match stored.credential.take() {
			None => BootstrapOutcome::NeedsLogin(LoginReason::NoCredential),
			Some(credential) => self.silent_login(credential, stored).await,
		};

		// A run ending at login leaves no tenant that could be selected without one.
		if let BootstrapOutcome::NeedsLogin(_) = outcome {
			if let Err(e) = self.store.remove(&[StorageKey::Tenants]).await {
				obs::fallback("tenants.forget", &e);
			}
		}

		self.status.set(StartupStatus::Ready);
		obs::note("bootstrap.route", outcome.route().as_str());

		outcome
	}

	/// CheckUpdate: polls once; any failure proceeds to restore.
	async fn check_updates(&self) {
		let span = FlowSpan::new(FlowKind::Bootstrap, "check_update");
		let timeout = self.config.network_timeout;

		span.instrument(async move {
			self.status.set(StartupStatus::CheckingUpdates);

			let checked = tokio::time::timeout(timeout, self.updates.check_available()).await;

			match checked {
				Ok(Ok(true)) => {},
				Ok(Ok(false)) => return,
				Ok(Err(e)) => {
					obs::fallback("update.check", &e);

					return;
				},
				Err(_) => {
					obs::fallback("update.check", &"timed out");

					return;
				},
			}

			self.status.set(StartupStatus::DownloadingUpdate);

			match tokio::time::timeout(timeout, self.updates.fetch()).await {
				Ok(Ok(())) => {},
				Ok(Err(e)) => {
					obs::fallback("update.fetch", &e);

					return;
				},
				Err(_) => {
					obs::fallback("update.fetch", &"timed out");

					return;
				},
			}

			// Only returns when the restart failed.
			if let Err(e) = self.updates.apply_and_restart().await {
				obs::fallback("update.apply", &e);
			}
		})
		.await
	}

	/// RestoreCredential: one batched read; a corrupt printer cache is dropped.
	async fn restore_stored(&self) -> StoredSession {
		let mut stored = self.store.restore_session().await;

		match std::mem::replace(&mut stored.printer, Decoded::Absent) {
			Decoded::Present(printer) => self.context.set_printer(Some(printer)),
			Decoded::Corrupt(e) => obs::discard("printer config", &e),
			Decoded::Absent => {},
		}

		stored
	}

	/// SilentLogin + DeriveTenants.
	async fn silent_login(
		&self,
		credential: Credential,
		stored: StoredSession,
	) -> BootstrapOutcome {
		let span = FlowSpan::new(FlowKind::Bootstrap, "silent_login");

		self.status.set(StartupStatus::LoggingIn);

		let response = match span.instrument(self.submit_login(&credential)).await {
			Ok(response) => response,
			Err(e) => {
				obs::fallback("bootstrap.login", &e);

				return BootstrapOutcome::NeedsLogin(LoginReason::LoginFailed);
			},
		};

		if let Some(reason) = response.first_error() {
			obs::note("bootstrap.login", &reason);

			return BootstrapOutcome::NeedsLogin(LoginReason::Rejected);
		}

		let directory = self.directory();
		let tenants = directory.from_login_response(&response);

		if let Err(e) = directory.persist(&tenants).await {
			obs::fallback("tenants.persist", &e);
		}

		self.context.set_tenants(tenants.clone());

		let Some(tenant) = stored
			.selected_tenant
			.as_deref()
			.and_then(|id| TenantDirectory::select(id, &tenants))
		else {
			return BootstrapOutcome::NeedsTenantSelection;
		};

		self.status.set(StartupStatus::LoadingChurch);
		FlowSpan::new(FlowKind::Bootstrap, "restore_tenant")
			.instrument(self.activate_tenant(tenant, stored.appearance))
			.await;

		BootstrapOutcome::RouteToServices
	}
}
