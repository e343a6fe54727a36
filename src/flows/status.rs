//! Startup phase labels published while the bootstrap runs.

// self
use crate::_prelude::*;

/// Bootstrap phase shown under the splash spinner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartupStatus {
	/// Configuration is being loaded.
	#[default]
	Initializing,
	/// Polling the update platform.
	CheckingUpdates,
	/// Downloading a newer build.
	DownloadingUpdate,
	/// Submitting the stored credential.
	LoggingIn,
	/// Restoring the previously selected tenant.
	LoadingChurch,
	/// A route has been decided.
	Ready,
}
impl StartupStatus {
	/// Human-readable label.
	pub const fn label(self) -> &'static str {
		match self {
			Self::Initializing => "Initializing",
			Self::CheckingUpdates => "Checking for updates",
			Self::DownloadingUpdate => "Downloading update",
			Self::LoggingIn => "Logging in",
			Self::LoadingChurch => "Loading church",
			Self::Ready => "Ready",
		}
	}
}
impl Display for StartupStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}

/// Shared cell the UI polls for the current [`StartupStatus`].
#[derive(Clone, Debug, Default)]
pub struct StatusSlot(Arc<RwLock<StartupStatus>>);
impl StatusSlot {
	/// Current status.
	pub fn get(&self) -> StartupStatus {
		*self.0.read()
	}

	/// Current status label.
	pub fn label(&self) -> &'static str {
		self.get().label()
	}

	pub(crate) fn set(&self, status: StartupStatus) {
		*self.0.write() = status;
	}
}
