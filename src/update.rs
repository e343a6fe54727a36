//! Remote update capability consumed by the bootstrap.

// std
use std::convert::Infallible;
// self
use crate::_prelude::*;

/// Boxed future returned by [`UpdateChecker`] operations.
pub type UpdateFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UpdateError>> + 'a + Send>>;

/// Over-the-air update platform (e.g. an app store or code-push service).
pub trait UpdateChecker
where
	Self: Send + Sync,
{
	/// Reports whether a newer build is available.
	fn check_available(&self) -> UpdateFuture<'_, bool>;

	/// Downloads the newer build.
	fn fetch(&self) -> UpdateFuture<'_, ()>;

	/// Applies the downloaded build and restarts; only returns on failure.
	fn apply_and_restart(&self) -> UpdateFuture<'_, Infallible>;
}

/// Failure reported by the update platform.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum UpdateError {
	/// Platform-specific failure.
	#[error("Update platform failure: {message}.")]
	Platform {
		/// Human-readable error payload.
		message: String,
	},
}
impl UpdateError {
	/// Builds a platform failure.
	pub fn platform(message: impl Into<String>) -> Self {
		Self::Platform { message: message.into() }
	}
}

/// [`UpdateChecker`] that never finds an update; used when no platform is wired in.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledUpdates;
impl UpdateChecker for DisabledUpdates {
	fn check_available(&self) -> UpdateFuture<'_, bool> {
		Box::pin(async { Ok(false) })
	}

	fn fetch(&self) -> UpdateFuture<'_, ()> {
		Box::pin(async { Err(UpdateError::platform("updates are disabled")) })
	}

	fn apply_and_restart(&self) -> UpdateFuture<'_, Infallible> {
		Box::pin(async { Err(UpdateError::platform("updates are disabled")) })
	}
}
