//! Cancellable startup timer that hides the loading indicator.

// crates.io
use tokio::task::JoinHandle;
// self
use crate::_prelude::*;

type HideFn = Box<dyn FnOnce() + Send>;

/// Calls `hide` once, either after the delay or when the resource reports loaded.
///
/// Dropping the timer cancels it; `hide` never runs after teardown.
pub struct SplashTimer {
	hide: Arc<Mutex<Option<HideFn>>>,
	task: JoinHandle<()>,
}
impl SplashTimer {
	/// Arms the timer on the current tokio runtime.
	pub fn start(delay: StdDuration, hide: impl FnOnce() + Send + 'static) -> Self {
		let hide = Arc::new(Mutex::new(Some(Box::new(hide) as HideFn)));
		let slot = hide.clone();
		let task = tokio::spawn(async move {
			tokio::time::sleep(delay).await;

			fire(&slot);
		});

		Self { hide, task }
	}

	/// Cancels the timer and hides immediately if it has not fired yet.
	pub fn resource_loaded(&self) {
		self.task.abort();

		fire(&self.hide);
	}

	/// Returns `true` once `hide` has run.
	pub fn has_fired(&self) -> bool {
		self.hide.lock().is_none()
	}
}
impl Drop for SplashTimer {
	fn drop(&mut self) {
		self.task.abort();
	}
}
impl Debug for SplashTimer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SplashTimer").field("fired", &self.has_fired()).finish()
	}
}

fn fire(slot: &Mutex<Option<HideFn>>) {
	let hide = slot.lock().take();

	if let Some(hide) = hide {
		hide();
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
		let count = Arc::new(AtomicUsize::new(0));
		let hits = count.clone();

		(count, move || {
			hits.fetch_add(1, Ordering::SeqCst);
		})
	}

	#[tokio::test(start_paused = true)]
	async fn fires_once_after_the_delay() {
		let (count, hide) = counter();
		let timer = SplashTimer::start(StdDuration::from_millis(2_000), hide);

		tokio::time::sleep(StdDuration::from_millis(1_999)).await;

		assert_eq!(count.load(Ordering::SeqCst), 0);

		tokio::time::sleep(StdDuration::from_millis(2)).await;

		assert_eq!(count.load(Ordering::SeqCst), 1);

		timer.resource_loaded();

		assert_eq!(count.load(Ordering::SeqCst), 1);
		assert!(timer.has_fired());
	}

	#[tokio::test(start_paused = true)]
	async fn resource_loaded_hides_immediately_and_cancels() {
		let (count, hide) = counter();
		let timer = SplashTimer::start(StdDuration::from_millis(2_000), hide);

		timer.resource_loaded();
		tokio::time::sleep(StdDuration::from_millis(5_000)).await;

		assert_eq!(count.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn drop_cancels_the_timer() {
		let (count, hide) = counter();

		drop(SplashTimer::start(StdDuration::from_millis(2_000), hide));
		tokio::time::sleep(StdDuration::from_millis(5_000)).await;

		assert_eq!(count.load(Ordering::SeqCst), 0);
	}
}
