//! One-shot startup navigation gate.
//!
//! The gate is the only component allowed to move the UI off the splash screen. It buffers
//! a single pending route until the navigation container reports ready, replays it once,
//! retries a failed transition per [`RetryPolicy`], and turns every later request into a
//! no-op once a transition has succeeded.

// self
use crate::{_prelude::*, config::RetryPolicy, obs};

/// Terminal startup routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartupRoute {
	/// Login screen.
	#[serde(rename = "/login")]
	Login,
	/// Tenant selection screen.
	#[serde(rename = "/selectChurch")]
	SelectChurch,
	/// Service list of the selected tenant.
	#[serde(rename = "/services")]
	Services,
}
impl StartupRoute {
	/// Returns the literal route path.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Login => "/login",
			Self::SelectChurch => "/selectChurch",
			Self::Services => "/services",
		}
	}
}
impl Display for StartupRoute {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for StartupRoute {
	type Err = NavigationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"/login" => Ok(Self::Login),
			"/selectChurch" => Ok(Self::SelectChurch),
			"/services" => Ok(Self::Services),
			other => Err(NavigationError::new(format!("unknown route `{other}`"))),
		}
	}
}

/// Failure reported by the UI navigation container.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Navigation failed: {message}.")]
pub struct NavigationError {
	message: String,
}
impl NavigationError {
	/// Builds an error from a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

/// UI navigation container capability.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Replaces the current screen with `route`.
	fn replace(&self, route: StartupRoute) -> Result<(), NavigationError>;
}

/// What a gate call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateOutcome {
	/// The transition to the route succeeded.
	Navigated(StartupRoute),
	/// The route was stored as the pending target.
	Deferred,
	/// Nothing happened: already navigated, or nothing pending.
	Noop,
	/// Every attempt failed; the gate stays un-navigated.
	Failed(StartupRoute),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
	Idle,
	InFlight,
	Navigated,
}

#[derive(Debug)]
struct GateState {
	ready: bool,
	pending: Option<StartupRoute>,
	phase: Phase,
}

/// Orders startup route transitions against navigation readiness.
pub struct NavigationGate<N>
where
	N: ?Sized + Navigator,
{
	navigator: Arc<N>,
	retry: RetryPolicy,
	state: Mutex<GateState>,
}
impl<N> NavigationGate<N>
where
	N: ?Sized + Navigator,
{
	/// Creates a gate in the not-ready state.
	pub fn new(navigator: impl Into<Arc<N>>, retry: RetryPolicy) -> Self {
		Self {
			navigator: navigator.into(),
			retry,
			state: Mutex::new(GateState { ready: false, pending: None, phase: Phase::Idle }),
		}
	}

	/// Requests a transition; deferred until ready, ignored once navigated.
	pub async fn request(&self, route: StartupRoute) -> GateOutcome {
		{
			let mut state = self.state.lock();

			match state.phase {
				Phase::Navigated => return GateOutcome::Noop,
				Phase::InFlight => {
					state.pending = Some(route);

					return self.deferred(route);
				},
				Phase::Idle if !state.ready => {
					state.pending = Some(route);

					return self.deferred(route);
				},
				Phase::Idle => {
					state.pending = None;
					state.phase = Phase::InFlight;
				},
			}
		}

		self.drive(route).await
	}

	/// Marks the container ready and replays the pending route, if any.
	pub async fn mark_ready(&self) -> GateOutcome {
		let route = {
			let mut state = self.state.lock();

			state.ready = true;

			if state.phase != Phase::Idle {
				return GateOutcome::Noop;
			}

			let Some(route) = state.pending.take() else {
				return GateOutcome::Noop;
			};

			state.phase = Phase::InFlight;

			route
		};

		obs::note("nav.replay", "executing deferred navigation");

		self.drive(route).await
	}

	/// Returns `true` once the container reported ready.
	pub fn is_ready(&self) -> bool {
		self.state.lock().ready
	}

	/// Returns `true` once a transition succeeded.
	pub fn has_navigated(&self) -> bool {
		self.state.lock().phase == Phase::Navigated
	}

	/// Currently buffered route.
	pub fn pending(&self) -> Option<StartupRoute> {
		self.state.lock().pending
	}

	fn deferred(&self, route: StartupRoute) -> GateOutcome {
		obs::record_navigation("deferred");
		obs::note("nav.defer", route.as_str());

		GateOutcome::Deferred
	}

	async fn drive(&self, mut route: StartupRoute) -> GateOutcome {
		loop {
			let mut attempts_left = self.retry.attempts.max(1);

			loop {
				attempts_left -= 1;

				match self.navigator.replace(route) {
					Ok(()) => {
						let mut state = self.state.lock();

						state.phase = Phase::Navigated;
						state.pending = None;
						obs::record_navigation("navigated");

						return GateOutcome::Navigated(route);
					},
					Err(e) => {
						self.state.lock().phase = Phase::Idle;
						obs::record_navigation("failed");
						obs::fallback("nav.replace", &e);
					},
				}

				if attempts_left == 0 {
					break;
				}

				tokio::time::sleep(self.retry.delay).await;

				let mut state = self.state.lock();

				// Another caller may have navigated or started a transition during the delay.
				if state.phase != Phase::Idle {
					return GateOutcome::Noop;
				}

				state.phase = Phase::InFlight;
				obs::record_navigation("retry");
			}

			let mut state = self.state.lock();

			match state.pending.take() {
				Some(next) if state.ready && state.phase == Phase::Idle => {
					state.phase = Phase::InFlight;
					route = next;
				},
				_ => return GateOutcome::Failed(route),
			}
		}
	}
}
impl<N> Debug for NavigationGate<N>
where
	N: ?Sized + Navigator,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("NavigationGate")
			.field("ready", &state.ready)
			.field("pending", &state.pending)
			.field("phase", &state.phase)
			.field("retry", &self.retry)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::RecordingNavigator;

	fn gate(
		navigator: RecordingNavigator,
	) -> (Arc<RecordingNavigator>, NavigationGate<RecordingNavigator>) {
		let navigator = Arc::new(navigator);

		(navigator.clone(), NavigationGate::new(navigator, RetryPolicy::default()))
	}

	#[tokio::test]
	async fn latest_pending_request_wins() {
		let (navigator, gate) = gate(RecordingNavigator::default());

		assert_eq!(gate.request(StartupRoute::Login).await, GateOutcome::Deferred);
		assert_eq!(gate.request(StartupRoute::Services).await, GateOutcome::Deferred);
		assert_eq!(gate.mark_ready().await, GateOutcome::Navigated(StartupRoute::Services));
		assert_eq!(gate.mark_ready().await, GateOutcome::Noop);
		assert_eq!(navigator.completed(), vec![StartupRoute::Services]);
	}

	#[tokio::test]
	async fn navigation_is_one_shot() {
		let (navigator, gate) = gate(RecordingNavigator::default());

		gate.mark_ready().await;

		assert_eq!(
			gate.request(StartupRoute::SelectChurch).await,
			GateOutcome::Navigated(StartupRoute::SelectChurch)
		);
		assert_eq!(gate.request(StartupRoute::Login).await, GateOutcome::Noop);
		assert_eq!(navigator.attempts(), vec![StartupRoute::SelectChurch]);
		assert!(gate.has_navigated());
	}

	#[tokio::test(start_paused = true)]
	async fn one_failure_is_retried_after_the_delay() {
		let (navigator, gate) = gate(RecordingNavigator::failing(1));
		let started = tokio::time::Instant::now();

		gate.mark_ready().await;

		assert_eq!(
			gate.request(StartupRoute::Login).await,
			GateOutcome::Navigated(StartupRoute::Login)
		);
		assert_eq!(started.elapsed(), StdDuration::from_millis(500));
		assert_eq!(navigator.attempts().len(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn second_failure_is_not_retried() {
		let (navigator, gate) = gate(RecordingNavigator::failing(5));

		gate.mark_ready().await;

		assert_eq!(
			gate.request(StartupRoute::Login).await,
			GateOutcome::Failed(StartupRoute::Login)
		);
		assert_eq!(navigator.attempts().len(), 2);
		assert!(!gate.has_navigated());
	}

	#[test]
	fn routes_parse_from_literals() {
		assert_eq!("/selectChurch".parse::<StartupRoute>(), Ok(StartupRoute::SelectChurch));
		assert!("/home".parse::<StartupRoute>().is_err());
	}
}
