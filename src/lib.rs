//! Tenant-scoped session layer for check-in clients: silent re-login, a multi-service
//! authorization registry, and a one-shot startup navigation gate, built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod device;
pub mod error;
pub mod flows;
pub mod http;
pub mod nav;
pub mod obs;
pub mod registry;
pub mod session;
pub mod splash;
pub mod store;
pub mod tenant;
pub mod update;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and scripted collaborators for tests; enabled via `cfg(test)` or
	//! the `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{collections::VecDeque, convert::Infallible};
	// crates.io
	use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
	use serde_json::json;
	// self
	use crate::{
		auth::ServiceName,
		config::{ClientConfig, RetryPolicy},
		error::TransportError,
		flows::Session,
		http::{ApiClient, ApiFuture, ApiMethod, ApiRequest},
		nav::{NavigationError, Navigator, StartupRoute},
		session::SessionContext,
		store::{Entries, KeyValueStore, MemoryStore, StoreError, StoreFuture},
		update::{UpdateChecker, UpdateError, UpdateFuture},
	};

	/// Canned reply served by [`ScriptedApiClient`].
	#[derive(Clone, Debug)]
	pub enum Reply {
		/// Responds with the provided JSON body.
		Json(Value),
		/// Fails with an HTTP status error.
		Status(u16),
		/// Never resolves; used to exercise timeouts.
		Hang,
	}

	/// [`ApiClient`] fake that serves scripted replies keyed by method + path.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedApiClient {
		replies: Arc<Mutex<HashMap<(ApiMethod, String), VecDeque<Reply>>>>,
		requests: Arc<Mutex<Vec<ApiRequest>>>,
	}
	impl ScriptedApiClient {
		/// Queues a reply for the method + path pair; the last queued reply is sticky.
		pub fn reply(&self, method: ApiMethod, path: &str, reply: Reply) -> &Self {
			self.replies.lock().entry((method, path.to_owned())).or_default().push_back(reply);

			self
		}

		/// Returns every request observed so far.
		pub fn requests(&self) -> Vec<ApiRequest> {
			self.requests.lock().clone()
		}

		/// Counts requests sent to the provided path.
		pub fn calls_to(&self, path: &str) -> usize {
			self.requests.lock().iter().filter(|request| request.path == path).count()
		}

		fn next_reply(&self, method: ApiMethod, path: &str) -> Option<Reply> {
			let mut replies = self.replies.lock();
			let queue = replies.get_mut(&(method, path.to_owned()))?;

			if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
		}
	}
	impl ApiClient for ScriptedApiClient {
		fn send(&self, request: ApiRequest) -> ApiFuture<'_, Value> {
			let reply = self.next_reply(request.method, &request.path);

			self.requests.lock().push(request);

			Box::pin(async move {
				match reply {
					Some(Reply::Json(value)) => Ok(value),
					Some(Reply::Status(status)) =>
						Err(TransportError::Status { status, body: String::new() }.into()),
					Some(Reply::Hang) => std::future::pending().await,
					None => Err(TransportError::Status { status: 404, body: String::new() }.into()),
				}
			})
		}
	}

	/// [`Navigator`] fake that records transitions and fails a configurable number of times.
	#[derive(Debug, Default)]
	pub struct RecordingNavigator {
		failures_left: Mutex<usize>,
		attempts: Mutex<Vec<StartupRoute>>,
		completed: Mutex<Vec<StartupRoute>>,
	}
	impl RecordingNavigator {
		/// Creates a navigator whose first `failures` transitions fail.
		pub fn failing(failures: usize) -> Self {
			Self { failures_left: Mutex::new(failures), ..Default::default() }
		}

		/// Routes that were attempted, including failed attempts.
		pub fn attempts(&self) -> Vec<StartupRoute> {
			self.attempts.lock().clone()
		}

		/// Routes that were successfully replaced.
		pub fn completed(&self) -> Vec<StartupRoute> {
			self.completed.lock().clone()
		}
	}
	impl Navigator for RecordingNavigator {
		fn replace(&self, route: StartupRoute) -> Result<(), NavigationError> {
			self.attempts.lock().push(route);

			let mut failures_left = self.failures_left.lock();

			if *failures_left > 0 {
				*failures_left -= 1;

				return Err(NavigationError::new("navigation container not mounted"));
			}

			self.completed.lock().push(route);

			Ok(())
		}
	}

	/// [`UpdateChecker`] fake with a scripted availability answer.
	#[derive(Debug, Default)]
	pub struct ScriptedUpdates {
		/// Result returned by `check_available`; `None` simulates a platform failure.
		pub available: Option<bool>,
		/// Number of `fetch` calls observed.
		pub fetches: Mutex<usize>,
	}
	impl UpdateChecker for ScriptedUpdates {
		fn check_available(&self) -> UpdateFuture<'_, bool> {
			let available = self.available;

			Box::pin(async move {
				available.ok_or_else(|| UpdateError::platform("update service unreachable"))
			})
		}

		fn fetch(&self) -> UpdateFuture<'_, ()> {
			*self.fetches.lock() += 1;

			Box::pin(async { Ok(()) })
		}

		fn apply_and_restart(&self) -> UpdateFuture<'_, Infallible> {
			Box::pin(async { Err(UpdateError::platform("restart is unsupported in tests")) })
		}
	}

	/// [`KeyValueStore`] whose every operation fails with a backend error.
	#[derive(Clone, Copy, Debug, Default)]
	pub struct FailingStore;
	impl KeyValueStore for FailingStore {
		fn get_many<'a>(&'a self, _keys: &'a [&'a str]) -> StoreFuture<'a, Entries> {
			Box::pin(async { Err(StoreError::Backend { message: "disk unavailable".into() }) })
		}

		fn set_many(&self, _entries: Entries) -> StoreFuture<'_, ()> {
			Box::pin(async { Err(StoreError::Backend { message: "disk unavailable".into() }) })
		}

		fn remove<'a>(&'a self, _keys: &'a [&'a str]) -> StoreFuture<'a, ()> {
			Box::pin(async { Err(StoreError::Backend { message: "disk unavailable".into() }) })
		}
	}

	/// Session type alias used by scripted tests.
	pub type ScriptedSession = Session<ScriptedApiClient>;

	/// Builds an unsigned JWT whose payload is the provided JSON value.
	pub fn unsigned_jwt(payload: Value) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
		let body = URL_SAFE_NO_PAD.encode(payload.to_string());

		format!("{header}.{body}.signature")
	}

	/// Builds a login response body with one church per `(id, name, grants)` entry.
	pub fn login_body(churches: Vec<(Value, &str, Vec<(&str, &str)>)>) -> Value {
		let user_churches = churches
			.iter()
			.map(|(id, name, grants)| {
				let apis = grants
					.iter()
					.map(|(service, jwt)| {
						json!({ "keyName": service, "jwt": jwt, "permissions": [] })
					})
					.collect::<Vec<_>>();

				json!({ "church": { "id": id, "name": name }, "apis": apis })
			})
			.collect::<Vec<_>>();

		json!({ "user": { "email": "usher@example.com" }, "userChurches": user_churches })
	}

	/// Client configuration pointing at placeholder endpoints with test-friendly delays.
	pub fn test_config() -> ClientConfig {
		ClientConfig::builder()
			.endpoint(
				ServiceName::membership(),
				Url::parse("https://membership.example.com").expect("Membership URL should parse."),
			)
			.endpoint(
				ServiceName::attendance(),
				Url::parse("https://attendance.example.com").expect("Attendance URL should parse."),
			)
			.update_checks(false)
			.network_timeout(StdDuration::from_secs(5))
			.splash_linger(StdDuration::ZERO)
			.navigation_retry(RetryPolicy::new(2, StdDuration::from_millis(500)))
			.build()
			.expect("Test configuration should validate.")
	}

	/// Builds a scripted session over a fresh memory store and context.
	pub fn scripted_session(
		api: ScriptedApiClient,
		store: Arc<MemoryStore>,
	) -> (ScriptedSession, Arc<SessionContext>) {
		let context = Arc::new(SessionContext::default());
		let backend: Arc<dyn KeyValueStore> = store;
		let session = Session::with_api_client(test_config(), backend, context.clone(), api);

		(session, context)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
