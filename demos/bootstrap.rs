//! Runs one startup bootstrap against a local mock backend: silent re-login with a stored
//! credential, restore of the previously selected church, and the gated route transition.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use checkin_session::{
	auth::ServiceName,
	config::ClientConfig,
	flows::ReqwestSession,
	nav::{NavigationError, NavigationGate, Navigator, StartupRoute},
	session::SessionContext,
	splash::SplashTimer,
	store::{KeyValueStore, MemoryStore},
};

struct ConsoleNavigator;
impl Navigator for ConsoleNavigator {
	fn replace(&self, route: StartupRoute) -> Result<(), NavigationError> {
		println!("navigate -> {route}");

		Ok(())
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/users/login");
			then.status(200).json_body(json!({
				"user": { "email": "usher@example.com" },
				"userChurches": [{
					"church": { "id": 42, "name": "Grace Community" },
					"apis": [
						{ "keyName": "MembershipApi", "jwt": "demo-membership", "permissions": [] },
						{
							"keyName": "AttendanceApi",
							"jwt": "demo-attendance",
							"permissions": [{ "contentType": "Attendance", "action": "Checkin" }]
						}
					]
				}]
			}));
		})
		.await;
	let appearance = server
		.mock_async(|when, then| {
			when.method(GET).path("/settings/public/42");
			then.status(200).json_body(json!({ "primaryColor": "#03a9f4" }));
		})
		.await;
	let config = ClientConfig::builder()
		.endpoint(ServiceName::membership(), Url::parse(&server.base_url())?)
		.update_checks(false)
		.splash_linger(Duration::from_millis(300))
		.build()?;
	let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::seeded([
		("@Email", "usher@example.com"),
		("@Password", "demo"),
		("@SelectedChurchId", "42"),
	]));
	let context = Arc::new(SessionContext::default());
	let splash = SplashTimer::start(config.splash_hide_delay, || println!("splash hidden"));
	let gate = NavigationGate::<ConsoleNavigator>::new(ConsoleNavigator, config.navigation_retry);
	let session = ReqwestSession::new(config, backend, context.clone())?;

	gate.mark_ready().await;

	let (outcome, navigation) = session.start(&gate).await;

	splash.resource_loaded();

	println!("outcome: {outcome:?} ({navigation:?}), status: {}", session.status().label());
	println!("services: {:?}", context.registry().services());
	println!(
		"attendance check-in allowed: {}",
		context.registry().has_permission("AttendanceApi", "Attendance.Checkin")
	);
	println!("appearance: {:?}", context.appearance());

	login.assert_async().await;
	appearance.assert_async().await;

	Ok(())
}
