#![cfg(feature = "reqwest")]

// std
use std::{sync::Arc, time::Duration};
// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
use url::Url;
// self
use checkin_session::{
	auth::{PermissionSet, ServiceName, TokenSecret},
	config::ClientConfig,
	error::{AuthError, Error, TransportError},
	flows::{BootstrapOutcome, ReqwestSession},
	http::{ApiClient, ReqwestApiClient},
	session::SessionContext,
	store::MemoryStore,
};

fn config(server: &MockServer) -> ClientConfig {
	let base = Url::parse(&server.base_url()).expect("Mock server URL should parse.");

	ClientConfig::builder()
		.endpoint(ServiceName::membership(), base.clone())
		.endpoint(ServiceName::attendance(), base.join("attendance/").expect("Path should join."))
		.update_checks(false)
		.splash_linger(Duration::ZERO)
		.network_timeout(Duration::from_secs(5))
		.build()
		.expect("Loopback configuration should validate.")
}

fn client(server: &MockServer) -> (ReqwestApiClient, Arc<SessionContext>) {
	let context = Arc::new(SessionContext::default());
	let client = ReqwestApiClient::new(&config(server), context.clone())
		.expect("Reqwest client should build.");

	(client, context)
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization_header() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/users/login")
				.header_missing("authorization")
				.json_body(json!({ "email": "usher@example.com", "password": "pw" }));
			then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
		})
		.await;
	let (client, context) = client(&server);

	context.registry().set_grant(
		ServiceName::membership(),
		TokenSecret::new("should-not-leak"),
		PermissionSet::default(),
	);

	let body = client
		.post_anonymous(
			"/users/login",
			json!({ "email": "usher@example.com", "password": "pw" }),
			ServiceName::membership(),
		)
		.await
		.expect("Anonymous login should succeed.");

	assert_eq!(body, json!({ "ok": true }));

	mock.assert_async().await;
}

#[tokio::test]
async fn authenticated_requests_use_the_service_token_and_base_path() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/attendance/visits")
				.header("authorization", "Bearer attendance-token");
			then.status(204);
		})
		.await;
	let (client, context) = client(&server);

	context.registry().set_grant(
		ServiceName::attendance(),
		TokenSecret::new("attendance-token"),
		PermissionSet::default(),
	);

	let body = client
		.get("/visits", ServiceName::attendance())
		.await
		.expect("Authenticated request should succeed.");

	assert_eq!(body, Value::Null);

	mock.assert_async().await;
}

#[tokio::test]
async fn missing_grants_fail_before_any_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.any_request();
			then.status(200);
		})
		.await;
	let (client, _) = client(&server);
	let err = client
		.get("/people", ServiceName::membership())
		.await
		.expect_err("Request without a grant must fail.");

	assert!(matches!(err, Error::Auth(AuthError::MissingGrant { .. })));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn status_codes_map_to_typed_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/forbidden");
			then.status(403);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/broken");
			then.status(500).body("upstream exploded");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/garbled");
			then.status(200).body("{not json");
		})
		.await;

	let (client, _) = client(&server);
	let forbidden = client
		.get_anonymous("/forbidden", ServiceName::membership())
		.await
		.expect_err("403 must fail.");
	let broken = client
		.get_anonymous("/broken", ServiceName::membership())
		.await
		.expect_err("500 must fail.");
	let garbled = client
		.get_anonymous("/garbled", ServiceName::membership())
		.await
		.expect_err("Malformed JSON must fail.");

	assert!(matches!(forbidden, Error::Auth(AuthError::Unauthorized { status: 403, .. })));
	assert!(matches!(
		broken,
		Error::Transport(TransportError::Status { status: 500, ref body })
			if body == "upstream exploded"
	));
	assert!(matches!(garbled, Error::Transport(TransportError::MalformedBody { .. })));
}

#[tokio::test]
async fn reqwest_session_bootstraps_against_a_live_server() {
	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/users/login");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"user": { "email": "usher@example.com" },
				"userChurches": [{
					"church": { "id": 42, "name": "Grace" },
					"apis": [{ "keyName": "AttendanceApi", "jwt": "a-42", "permissions": [] }]
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
	let store = MemoryStore::seeded([
		("@Email", "usher@example.com"),
		("@Password", "pw"),
		("@SelectedChurchId", "42"),
	]);
	let context = Arc::new(SessionContext::default());
	let session = ReqwestSession::new(config(&server), Arc::new(store), context.clone())
		.expect("Session should build.");

	assert_eq!(session.bootstrap().await, BootstrapOutcome::RouteToServices);
	assert_eq!(
		context.registry().authorization_header("AttendanceApi").as_deref(),
		Some("Bearer a-42")
	);

	login.assert_async().await;
	appearance.assert_async().await;
}
