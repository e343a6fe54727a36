//! Backend transport capability and the default reqwest implementation.
//!
//! Flows depend only on [`ApiClient`]: "send request, get JSON or a typed error". The
//! service name on each [`ApiRequest`] selects both the base URL and the registry token.
//! Anonymous requests (login, public settings) skip the registry entirely.

// self
use crate::{_prelude::*, auth::ServiceName};
#[cfg(feature = "reqwest")]
use crate::{
	config::{ClientConfig, ServiceEndpoints},
	error::{AuthError, ConfigError, TransportError},
	session::SessionContext,
};

/// Boxed future returned by [`ApiClient`] operations.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// HTTP verbs the session layer issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiMethod {
	/// `GET`
	Get,
	/// `POST` with a JSON body.
	Post,
}

/// One backend call.
#[derive(Clone)]
pub struct ApiRequest {
	/// Verb.
	pub method: ApiMethod,
	/// Path appended to the service base URL, e.g. `/users/login`.
	pub path: String,
	/// Service selecting base URL and token.
	pub service: ServiceName,
	/// JSON body for `POST`.
	pub body: Option<Value>,
	/// Skips the registry token when `true`.
	pub anonymous: bool,
}
impl ApiRequest {
	/// Authenticated `GET`.
	pub fn get(path: impl Into<String>, service: ServiceName) -> Self {
		Self { method: ApiMethod::Get, path: path.into(), service, body: None, anonymous: false }
	}

	/// Authenticated `POST`.
	pub fn post(path: impl Into<String>, body: Value, service: ServiceName) -> Self {
		Self {
			method: ApiMethod::Post,
			path: path.into(),
			service,
			body: Some(body),
			anonymous: false,
		}
	}

	/// Marks the request as anonymous.
	pub fn anonymous(mut self) -> Self {
		self.anonymous = true;

		self
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("path", &self.path)
			.field("service", &self.service)
			.field("body_set", &self.body.is_some())
			.field("anonymous", &self.anonymous)
			.finish()
	}
}

/// Transport capability used by every session flow.
pub trait ApiClient
where
	Self: Send + Sync,
{
	/// Sends `request` and returns the decoded JSON body (`null` when empty).
	fn send(&self, request: ApiRequest) -> ApiFuture<'_, Value>;

	/// Authenticated `GET`.
	fn get(&self, path: &str, service: ServiceName) -> ApiFuture<'_, Value> {
		self.send(ApiRequest::get(path, service))
	}

	/// Authenticated `POST`.
	fn post(&self, path: &str, body: Value, service: ServiceName) -> ApiFuture<'_, Value> {
		self.send(ApiRequest::post(path, body, service))
	}

	/// `GET` that needs no registry entry.
	fn get_anonymous(&self, path: &str, service: ServiceName) -> ApiFuture<'_, Value> {
		self.send(ApiRequest::get(path, service).anonymous())
	}

	/// `POST` that needs no registry entry.
	fn post_anonymous(
		&self,
		path: &str,
		body: Value,
		service: ServiceName,
	) -> ApiFuture<'_, Value> {
		self.send(ApiRequest::post(path, body, service).anonymous())
	}
}

#[cfg(feature = "reqwest")]
const BODY_PREVIEW_LIMIT: usize = 512;

/// [`ApiClient`] backed by reqwest that attaches tokens from the session registry.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestApiClient {
	client: ReqwestClient,
	endpoints: ServiceEndpoints,
	context: Arc<SessionContext>,
}
#[cfg(feature = "reqwest")]
impl ReqwestApiClient {
	/// Builds a client with a fresh reqwest handle.
	pub fn new(config: &ClientConfig, context: Arc<SessionContext>) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;

		Ok(Self::with_client(client, config, context))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(
		client: ReqwestClient,
		config: &ClientConfig,
		context: Arc<SessionContext>,
	) -> Self {
		Self { client, endpoints: config.endpoints.clone(), context }
	}

	async fn execute(&self, request: ApiRequest) -> Result<Value> {
		let url = self.endpoints.resolve(&request.service, &request.path)?;
		let mut builder = match request.method {
			ApiMethod::Get => self.client.get(url),
			ApiMethod::Post => self.client.post(url),
		};

		if !request.anonymous {
			let header =
				self.context.registry().authorization_header(&request.service).ok_or_else(|| {
					AuthError::MissingGrant { service: request.service.clone() }
				})?;

			builder = builder.header(reqwest::header::AUTHORIZATION, header);
		}
		if let Some(body) = &request.body {
			builder = builder.json(body);
		}

		let response = builder.send().await.map_err(TransportError::from)?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if matches!(status.as_u16(), 401 | 403) {
			return Err(AuthError::Unauthorized {
				service: request.service,
				status: status.as_u16(),
			}
			.into());
		}
		if !status.is_success() {
			return Err(TransportError::Status {
				status: status.as_u16(),
				body: body_preview(&bytes),
			}
			.into());
		}
		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Null);
		}

		serde_json::from_slice(&bytes)
			.map_err(|source| TransportError::MalformedBody { source }.into())
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient for ReqwestApiClient {
	fn send(&self, request: ApiRequest) -> ApiFuture<'_, Value> {
		Box::pin(self.execute(request))
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestApiClient").field("endpoints", &self.endpoints).finish()
	}
}

#[cfg(feature = "reqwest")]
fn body_preview(bytes: &[u8]) -> String {
	let text = String::from_utf8_lossy(bytes);

	match text.char_indices().nth(BODY_PREVIEW_LIMIT) {
		Some((cut, _)) => format!("{}…", &text[..cut]),
		None => text.into_owned(),
	}
}
