//! Session-level error types shared across flows, transports, and stores.

// self
use crate::{_prelude::*, auth::ServiceName};

/// Session-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical session error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, HTTP status, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Server-reported authentication or authorization failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Malformed cached or received JSON.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}
impl Error {
	/// Returns `true` when the failure came from the network or a timeout.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport(_))
	}

	/// Returns `true` when the server rejected the identity or its access.
	pub fn is_auth(&self) -> bool {
		matches!(self, Self::Auth(_))
	}
}

/// Configuration and validation failures raised while assembling a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No endpoint is configured for the service.
	#[error("No endpoint is configured for the `{service}` service.")]
	MissingEndpoint {
		/// Service lacking an endpoint.
		service: ServiceName,
	},
	/// Endpoint must use HTTPS unless it targets a loopback host.
	#[error("The `{service}` endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Service whose endpoint failed validation.
		service: ServiceName,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint or request URL cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// An identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// A required environment variable is absent.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// A duration that must be positive was zero.
	#[error("The {setting} duration must be greater than zero.")]
	ZeroDuration {
		/// Setting label.
		setting: &'static str,
	},
	/// Retry policies need at least one attempt.
	#[error("Navigation retry policy must allow at least one attempt.")]
	NoAttempts,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, HTTP status, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
	/// The operation exceeded its bounded timeout.
	#[error("The {operation} call timed out after {after:?}.")]
	Timeout {
		/// Operation label.
		operation: &'static str,
		/// Timeout that elapsed.
		after: StdDuration,
	},
	/// Backend answered with a non-success status.
	#[error("Backend returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// Backend answered with a body that is not JSON.
	#[error("Backend returned a malformed JSON body.")]
	MalformedBody {
		/// Parsing failure.
		#[source]
		source: serde_json::Error,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Authentication and authorization failures reported by the backend or the registry.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthError {
	/// Login endpoint rejected the credential.
	#[error("Login was rejected: {reason}.")]
	Rejected {
		/// First server-supplied error message.
		reason: String,
	},
	/// Backend refused a request for the service.
	#[error("The `{service}` service refused the request with HTTP {status}.")]
	Unauthorized {
		/// Service that refused the call.
		service: ServiceName,
		/// HTTP status code (401 or 403).
		status: u16,
	},
	/// No grant is registered for the service.
	#[error("No grant is registered for the `{service}` service.")]
	MissingGrant {
		/// Service lacking a grant.
		service: ServiceName,
	},
	/// Requested tenant is not among the eligible tenants.
	#[error("Tenant `{tenant}` is not available to this identity.")]
	TenantNotFound {
		/// Requested tenant identifier.
		tenant: String,
	},
}

/// Malformed JSON, either cached locally or received from the backend.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Payload is not syntactically valid JSON.
	#[error("Stored {what} is not valid JSON.")]
	Syntax {
		/// Label of the decoded value.
		what: &'static str,
		/// Parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Payload is JSON but does not match the expected shape.
	#[error("The {what} payload does not match the expected shape at `{}`.", .source.path())]
	Shape {
		/// Label of the decoded value.
		what: &'static str,
		/// Structured failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token is not a three-segment JWT.
	#[error("Token is not a three-segment JWT.")]
	TokenShape,
	/// Token payload segment is not base64url.
	#[error("Token payload is not valid base64url.")]
	TokenEncoding {
		/// Decoding failure.
		#[source]
		source: base64::DecodeError,
	},
}

/// Decodes a stored JSON string, separating syntax failures from shape mismatches.
pub(crate) fn decode_str<T>(what: &'static str, raw: &str) -> Result<T, DecodeError>
where
	T: serde::de::DeserializeOwned,
{
	let value = serde_json::from_str::<Value>(raw)
		.map_err(|source| DecodeError::Syntax { what, source })?;

	decode_value(what, value)
}

/// Decodes an already-parsed JSON value with path-aware errors.
pub(crate) fn decode_value<T>(what: &'static str, value: Value) -> Result<T, DecodeError>
where
	T: serde::de::DeserializeOwned,
{
	serde_path_to_error::deserialize(value).map_err(|source| DecodeError::Shape { what, source })
}
