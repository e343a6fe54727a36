//! Validated client configuration: service endpoints, timeouts, startup delays, and policies.

// std
use std::{env, net::IpAddr};
// self
use crate::{
	_prelude::*,
	auth::ServiceName,
	error::ConfigError,
	tenant::TenantEligibility,
};

/// Environment variable holding the membership service base URL.
pub const ENV_MEMBERSHIP_API: &str = "MEMBERSHIP_API";
/// Environment variable holding the attendance service base URL.
pub const ENV_ATTENDANCE_API: &str = "ATTENDANCE_API";
/// Environment variable holding the deployment stage; `dev` disables update checks.
pub const ENV_STAGE: &str = "STAGE";

/// Base URL per backend service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceEndpoints(BTreeMap<ServiceName, Url>);
impl ServiceEndpoints {
	/// Registers or replaces the base URL for `service`.
	pub fn insert(&mut self, service: ServiceName, base: Url) -> Option<Url> {
		self.0.insert(service, base)
	}

	/// Returns the base URL for `service`.
	pub fn get(&self, service: &str) -> Option<&Url> {
		self.0.get(service)
	}

	/// Joins `path` onto the service's base URL, keeping any base path prefix.
	pub fn resolve(&self, service: &ServiceName, path: &str) -> Result<Url, ConfigError> {
		let base = self
			.get(service)
			.ok_or_else(|| ConfigError::MissingEndpoint { service: service.clone() })?;
		let separator = if path.starts_with('/') { "" } else { "/" };
		let joined = format!("{}{separator}{path}", base.as_str().trim_end_matches('/'));

		Url::parse(&joined).map_err(|source| ConfigError::InvalidEndpoint { source })
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.get(ServiceName::MEMBERSHIP).is_none() {
			return Err(ConfigError::MissingEndpoint { service: ServiceName::membership() });
		}

		for (service, url) in &self.0 {
			if url.scheme() != "https" && !is_loopback(url) {
				return Err(ConfigError::InsecureEndpoint {
					service: service.clone(),
					url: url.to_string(),
				});
			}
		}

		Ok(())
	}
}

/// Bounded retry applied to the startup navigation transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
	/// Total attempts, including the first.
	pub attempts: u8,
	/// Delay before each retry.
	#[serde(with = "duration_ms")]
	pub delay: StdDuration,
}
impl RetryPolicy {
	/// Creates a policy with `attempts` total tries separated by `delay`.
	pub const fn new(attempts: u8, delay: StdDuration) -> Self {
		Self { attempts, delay }
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(2, StdDuration::from_millis(500))
	}
}

/// Validated session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
	/// Base URL per backend service; the membership service is required.
	pub endpoints: ServiceEndpoints,
	/// Bound applied to every network suspension point.
	#[serde(with = "duration_ms")]
	pub network_timeout: StdDuration,
	/// Whether the bootstrap polls for remote updates.
	pub update_checks: bool,
	/// Delay before routing to login when no credential is stored.
	#[serde(with = "duration_ms")]
	pub splash_linger: StdDuration,
	/// Delay after which the splash timer hides the loading indicator.
	#[serde(with = "duration_ms")]
	pub splash_hide_delay: StdDuration,
	/// Retry applied to the startup navigation transition.
	pub navigation_retry: RetryPolicy,
	/// Policy deciding which tenants can be selected.
	pub eligibility: TenantEligibility,
}
impl ClientConfig {
	/// Default bound for network calls.
	pub const DEFAULT_NETWORK_TIMEOUT: StdDuration = StdDuration::from_secs(15);
	/// Default splash linger before routing to login.
	pub const DEFAULT_SPLASH_LINGER: StdDuration = StdDuration::from_millis(1_500);
	/// Default splash hide delay.
	pub const DEFAULT_SPLASH_HIDE_DELAY: StdDuration = StdDuration::from_millis(2_000);

	/// Starts a builder with default timings and no endpoints.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Reads endpoints and the stage from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Same as [`ClientConfig::from_env`], reading variables through `lookup`.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let read = |name: &str| lookup(name).map(|value| value.trim().to_owned());
		let membership = read(ENV_MEMBERSHIP_API)
			.filter(|value| !value.is_empty())
			.ok_or(ConfigError::MissingEnv { name: ENV_MEMBERSHIP_API })?;
		let mut builder =
			Self::builder().endpoint(ServiceName::membership(), parse_url(&membership)?);

		if let Some(attendance) = read(ENV_ATTENDANCE_API).filter(|value| !value.is_empty()) {
			builder = builder.endpoint(ServiceName::attendance(), parse_url(&attendance)?);
		}

		let dev = read(ENV_STAGE).is_some_and(|stage| stage.eq_ignore_ascii_case("dev"));

		builder.update_checks(!dev).build()
	}

	/// Checks invariants; call after deserializing a config by hand.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.endpoints.validate()?;

		if self.network_timeout.is_zero() {
			return Err(ConfigError::ZeroDuration { setting: "network timeout" });
		}
		if self.splash_hide_delay.is_zero() {
			return Err(ConfigError::ZeroDuration { setting: "splash hide" });
		}
		if self.navigation_retry.attempts == 0 {
			return Err(ConfigError::NoAttempts);
		}

		Ok(())
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			endpoints: ServiceEndpoints::default(),
			network_timeout: Self::DEFAULT_NETWORK_TIMEOUT,
			update_checks: true,
			splash_linger: Self::DEFAULT_SPLASH_LINGER,
			splash_hide_delay: Self::DEFAULT_SPLASH_HIDE_DELAY,
			navigation_retry: RetryPolicy::default(),
			eligibility: TenantEligibility::default(),
		}
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
	config: ClientConfig,
}
impl ClientConfigBuilder {
	/// Sets the base URL for `service`.
	pub fn endpoint(mut self, service: ServiceName, base: Url) -> Self {
		self.config.endpoints.insert(service, base);

		self
	}

	/// Sets the bound applied to network calls.
	pub fn network_timeout(mut self, timeout: StdDuration) -> Self {
		self.config.network_timeout = timeout;

		self
	}

	/// Enables or disables the remote update check.
	pub fn update_checks(mut self, enabled: bool) -> Self {
		self.config.update_checks = enabled;

		self
	}

	/// Sets the delay before routing to login when no credential is stored.
	pub fn splash_linger(mut self, linger: StdDuration) -> Self {
		self.config.splash_linger = linger;

		self
	}

	/// Sets the splash hide delay.
	pub fn splash_hide_delay(mut self, delay: StdDuration) -> Self {
		self.config.splash_hide_delay = delay;

		self
	}

	/// Sets the navigation retry policy.
	pub fn navigation_retry(mut self, policy: RetryPolicy) -> Self {
		self.config.navigation_retry = policy;

		self
	}

	/// Sets the tenant eligibility policy.
	pub fn eligibility(mut self, eligibility: TenantEligibility) -> Self {
		self.config.eligibility = eligibility;

		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { source })
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(url::Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}

mod duration_ms {
	// crates.io
	use serde::{Deserialize, Deserializer, Serializer};
	// self
	use crate::_prelude::StdDuration;

	pub fn serialize<S>(duration: &StdDuration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<StdDuration, D::Error>
	where
		D: Deserializer<'de>,
	{
		u64::deserialize(deserializer).map(StdDuration::from_millis)
	}
}
