//! Shield Configuration
//!
//! Defaults reproduce the long-standing behavior: ten failures before a ban,
//! a daily attempt sweep and `.env` probes banned on sight.

use std::time::Duration;

use crate::prelude::*;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 3600);
/// TEST-NET-3 address, never assigned to a real client
pub const SENTINEL_IP: &str = "198.51.100.255";

/// Endpoint activity tracking
#[derive(Clone, Debug)]
pub struct ActivityConfig {
	/// Window used by `hit_recently`
	pub recent_window: Duration,
	/// Period of the idle watch task
	pub check_interval: Duration,
	/// All endpoints idle for this long triggers reclamation (None = never)
	pub idle_timeout: Option<Duration>,
	/// Run registered reclaimers when everything is idle
	pub reclaim_memory: bool,
}

impl Default for ActivityConfig {
	fn default() -> Self {
		Self {
			recent_window: Duration::from_secs(5 * 60),
			check_interval: Duration::from_secs(60),
			idle_timeout: None,
			reclaim_memory: false,
		}
	}
}

/// Names of the environment variables holding the API key
#[derive(Clone, Debug)]
pub struct ApiKeyConfig {
	/// Variable holding the secret
	pub key_var: Box<str>,
	/// Variable holding the header name the key is sent in
	pub header_name_var: Box<str>,
}

impl Default for ApiKeyConfig {
	fn default() -> Self {
		Self { key_var: "API_KEY".into(), header_name_var: "API_KEY_NAME".into() }
	}
}

#[derive(Clone, Debug)]
pub struct ShieldConfig {
	/// Program name stamped on every log entry
	pub source: Box<str>,
	/// Failures before an address is banned
	pub max_attempts: u32,
	/// Attempt table and log are cleared once this much time has passed
	pub sweep_interval: Duration,
	/// Request path suffixes that get the caller banned immediately
	pub secure_suffixes: Vec<Box<str>>,
	/// Address substituted when the caller cannot be identified
	pub sentinel_ip: Box<str>,
	/// Honor `X-Forwarded-For` (disable when not behind a reverse proxy)
	pub trust_forwarded_for: bool,
	pub activity: ActivityConfig,
	pub api_key: ApiKeyConfig,
}

impl Default for ShieldConfig {
	fn default() -> Self {
		Self {
			source: ipshield_types::log_entry::DEFAULT_SOURCE.into(),
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			sweep_interval: DEFAULT_SWEEP_INTERVAL,
			secure_suffixes: vec![".env".into()],
			sentinel_ip: SENTINEL_IP.into(),
			trust_forwarded_for: true,
			activity: ActivityConfig::default(),
			api_key: ApiKeyConfig::default(),
		}
	}
}

impl ShieldConfig {
	#[must_use]
	pub fn with_source(mut self, source: &str) -> Self {
		self.source = source.into();
		self
	}

	#[must_use]
	pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
		self.max_attempts = max_attempts;
		self
	}

	#[must_use]
	pub fn with_idle_reclaim(mut self, idle_timeout: Duration) -> Self {
		self.activity.idle_timeout = Some(idle_timeout);
		self.activity.reclaim_memory = true;
		self
	}

	pub fn validate(&self) -> ShieldResult<()> {
		if self.max_attempts == 0 {
			return Err(Error::InvalidConfig("max_attempts must be at least 1".into()));
		}
		if self.sweep_interval.is_zero() {
			return Err(Error::InvalidConfig("sweep_interval must not be zero".into()));
		}
		if self.activity.check_interval.is_zero() {
			return Err(Error::InvalidConfig("activity.check_interval must not be zero".into()));
		}
		if self.sentinel_ip.trim().is_empty() {
			return Err(Error::InvalidConfig("sentinel_ip must not be empty".into()));
		}
		if self.secure_suffixes.iter().any(|s| s.is_empty()) {
			// An empty suffix would match every path
			return Err(Error::InvalidConfig("secure_suffixes must not contain \"\"".into()));
		}
		Ok(())
	}
}


// vim: ts=4
