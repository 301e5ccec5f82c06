//! API Key Guard
//!
//! Route middleware requiring a shared secret in a request header. The
//! secret and the header name are looked up on every request, so rotating
//! them in the environment takes effect without a restart. Rejections are
//! fed to the attempt tracker like any other 401.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hyper::Request;

use crate::config::ApiKeyConfig;
use crate::gate::FailureRecorded;
use crate::prelude::*;

/// Where the expected key and its header name come from
pub trait ApiKeySource: Send + Sync {
	fn header_name(&self) -> Option<String>;
	fn secret(&self) -> Option<String>;
}

/// Reads both values from process environment at check time
#[derive(Clone, Debug)]
pub struct EnvApiKeySource {
	config: ApiKeyConfig,
}

impl EnvApiKeySource {
	pub fn new(config: ApiKeyConfig) -> Self {
		Self { config }
	}
}

impl ApiKeySource for EnvApiKeySource {
	fn header_name(&self) -> Option<String> {
		std::env::var(&*self.config.header_name_var).ok()
	}

	fn secret(&self) -> Option<String> {
		std::env::var(&*self.config.key_var).ok()
	}
}

/// Fixed values, for tests and embedded setups
#[derive(Clone, Debug)]
pub struct StaticApiKey {
	pub header_name: String,
	pub secret: String,
}

impl ApiKeySource for StaticApiKey {
	fn header_name(&self) -> Option<String> {
		Some(self.header_name.clone())
	}

	fn secret(&self) -> Option<String> {
		Some(self.secret.clone())
	}
}

#[derive(Debug, PartialEq, Eq)]
enum Rejection {
	NotConfigured,
	MissingHeader(String),
	WrongKey(String),
}

fn check(source: &dyn ApiKeySource, headers: &HeaderMap) -> Result<(), Rejection> {
	let (Some(header_name), Some(secret)) = (source.header_name(), source.secret()) else {
		return Err(Rejection::NotConfigured);
	};
	let Some(provided) = headers.get(header_name.as_str()) else {
		return Err(Rejection::MissingHeader(header_name));
	};
	if provided.as_bytes() != secret.as_bytes() {
		return Err(Rejection::WrongKey(header_name));
	}
	Ok(())
}

/// State of [`require_api_key`]
#[derive(Clone)]
pub struct ApiKeyGuard {
	shield: Shield,
	source: Arc<dyn ApiKeySource>,
}

impl ApiKeyGuard {
	pub fn new(shield: Shield, source: Arc<dyn ApiKeySource>) -> Self {
		Self { shield, source }
	}

	/// Guard reading the variables named in the shield configuration
	pub fn from_env(shield: Shield) -> Self {
		let source = Arc::new(EnvApiKeySource::new(shield.config.api_key.clone()));
		Self { shield, source }
	}
}

/// Reject requests without the correct API key
///
/// Use with `axum::middleware::from_fn_with_state(guard, require_api_key)`.
pub async fn require_api_key(
	State(guard): State<ApiKeyGuard>,
	req: Request<Body>,
	next: Next,
) -> Response {
	let rejection = match check(guard.source.as_ref(), req.headers()) {
		Ok(()) => return next.run(req).await,
		Err(rejection) => rejection,
	};

	let shield = &guard.shield;
	let ip = shield.client_ip.resolve(&req);
	let path = req.uri().path();
	let message = match &rejection {
		Rejection::NotConfigured => {
			format!("API key is not configured, rejected {} from IP {}!", path, ip)
		}
		Rejection::MissingHeader(header) => {
			format!("API Key not found in header '{}' from IP {}!", header, ip)
		}
		Rejection::WrongKey(header) => {
			format!("IP {} provided an incorrect key in header '{}'!", ip, header)
		}
	};
	shield.log.record(Severity::Warning, "api_key", message);
	shield.attempts.record_failure(&ip, path);

	let mut res = StatusCode::UNAUTHORIZED.into_response();
	res.extensions_mut().insert(FailureRecorded);
	res
}


// vim: ts=4
