//! Error type shared by all ipshield crates.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type ShieldResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Configuration rejected by validation
	InvalidConfig(String),
	/// Downstream response body could not be read
	Body(String),
	Internal(String),
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
			Error::Body(msg) => write!(f, "response body error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl From<axum::Error> for Error {
	fn from(err: axum::Error) -> Self {
		Error::Body(err.to_string())
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		// Never leak moderation internals to the caller
		StatusCode::INTERNAL_SERVER_ERROR.into_response()
	}
}


// vim: ts=4
