//! Outcome classification

use axum::http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// 404 for a route that does not exist
	NonExistentEndpoint,
	Unauthorized,
	Forbidden,
	/// Nothing to record
	Ignored,
}

/// Decide whether a finished request counts as a failed attempt
///
/// `body_len` is only known for buffered (404) responses. A 404 counts when
/// no route matched and the body is empty, except on the root path. 401 and
/// 403 always count unless the failure was recorded upstream already.
pub fn classify(
	status: StatusCode,
	body_len: Option<usize>,
	path: &str,
	route_matched: bool,
	already_recorded: bool,
) -> Outcome {
	if already_recorded {
		return Outcome::Ignored;
	}
	match status {
		StatusCode::NOT_FOUND
			if !route_matched && body_len == Some(0) && path != "/" =>
		{
			Outcome::NonExistentEndpoint
		}
		StatusCode::UNAUTHORIZED => Outcome::Unauthorized,
		StatusCode::FORBIDDEN => Outcome::Forbidden,
		_ => Outcome::Ignored,
	}
}


// vim: ts=4
