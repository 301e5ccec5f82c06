//! Extractors

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::prelude::*;

/// Resolved address of the caller
///
/// Goes through the same resolution as the gate layers, so handlers and
/// route filters see the address bans are keyed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl<S> FromRequestParts<S> for ClientAddr
where
	Shield: FromRef<S>,
	S: Send + Sync,
{
	type Rejection = std::convert::Infallible;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let shield = Shield::from_ref(state);
		Ok(ClientAddr(shield.client_ip.resolve(&*parts)))
	}
}

// vim: ts=4
