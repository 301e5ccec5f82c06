//! Request Gates
//!
//! Tower layers that keep banned callers out and feed failed requests to the
//! attempt tracker.
//!
//! - [`BanGateLayer`] only rejects banned callers.
//! - [`RequestGateLayer`] rejects banned callers, forwards everyone else and
//!   classifies the outcome (unknown route, 401, 403).

mod ban_gate;
mod classify;
mod request_gate;

use axum::body::Body;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hyper::Request;

pub use ban_gate::{BanGateLayer, BanGateService};
pub use classify::{Outcome, classify};
pub use request_gate::{RequestGateLayer, RequestGateService};

/// Response marker: the request was handled by a matched route
///
/// A 404 carrying this marker came from a real handler and is never counted
/// as a probe for a non-existent endpoint.
#[derive(Clone, Copy, Debug)]
pub struct RouteMatched;

/// Response marker: the failure was already fed to the attempt tracker
#[derive(Clone, Copy, Debug)]
pub struct FailureRecorded;

/// Mark responses of matched routes with [`RouteMatched`]
///
/// Attach with `Router::route_layer(axum::middleware::from_fn(mark_route_matched))`,
/// which only wraps routes, not the fallback.
pub async fn mark_route_matched(req: Request<Body>, next: Next) -> Response {
	let mut res = next.run(req).await;
	res.extensions_mut().insert(RouteMatched);
	res
}

/// Opaque rejection for banned callers
pub(crate) fn forbidden() -> Response {
	StatusCode::FORBIDDEN.into_response()
}

// vim: ts=4
