//! Request Gate
//!
//! Per request: sweep stale attempts, reject banned callers, forward the
//! rest, then feed failed outcomes to the attempt tracker.

use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::future::{self, BoxFuture};
use futures::stream::{self, StreamExt};
use http_body_util::BodyExt;
use hyper::Request;
use tower::{Layer, Service};

use super::classify::{Outcome, classify};
use super::{FailureRecorded, RouteMatched, forbidden};
use crate::prelude::*;

#[derive(Clone)]
pub struct RequestGateLayer {
	shield: Shield,
}

impl RequestGateLayer {
	pub fn new(shield: Shield) -> Self {
		Self { shield }
	}
}

impl<S> Layer<S> for RequestGateLayer {
	type Service = RequestGateService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequestGateService { inner, shield: self.shield.clone() }
	}
}

#[derive(Clone)]
pub struct RequestGateService<S> {
	inner: S,
	shield: Shield,
}

impl<S> Service<Request<Body>> for RequestGateService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let shield = self.shield.clone();
		let mut inner = self.inner.clone();

		Box::pin(async move {
			shield.attempts.sweep();

			let ip = shield.client_ip.resolve(&req);
			if shield.bans.is_banned(&ip) {
				return Ok(forbidden());
			}

			let path = req.uri().path().to_owned();
			let res = inner.call(req).await?;

			let (res, body_len) = match buffer_not_found(res).await {
				Ok(buffered) => buffered,
				Err(err) => {
					shield.log.record(
						Severity::Error,
						"request_gate",
						format!("Failed to read response body for {} from {}: {}", path, ip, err),
					);
					return Ok(err.into_response());
				}
			};

			let outcome = classify(
				res.status(),
				body_len,
				&path,
				res.extensions().get::<RouteMatched>().is_some(),
				res.extensions().get::<FailureRecorded>().is_some(),
			);
			match outcome {
				Outcome::NonExistentEndpoint => {
					shield.attempts.record_failure(&ip, &path);
				}
				Outcome::Unauthorized => {
					shield.log.record(
						Severity::Informational,
						"request_gate",
						format!("{} attempted to access {} and was not authorized.", ip, path),
					);
					shield.attempts.record_failure(&ip, &path);
				}
				Outcome::Forbidden => {
					shield.log.record(
						Severity::Informational,
						"request_gate",
						format!("{} attempted to access {} and was forbidden.", ip, path),
					);
					shield.attempts.record_failure(&ip, &path);
				}
				Outcome::Ignored => {}
			}

			Ok::<_, S::Error>(res)
		})
	}
}

/// Upper bound on the 404 body bytes held in memory
///
/// Only emptiness matters to the classification.
const NOT_FOUND_BODY_LIMIT: usize = 1024;

/// Buffer the body of a 404 so its length can be checked, then reattach it
///
/// Other responses pass through untouched and keep streaming. A 404 body
/// longer than [`NOT_FOUND_BODY_LIMIT`] stops being buffered: the bytes read
/// so far are put back in front of the rest of the stream and the length
/// reported is what was read, which is enough to call it non-empty.
async fn buffer_not_found(res: Response) -> ShieldResult<(Response, Option<usize>)> {
	if res.status() != StatusCode::NOT_FOUND {
		return Ok((res, None));
	}

	let (parts, mut body) = res.into_parts();
	let mut buffered: Vec<u8> = Vec::new();
	while let Some(frame) = body.frame().await {
		let Ok(data) = frame?.into_data() else {
			// Trailers carry no body bytes
			continue;
		};
		buffered.extend_from_slice(&data);

		if buffered.len() > NOT_FOUND_BODY_LIMIT {
			let len = buffered.len();
			let head = stream::once(future::ready(Ok::<_, axum::Error>(Bytes::from(buffered))));
			let body = Body::from_stream(head.chain(body.into_data_stream()));
			return Ok((Response::from_parts(parts, body), Some(len)));
		}
	}

	let len = buffered.len();
	Ok((Response::from_parts(parts, Body::from(buffered)), Some(len)))
}


// vim: ts=4
