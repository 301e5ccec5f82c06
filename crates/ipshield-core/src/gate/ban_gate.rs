//! Ban Gate
//!
//! Minimal blocking stage: banned callers get an empty 403, everyone else
//! is forwarded. No attempt tracking.

use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::Response;
use futures::future::BoxFuture;
use hyper::Request;
use tower::{Layer, Service};

use super::forbidden;
use crate::prelude::*;

#[derive(Clone)]
pub struct BanGateLayer {
	shield: Shield,
}

impl BanGateLayer {
	pub fn new(shield: Shield) -> Self {
		Self { shield }
	}
}

impl<S> Layer<S> for BanGateLayer {
	type Service = BanGateService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		BanGateService { inner, shield: self.shield.clone() }
	}
}

#[derive(Clone)]
pub struct BanGateService<S> {
	inner: S,
	shield: Shield,
}

impl<S> Service<Request<Body>> for BanGateService<S>
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
		let ip = self.shield.client_ip.resolve(&req);

		if self.shield.bans.is_banned(&ip) {
			self.shield.log.record(Severity::Message, "ban_gate", format!("{} is blocked.", ip));
			return Box::pin(async { Ok::<_, S::Error>(forbidden()) });
		}

		Box::pin(self.inner.call(req))
	}
}


// vim: ts=4
