//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use http_body_util::BodyExt;
use ipshield::{ManualClock, Shield, ShieldBuilder};

/// Install a test-writer subscriber so log output shows up with `--nocapture`
pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

/// Shield driven by a manual clock
pub fn test_shield() -> (Shield, Arc<ManualClock>) {
	setup_test_logging();
	let clock = Arc::new(ManualClock::default());
	let shield = ShieldBuilder::new().clock(clock.clone()).build().unwrap();
	(shield, clock)
}

/// GET request arriving from `peer` over the transport
pub fn request_from(peer: &str, path: &str) -> Request<Body> {
	let mut req = Request::builder().uri(path).body(Body::empty()).unwrap();
	let addr = SocketAddr::new(peer.parse().unwrap(), 51000);
	req.extensions_mut().insert(ConnectInfo(addr));
	req
}

/// GET request relayed by a proxy at 10.0.0.1 on behalf of `forwarded_for`
pub fn proxied_request(forwarded_for: &str, path: &str) -> Request<Body> {
	let mut req = request_from("10.0.0.1", path);
	req.headers_mut().insert("x-forwarded-for", forwarded_for.parse().unwrap());
	req
}

pub async fn body_string(res: axum::response::Response) -> String {
	let bytes = res.into_body().collect().await.unwrap().to_bytes();
	String::from_utf8(bytes.to_vec()).unwrap()
}

// vim: ts=4
