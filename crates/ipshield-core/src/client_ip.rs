//! Client Address Resolution
//!
//! Resolves the address a request originated from: the first hop of
//! `X-Forwarded-For` when present, otherwise the peer address of the
//! connection. Resolution never fails; a caller that cannot be identified
//! gets the configured sentinel address.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Uri};
use hyper::Request;

use crate::access_log::AccessLog;
use crate::config::ShieldConfig;
use crate::prelude::*;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
const IPV6_LOOPBACK: &str = "::1";

/// The parts of a request that address resolution looks at
///
/// Implemented for full requests (middleware) and for request parts
/// (extractors and route filters) so both resolve identically.
pub trait RequestSource {
	fn headers(&self) -> &HeaderMap;
	fn extensions(&self) -> &Extensions;
	fn uri(&self) -> &Uri;

	fn peer_addr(&self) -> Option<SocketAddr> {
		self.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0)
	}
}

impl<B> RequestSource for Request<B> {
	fn headers(&self) -> &HeaderMap {
		Request::headers(self)
	}

	fn extensions(&self) -> &Extensions {
		Request::extensions(self)
	}

	fn uri(&self) -> &Uri {
		Request::uri(self)
	}
}

impl RequestSource for Parts {
	fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	fn extensions(&self) -> &Extensions {
		&self.extensions
	}

	fn uri(&self) -> &Uri {
		&self.uri
	}
}

#[derive(Debug)]
enum ResolveError {
	NoPeerAddress,
	Loopback,
}

impl std::fmt::Display for ResolveError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ResolveError::NoPeerAddress => write!(f, "no forwarded address and no peer address"),
			ResolveError::Loopback => write!(f, "address resolved to the IPv6 loopback"),
		}
	}
}

pub struct ClientIdentifier {
	sentinel: Box<str>,
	trust_forwarded_for: bool,
	log: Arc<AccessLog>,
}

impl ClientIdentifier {
	pub fn new(config: &ShieldConfig, log: Arc<AccessLog>) -> Self {
		Self {
			sentinel: config.sentinel_ip.clone(),
			trust_forwarded_for: config.trust_forwarded_for,
			log,
		}
	}

	pub fn sentinel(&self) -> &str {
		&self.sentinel
	}

	/// Address of the caller, or the sentinel address if it cannot be determined
	pub fn resolve<R: RequestSource + ?Sized>(&self, req: &R) -> String {
		match self.try_resolve(req) {
			Ok(ip) => ip,
			Err(err) => {
				self.log.record(
					Severity::Critical,
					"client_ip.resolve",
					format!(
						"There was a problem getting the IP address for {} ({}). It was assigned the arbitrary {}",
						req.uri(),
						err,
						self.sentinel
					),
				);
				self.sentinel.to_string()
			}
		}
	}

	fn try_resolve<R: RequestSource + ?Sized>(&self, req: &R) -> Result<String, ResolveError> {
		let ip = match self.forwarded_for(req.headers()) {
			Some(ip) => ip,
			None => req.peer_addr().ok_or(ResolveError::NoPeerAddress)?.ip().to_string(),
		};

		if ip == IPV6_LOOPBACK {
			return Err(ResolveError::Loopback);
		}
		Ok(ip)
	}

	/// First entry of `X-Forwarded-For`, if the header is trusted and usable
	fn forwarded_for(&self, headers: &HeaderMap) -> Option<String> {
		if !self.trust_forwarded_for {
			return None;
		}
		let value = headers.get(X_FORWARDED_FOR)?;
		let Ok(value) = value.to_str() else {
			debug!("ignoring non-ASCII X-Forwarded-For header");
			return None;
		};

		// "client, proxy1, proxy2": the leftmost entry is the original client
		let first = value.split(',').next().map(str::trim).unwrap_or_default();
		(!first.is_empty()).then(|| first.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;

	fn identifier() -> (ClientIdentifier, Arc<AccessLog>) {
		let log = Arc::new(AccessLog::default());
		(ClientIdentifier::new(&ShieldConfig::default(), log.clone()), log)
	}

	fn request(peer: Option<&str>, xff: Option<&str>) -> Request<Body> {
		let mut builder = Request::builder().uri("/some/path");
		if let Some(xff) = xff {
			builder = builder.header(X_FORWARDED_FOR, xff);
		}
		let mut req = builder.body(Body::empty()).unwrap();
		if let Some(peer) = peer {
			let addr: SocketAddr = peer.parse().unwrap();
			req.extensions_mut().insert(ConnectInfo(addr));
		}
		req
	}

	#[test]
	fn test_forwarded_for_wins() {
		let (ident, _log) = identifier();
		let req = request(Some("192.168.1.20:5000"), Some("203.0.113.1"));
		assert_eq!(ident.resolve(&req), "203.0.113.1");
	}

	#[test]
	fn test_forwarded_for_first_segment() {
		let (ident, _log) = identifier();
		let req = request(None, Some(" 203.0.113.1 , 10.0.0.1, 10.0.0.2"));
		assert_eq!(ident.resolve(&req), "203.0.113.1");
	}

	#[test]
	fn test_empty_forwarded_for_falls_back() {
		let (ident, log) = identifier();
		let req = request(Some("192.168.1.20:5000"), Some(""));
		assert_eq!(ident.resolve(&req), "192.168.1.20");
		assert!(log.is_empty());
	}

	#[test]
	fn test_peer_address() {
		let (ident, _log) = identifier();
		let req = request(Some("[2001:db8::5]:443"), None);
		assert_eq!(ident.resolve(&req), "2001:db8::5");
	}

	#[test]
	fn test_loopback_gets_sentinel() {
		let (ident, log) = identifier();
		let req = request(Some("[::1]:8080"), None);
		assert_eq!(ident.resolve(&req), "198.51.100.255");

		let entries = log.all();
		assert_eq!(entries.len(), 1);
		assert_eq!(entries[0].severity(), Severity::Critical);
	}

	#[test]
	fn test_forwarded_loopback_gets_sentinel() {
		let (ident, _log) = identifier();
		let req = request(Some("192.168.1.20:5000"), Some("::1"));
		assert_eq!(ident.resolve(&req), "198.51.100.255");
	}

	#[test]
	fn test_missing_peer_gets_sentinel() {
		let (ident, log) = identifier();
		let req = request(None, None);
		assert_eq!(ident.resolve(&req), "198.51.100.255");
		assert_eq!(log.all()[0].severity(), Severity::Critical);
	}

	#[test]
	fn test_untrusted_forwarded_for_ignored() {
		let log = Arc::new(AccessLog::default());
		let config = ShieldConfig { trust_forwarded_for: false, ..ShieldConfig::default() };
		let ident = ClientIdentifier::new(&config, log);
		let req = request(Some("192.168.1.20:5000"), Some("203.0.113.1"));
		assert_eq!(ident.resolve(&req), "192.168.1.20");
	}

	#[test]
	fn test_parts_resolve_identically() {
		let (ident, _log) = identifier();
		let req = request(Some("192.168.1.20:5000"), Some("203.0.113.1"));
		let from_request = ident.resolve(&req);
		let (parts, _body) = req.into_parts();
		assert_eq!(ident.resolve(&parts), from_request);
	}
}

// vim: ts=4
