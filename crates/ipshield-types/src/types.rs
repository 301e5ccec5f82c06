//! Records kept by the moderation services

use std::collections::BTreeSet;
use std::net::Ipv6Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A banned address and why it was banned
///
/// `ipv4` holds the address exactly as it was resolved for the request and
/// is the registry key. When that address is an IPv6 literal it is also
/// copied into `ipv6`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannedEntry {
	#[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
	pub id: Option<String>,
	pub ipv4: String,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub ipv6: Option<String>,
	pub reason: String,
}

impl BannedEntry {
	pub fn new(ip: &str, reason: &str) -> Self {
		let ipv6 = ip.parse::<Ipv6Addr>().ok().map(|_| ip.to_string());
		Self { id: None, ipv4: ip.to_string(), ipv6, reason: reason.to_string() }
	}

	pub fn ip(&self) -> &str {
		&self.ipv4
	}
}

/// Failed request history of one address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
	pub ip_address: String,
	pub count: u32,
	pub paths: BTreeSet<String>,
}

impl AttemptRecord {
	pub fn new(ip_address: &str) -> Self {
		Self { ip_address: ip_address.to_string(), count: 0, paths: BTreeSet::new() }
	}

	/// Count one more failure on `path`
	pub fn record(&mut self, path: &str) {
		self.count = self.count.saturating_add(1);
		if !self.paths.contains(path) {
			self.paths.insert(path.to_string());
		}
	}

	/// Comma separated list of the distinct paths
	pub fn joined_paths(&self) -> String {
		self.paths.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
	}
}

/// Last time a route was requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointAccessRecord {
	pub path: String,
	pub last_accessed_at: DateTime<Utc>,
}


// vim: ts=4
