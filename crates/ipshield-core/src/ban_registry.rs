//! Ban Registry
//!
//! Set of banned addresses with the reason they were banned. The first
//! reason wins: banning an address again changes nothing and emits no event.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use ipshield_types::types::BannedEntry;

use crate::access_log::AccessLog;
use crate::prelude::*;
use crate::subscribers::Subscribers;

pub struct BanRegistry {
	bans: DashMap<Box<str>, BannedEntry>,
	subscribers: Subscribers<BannedEntry>,
	log: Arc<AccessLog>,
}

impl BanRegistry {
	pub fn new(log: Arc<AccessLog>) -> Self {
		Self { bans: DashMap::new(), subscribers: Subscribers::new(), log }
	}

	/// Ban `ip` unless it is already banned
	///
	/// Returns `true` when this call created the ban. Check and insert happen
	/// under the map's shard lock, so concurrent first bans of the same
	/// address produce exactly one event.
	pub fn ban(&self, ip: &str, reason: &str) -> bool {
		let entry = match self.bans.entry(ip.into()) {
			Entry::Occupied(_) => return false,
			Entry::Vacant(slot) => {
				let entry = BannedEntry::new(ip, reason);
				slot.insert(entry.clone());
				entry
			}
		};

		self.subscribers.notify(&entry);
		self.log.record(
			Severity::Warning,
			"ban_registry.ban",
			format!("{} has been banned. Reason: {}", ip, reason),
		);
		true
	}

	/// Reason `ip` was banned, if it is banned
	pub fn reason(&self, ip: &str) -> Option<String> {
		self.bans.get(ip).map(|entry| entry.reason.clone())
	}

	/// Whether `ip` is banned
	///
	/// A hit is logged as a warning: a banned address coming back is itself
	/// a signal worth recording.
	pub fn is_banned(&self, ip: &str) -> bool {
		match self.reason(ip) {
			Some(reason) => {
				self.log.record(
					Severity::Warning,
					"ban_registry.is_banned",
					format!("{} was already blocked! Reason: {}", ip, reason),
				);
				true
			}
			None => false,
		}
	}

	/// Lift a ban. Returns `true` if `ip` was banned.
	pub fn unban(&self, ip: &str) -> bool {
		let removed = self.bans.remove(ip).is_some();
		if removed {
			self.log.record(
				Severity::Informational,
				"ban_registry.unban",
				format!("{} has been unbanned.", ip),
			);
		}
		removed
	}

	/// Receive every ban created from now on
	pub fn subscribe(&self) -> flume::Receiver<BannedEntry> {
		self.subscribers.subscribe()
	}

	/// Snapshot of the current bans
	pub fn list(&self) -> Vec<BannedEntry> {
		self.bans.iter().map(|entry| entry.value().clone()).collect()
	}

	pub fn len(&self) -> usize {
		self.bans.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bans.is_empty()
	}

	/// Drop every ban and detach all subscribers
	pub fn reset(&self) {
		self.bans.clear();
		self.subscribers.detach_all();
		info!("ban registry reset");
	}
}


// vim: ts=4
