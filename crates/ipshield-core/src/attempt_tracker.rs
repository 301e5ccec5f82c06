//! Failed Attempt Tracker
//!
//! Counts suspicious request outcomes per address and bans an address once
//! it reaches the configured number of failures. Requests for secret files
//! (paths ending in a secure suffix such as `.env`) are banned on the first
//! try. The whole table is discarded by a request-triggered daily sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ipshield_types::clock::elapsed;
use ipshield_types::types::AttemptRecord;
use parking_lot::Mutex;

use crate::access_log::AccessLog;
use crate::ban_registry::BanRegistry;
use crate::config::ShieldConfig;
use crate::prelude::*;

pub struct AttemptTracker {
	attempts: DashMap<Box<str>, AttemptRecord>,
	last_sweep: Mutex<DateTime<Utc>>,
	max_attempts: u32,
	sweep_interval: Duration,
	secure_suffixes: Box<[Box<str>]>,
	bans: Arc<BanRegistry>,
	log: Arc<AccessLog>,
	clock: SharedClock,
}

impl AttemptTracker {
	pub fn new(
		config: &ShieldConfig,
		bans: Arc<BanRegistry>,
		log: Arc<AccessLog>,
		clock: SharedClock,
	) -> Self {
		Self {
			attempts: DashMap::new(),
			last_sweep: Mutex::new(clock.now()),
			max_attempts: config.max_attempts,
			sweep_interval: config.sweep_interval,
			secure_suffixes: config.secure_suffixes.clone().into_boxed_slice(),
			bans,
			log,
			clock,
		}
	}

	fn secure_suffix(&self, path: &str) -> Option<&str> {
		self.secure_suffixes.iter().map(|suffix| &**suffix).find(|suffix| path.ends_with(*suffix))
	}

	/// Count a failed request of `ip` on `path`, banning when warranted
	pub fn record_failure(&self, ip: &str, path: &str) {
		if let Some(suffix) = self.secure_suffix(path) {
			self.bans.ban(
				ip,
				&format!("Blocked for unauthorized access attempt onto secure path: {}.", path),
			);
			self.log.record(
				Severity::Informational,
				"attempt_tracker.record_failure",
				format!(
					"{} tried to access {} which ended in '{}'. IP has been banned.",
					ip, path, suffix
				),
			);
			return;
		}

		// Increment and threshold check under the entry lock; ban after it is released
		let (count, distinct, ban_reason) = {
			let mut record =
				self.attempts.entry(ip.into()).or_insert_with(|| AttemptRecord::new(ip));
			record.record(path);
			let ban_reason = (record.count >= self.max_attempts).then(|| {
				format!(
					"Blocked after repeated unauthorized attempts on paths: {}. Total failed attempts: {}.",
					record.joined_paths(),
					record.count
				)
			});
			(record.count, record.paths.len(), ban_reason)
		};

		self.log.record(
			Severity::Informational,
			"attempt_tracker.record_failure",
			format!(
				"{} attempted to access {}. Total attempts: {}. Total distinct paths: {}.",
				ip, path, count, distinct
			),
		);

		if let Some(reason) = ban_reason {
			self.bans.ban(ip, &reason);
		}
	}

	/// Clear the attempt table and the access log if the sweep interval has passed
	///
	/// Runs at the start of request handling rather than on a timer, so with
	/// no traffic the table can outlive the interval. Returns `true` when a
	/// sweep happened.
	pub fn sweep(&self) -> bool {
		let now = self.clock.now();
		{
			let mut last_sweep = self.last_sweep.lock();
			if elapsed(*last_sweep, now) <= self.sweep_interval {
				return false;
			}
			*last_sweep = now;
		}

		let dropped = self.attempts.len();
		self.attempts.clear();
		self.log.clear();
		self.log.record(
			Severity::Informational,
			"attempt_tracker.sweep",
			"Failed attempts and logs were cleared out!",
		);
		debug!(dropped, "attempt table swept");
		true
	}

	/// Drop all attempt records (the access log is left alone)
	pub fn reset(&self) {
		self.attempts.clear();
	}

	/// Snapshot of the record for `ip`
	pub fn attempts(&self, ip: &str) -> Option<AttemptRecord> {
		self.attempts.get(ip).map(|record| record.clone())
	}

	/// Number of failures recorded for `ip` since the last sweep
	pub fn count(&self, ip: &str) -> u32 {
		self.attempts.get(ip).map_or(0, |record| record.count)
	}

	pub fn tracked_ips(&self) -> usize {
		self.attempts.len()
	}
}


// vim: ts=4
