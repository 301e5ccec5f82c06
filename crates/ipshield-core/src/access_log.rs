//! Moderation Access Log
//!
//! In-memory, insertion-ordered record of moderation events. Every entry is
//! mirrored to `tracing`, kept for inspection through [`AccessLog::all`] and
//! pushed to subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::prelude::*;
use crate::subscribers::Subscribers;

pub struct AccessLog {
	/// Program name stamped on entries created through [`AccessLog::record`]
	source: Box<str>,
	entries: RwLock<Vec<LogEntry>>,
	next_id: AtomicU64,
	added: Subscribers<LogEntry>,
	cleared: Subscribers<Arc<[LogEntry]>>,
}

impl AccessLog {
	pub fn new(source: &str) -> Self {
		Self {
			source: source.into(),
			entries: RwLock::new(Vec::new()),
			next_id: AtomicU64::new(1),
			added: Subscribers::new(),
			cleared: Subscribers::new(),
		}
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	/// Append an entry and notify "added" subscribers
	///
	/// Subscribers are notified under the write lock, so every subscriber sees
	/// entries in the same order as [`AccessLog::all`].
	pub fn append(&self, entry: LogEntry) {
		entry.trace();
		let mut entries = self.entries.write();
		self.added.notify(&entry);
		entries.push(entry);
	}

	/// Build an entry with this log's source and the next sequence id, then append it
	pub fn record(&self, severity: Severity, operation: &str, message: impl Into<Box<str>>) {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let entry = LogEntry::new(severity, operation, message).with_source(&self.source).with_id(id);
		self.append(entry);
	}

	/// Empty the log
	///
	/// "Cleared" subscribers receive the final contents before they are
	/// dropped. Subscriptions stay attached; see [`AccessLog::unsubscribe_all`].
	pub fn clear(&self) {
		let mut entries = self.entries.write();
		let drained: Arc<[LogEntry]> = std::mem::take(&mut *entries).into();
		self.cleared.notify(&drained);
		debug!(dropped = drained.len(), "access log cleared");
	}

	/// Snapshot of all entries in insertion order
	pub fn all(&self) -> Vec<LogEntry> {
		self.entries.read().clone()
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	pub fn subscribe_added(&self) -> flume::Receiver<LogEntry> {
		self.added.subscribe()
	}

	/// Receives the entries that were removed by each [`AccessLog::clear`]
	pub fn subscribe_cleared(&self) -> flume::Receiver<Arc<[LogEntry]>> {
		self.cleared.subscribe()
	}

	pub fn unsubscribe_all(&self) {
		self.added.detach_all();
		self.cleared.detach_all();
	}
}

impl Default for AccessLog {
	fn default() -> Self {
		Self::new(ipshield_types::log_entry::DEFAULT_SOURCE)
	}
}


// vim: ts=4
