//! Moderation log entries
//!
//! A [`LogEntry`] records one moderation event (a ban, a failed attempt, a
//! resolution problem). Entries are built once through the per-severity
//! constructors and never change afterwards; the fields are only reachable
//! through getters.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Source name used when the owning log did not configure one
pub const DEFAULT_SOURCE: &str = "ipshield";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Severity {
	Error = 0,
	Warning = 1,
	Success = 2,
	Informational = 3,
	Message = 4,
	Critical = 5,
	Celebrate = 6,
}

impl Severity {
	pub fn as_str(self) -> &'static str {
		match self {
			Severity::Error => "Error",
			Severity::Warning => "Warning",
			Severity::Success => "Success",
			Severity::Informational => "Informational",
			Severity::Message => "Message",
			Severity::Critical => "Critical",
			Severity::Celebrate => "Celebrate",
		}
	}
}

impl std::fmt::Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
	#[serde(skip_serializing_if = "Option::is_none")]
	id: Option<u64>,
	timestamp: DateTime<Utc>,
	source: Box<str>,
	operation: Box<str>,
	severity: Severity,
	message: Box<str>,
}

impl LogEntry {
	pub fn new(severity: Severity, operation: &str, message: impl Into<Box<str>>) -> Self {
		Self {
			id: None,
			timestamp: Utc::now(),
			source: DEFAULT_SOURCE.into(),
			operation: operation.into(),
			severity,
			message: message.into(),
		}
	}

	pub fn error(operation: &str, message: impl Into<Box<str>>) -> Self {
		Self::new(Severity::Error, operation, message)
	}

	pub fn warning(operation: &str, message: impl Into<Box<str>>) -> Self {
		Self::new(Severity::Warning, operation, message)
	}

	pub fn success(operation: &str, message: impl Into<Box<str>>) -> Self {
		Self::new(Severity::Success, operation, message)
	}

	pub fn informational(operation: &str, message: impl Into<Box<str>>) -> Self {
		Self::new(Severity::Informational, operation, message)
	}

	pub fn message(operation: &str, message: impl Into<Box<str>>) -> Self {
		Self::new(Severity::Message, operation, message)
	}

	pub fn critical(operation: &str, message: impl Into<Box<str>>) -> Self {
		Self::new(Severity::Critical, operation, message)
	}

	pub fn celebrate(operation: &str, message: impl Into<Box<str>>) -> Self {
		Self::new(Severity::Celebrate, operation, message)
	}

	#[must_use]
	pub fn with_id(mut self, id: u64) -> Self {
		self.id = Some(id);
		self
	}

	#[must_use]
	pub fn with_source(mut self, source: &str) -> Self {
		self.source = source.into();
		self
	}

	#[must_use]
	pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
		self.timestamp = timestamp;
		self
	}

	pub fn id(&self) -> Option<u64> {
		self.id
	}

	pub fn timestamp(&self) -> DateTime<Utc> {
		self.timestamp
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn operation(&self) -> &str {
		&self.operation
	}

	pub fn severity(&self) -> Severity {
		self.severity
	}

	pub fn text(&self) -> &str {
		&self.message
	}

	/// Mirror the entry to the tracing subscriber
	pub fn trace(&self) {
		let (source, operation, message) = (&*self.source, &*self.operation, &*self.message);
		match self.severity {
			Severity::Error | Severity::Critical => {
				tracing::error!(source, operation, severity = %self.severity, "{}", message);
			}
			Severity::Warning => {
				tracing::warn!(source, operation, severity = %self.severity, "{}", message);
			}
			Severity::Message => {
				tracing::debug!(source, operation, severity = %self.severity, "{}", message);
			}
			Severity::Success | Severity::Informational | Severity::Celebrate => {
				tracing::info!(source, operation, severity = %self.severity, "{}", message);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_factories_set_severity() {
		assert_eq!(LogEntry::critical("op", "x").severity(), Severity::Critical);
		assert_eq!(LogEntry::celebrate("op", "x").severity(), Severity::Celebrate);
		assert_eq!(LogEntry::message("op", "x").severity(), Severity::Message);
	}

	#[test]
	fn test_severity_discriminants() {
		assert_eq!(Severity::Error as u8, 0);
		assert_eq!(Severity::Informational as u8, 3);
		assert_eq!(Severity::Celebrate as u8, 6);
	}

	#[test]
	fn test_builders() {
		let entry = LogEntry::warning("ban_registry.is_banned", "blocked")
			.with_id(7)
			.with_source("billing-api");
		assert_eq!(entry.id(), Some(7));
		assert_eq!(entry.source(), "billing-api");
		assert_eq!(entry.operation(), "ban_registry.is_banned");
		assert_eq!(entry.text(), "blocked");
	}

	#[test]
	fn test_default_source() {
		assert_eq!(LogEntry::success("op", "ok").source(), DEFAULT_SOURCE);
	}

	#[test]
	fn test_serialize() {
		let entry = LogEntry::informational("tracker", "hello");
		let json = serde_json::to_value(&entry).unwrap();
		assert_eq!(json["severity"], "Informational");
		assert_eq!(json["operation"], "tracker");
		assert!(json.get("id").is_none());
	}
}

// vim: ts=4
