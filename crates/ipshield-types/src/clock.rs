//! Clock abstraction
//!
//! Sweeps and idle checks read time through [`Clock`] so they can be driven
//! by a [`ManualClock`] in tests instead of waiting on the wall clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// Manually advanced clock
#[derive(Debug)]
pub struct ManualClock {
	now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
	pub fn new(start: DateTime<Utc>) -> Self {
		Self { now: Mutex::new(start) }
	}

	pub fn advance(&self, by: Duration) {
		let mut now = self.now.lock();
		if let Some(next) = now.checked_add_signed(to_delta(by)) {
			*now = next;
		}
	}

	pub fn set(&self, to: DateTime<Utc>) {
		*self.now.lock() = to;
	}
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new(Utc::now())
	}
}

impl Clock for ManualClock {
	fn now(&self) -> DateTime<Utc> {
		*self.now.lock()
	}
}

/// Time elapsed from `earlier` to `now`, zero if the clock went backwards
pub fn elapsed(earlier: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
	(now - earlier).to_std().unwrap_or(Duration::ZERO)
}

fn to_delta(d: Duration) -> TimeDelta {
	TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_manual_clock_advance() {
		let start = Utc::now();
		let clock = ManualClock::new(start);
		clock.advance(Duration::from_secs(90));
		assert_eq!(elapsed(start, clock.now()), Duration::from_secs(90));
	}

	#[test]
	fn test_elapsed_saturates_backwards() {
		let now = Utc::now();
		let earlier = now + TimeDelta::seconds(10);
		assert_eq!(elapsed(earlier, now), Duration::ZERO);
	}
}

// vim: ts=4
