//! Shared types for the ipshield abuse-mitigation middleware.
//!
//! This crate holds the plain data types that flow between the services of
//! `ipshield-core` (ban entries, attempt records, moderation log entries),
//! the error type, and the clock abstraction used for time-based sweeps.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod log_entry;
pub mod prelude;
pub mod types;

// vim: ts=4
