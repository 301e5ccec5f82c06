//! Abuse-mitigation services and middleware.
//!
//! The services here are plain structs with internal synchronization. They
//! are constructed once into a [`ShieldState`] and shared through the
//! [`Shield`] handle by the tower layers in [`gate`] and [`activity`].

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod access_log;
pub mod activity;
pub mod api_key;
pub mod attempt_tracker;
pub mod ban_registry;
pub mod client_ip;
pub mod config;
pub mod extract;
pub mod gate;
mod prelude;
pub mod state;
mod subscribers;

pub use access_log::AccessLog;
pub use activity::{ActivityLayer, EndpointActivityMonitor, Reclaimer};
pub use api_key::{ApiKeyGuard, ApiKeySource, EnvApiKeySource, StaticApiKey, require_api_key};
pub use attempt_tracker::AttemptTracker;
pub use ban_registry::BanRegistry;
pub use client_ip::{ClientIdentifier, RequestSource};
pub use config::{ActivityConfig, ApiKeyConfig, ShieldConfig};
pub use extract::ClientAddr;
pub use gate::{BanGateLayer, FailureRecorded, RequestGateLayer, RouteMatched, mark_route_matched};
pub use state::{Shield, ShieldState};

/// Route log output of unit tests through the test writer
#[cfg(test)]
pub(crate) fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

// vim: ts=4
