//! ipshield: abuse-mitigation middleware for axum services.
//!
//! Build the shared services once with [`ShieldBuilder`], then attach them to
//! a router:
//!
//! ```no_run
//! use axum::{Router, routing::get};
//! use ipshield::{ShieldBuilder, ShieldRouterExt};
//!
//! # async fn run() -> ipshield::ShieldResult<()> {
//! let shield = ShieldBuilder::new().max_attempts(5).build()?;
//! let app = Router::new().route("/", get(|| async { "hello" })).shielded(&shield);
//! let _watch = shield.activity.spawn_idle_watch();
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
//! 	.await
//! 	.map_err(|err| ipshield::Error::Internal(err.to_string()))?;
//! axum::serve(listener, app.into_make_service_with_connect_info::<std::net::SocketAddr>())
//! 	.await
//! 	.map_err(|err| ipshield::Error::Internal(err.to_string()))?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod shield;

pub use ipshield_core::{
	AccessLog, ActivityConfig, ActivityLayer, ApiKeyConfig, ApiKeyGuard, ApiKeySource,
	AttemptTracker, BanGateLayer, BanRegistry, ClientAddr, ClientIdentifier,
	EndpointActivityMonitor, EnvApiKeySource, FailureRecorded, Reclaimer, RequestGateLayer,
	RequestSource, RouteMatched, Shield, ShieldConfig, ShieldState, StaticApiKey,
	mark_route_matched, require_api_key,
};
pub use ipshield_types::clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use ipshield_types::error::{Error, ShieldResult};
pub use ipshield_types::log_entry::{LogEntry, Severity};
pub use ipshield_types::types::{AttemptRecord, BannedEntry, EndpointAccessRecord};
pub use shield::{ShieldBuilder, ShieldRouterExt, init_tracing};

// vim: ts=4
