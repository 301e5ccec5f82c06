//! Shield builder and router integration

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use ipshield_core::{
	ActivityLayer, BanGateLayer, Reclaimer, RequestGateLayer, Shield, ShieldConfig, ShieldState,
	mark_route_matched,
};
use ipshield_types::clock::{SharedClock, SystemClock};
use ipshield_types::error::ShieldResult;
use tracing::info;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the shared services once; clone the resulting [`Shield`] into every layer
pub struct ShieldBuilder {
	config: ShieldConfig,
	clock: Option<SharedClock>,
	reclaimers: Vec<Arc<dyn Reclaimer>>,
}

impl ShieldBuilder {
	pub fn new() -> Self {
		ShieldBuilder { config: ShieldConfig::default(), clock: None, reclaimers: Vec::new() }
	}

	// Config
	pub fn config(&mut self, config: ShieldConfig) -> &mut Self { self.config = config; self }
	pub fn source(&mut self, source: impl Into<Box<str>>) -> &mut Self { self.config.source = source.into(); self }
	pub fn max_attempts(&mut self, max_attempts: u32) -> &mut Self { self.config.max_attempts = max_attempts; self }
	pub fn sweep_interval(&mut self, sweep_interval: Duration) -> &mut Self { self.config.sweep_interval = sweep_interval; self }
	pub fn sentinel_ip(&mut self, sentinel_ip: impl Into<Box<str>>) -> &mut Self { self.config.sentinel_ip = sentinel_ip.into(); self }
	pub fn trust_forwarded_for(&mut self, trust: bool) -> &mut Self { self.config.trust_forwarded_for = trust; self }
	pub fn secure_suffixes(&mut self, suffixes: impl IntoIterator<Item = impl Into<Box<str>>>) -> &mut Self {
		self.config.secure_suffixes = suffixes.into_iter().map(|suffix| suffix.into()).collect();
		self
	}
	pub fn idle_reclaim(&mut self, idle_timeout: Duration) -> &mut Self {
		self.config.activity.idle_timeout = Some(idle_timeout);
		self.config.activity.reclaim_memory = true;
		self
	}

	// Services
	pub fn clock(&mut self, clock: SharedClock) -> &mut Self { self.clock = Some(clock); self }
	pub fn reclaimer(&mut self, reclaimer: Arc<dyn Reclaimer>) -> &mut Self { self.reclaimers.push(reclaimer); self }

	/// Validate the configuration and construct the services
	pub fn build(&self) -> ShieldResult<Shield> {
		let clock = self.clock.clone().unwrap_or_else(|| Arc::new(SystemClock));
		let shield = ShieldState::new(self.config.clone(), clock)?;
		for reclaimer in &self.reclaimers {
			shield.activity.register_reclaimer(reclaimer.clone());
		}

		info!(
			"ipshield V{} ready: ban after {} failures, sweep every {}s",
			VERSION,
			shield.config.max_attempts,
			shield.config.sweep_interval.as_secs()
		);
		Ok(shield)
	}
}

impl Default for ShieldBuilder {
	fn default() -> Self { Self::new() }
}

/// Attach shield layers to an axum [`Router`]
pub trait ShieldRouterExt {
	/// Full pipeline: ban check, failure classification and activity tracking
	///
	/// Call after all routes are added, the route marker only wraps routes
	/// that exist at this point.
	#[must_use]
	fn shielded(self, shield: &Shield) -> Self;

	/// Only keep banned callers out
	#[must_use]
	fn ban_gated(self, shield: &Shield) -> Self;
}

impl<S> ShieldRouterExt for Router<S>
where
	S: Clone + Send + Sync + 'static,
{
	fn shielded(self, shield: &Shield) -> Self {
		self.route_layer(axum::middleware::from_fn(mark_route_matched))
			.layer(ActivityLayer::new(shield.activity.clone()))
			.layer(RequestGateLayer::new(shield.clone()))
	}

	fn ban_gated(self, shield: &Shield) -> Self {
		self.layer(BanGateLayer::new(shield.clone()))
	}
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`
///
/// Does nothing when a global subscriber is already set.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.try_init();
}


// vim: ts=4
