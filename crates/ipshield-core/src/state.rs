//! Shield state type

use std::sync::Arc;

use crate::access_log::AccessLog;
use crate::activity::EndpointActivityMonitor;
use crate::attempt_tracker::AttemptTracker;
use crate::ban_registry::BanRegistry;
use crate::client_ip::ClientIdentifier;
use crate::config::ShieldConfig;
use crate::prelude::*;

/// All moderation services, built once and shared by every layer
pub struct ShieldState {
	pub config: ShieldConfig,
	pub log: Arc<AccessLog>,
	pub bans: Arc<BanRegistry>,
	pub attempts: Arc<AttemptTracker>,
	pub client_ip: ClientIdentifier,
	pub activity: Arc<EndpointActivityMonitor>,
}

impl ShieldState {
	/// Validate `config` and wire the services together
	pub fn new(config: ShieldConfig, clock: SharedClock) -> ShieldResult<Shield> {
		config.validate()?;

		let log = Arc::new(AccessLog::new(&config.source));
		let bans = Arc::new(BanRegistry::new(log.clone()));
		let attempts =
			Arc::new(AttemptTracker::new(&config, bans.clone(), log.clone(), clock.clone()));
		let client_ip = ClientIdentifier::new(&config, log.clone());
		let activity = Arc::new(EndpointActivityMonitor::new(&config.activity, clock));

		debug!(source = %config.source, max_attempts = config.max_attempts, "shield state created");
		Ok(Arc::new(Self { config, log, bans, attempts, client_ip, activity }))
	}
}

pub type Shield = Arc<ShieldState>;

// vim: ts=4
