//! Endpoint Activity Monitor
//!
//! Remembers when each route was last requested. When every route has been
//! idle longer than the configured timeout, the registered [`Reclaimer`]s
//! are asked to release memory (caches, pools, buffers).

use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::BoxFuture;
use hyper::Request;
use ipshield_types::clock::elapsed;
use ipshield_types::types::EndpointAccessRecord;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tower::{Layer, Service};

use crate::config::ActivityConfig;
use crate::prelude::*;

/// Something that can give memory back when the service is idle
pub trait Reclaimer: Send + Sync {
	fn name(&self) -> &str;
	fn reclaim(&self);
}

pub struct EndpointActivityMonitor {
	last_accessed: DashMap<Box<str>, DateTime<Utc>>,
	reclaimers: RwLock<Vec<Arc<dyn Reclaimer>>>,
	config: ActivityConfig,
	clock: SharedClock,
}

/// Strip the trailing slash so `/users/` and `/users` share a record
fn normalize(path: &str) -> &str {
	match path.trim_end_matches('/') {
		"" => "/",
		trimmed => trimmed,
	}
}

impl EndpointActivityMonitor {
	pub fn new(config: &ActivityConfig, clock: SharedClock) -> Self {
		Self {
			last_accessed: DashMap::new(),
			reclaimers: RwLock::new(Vec::new()),
			config: config.clone(),
			clock,
		}
	}

	pub fn record_hit(&self, path: &str) {
		self.last_accessed.insert(normalize(path).into(), self.clock.now());
	}

	pub fn was_hit_recently(&self, path: &str, within: Duration) -> bool {
		let now = self.clock.now();
		self.last_accessed
			.get(normalize(path))
			.is_some_and(|last| elapsed(*last, now) < within)
	}

	/// [`was_hit_recently`](Self::was_hit_recently) with the configured window (5 minutes)
	pub fn hit_recently(&self, path: &str) -> bool {
		self.was_hit_recently(path, self.config.recent_window)
	}

	/// True when no tracked route was requested within `timeout`
	///
	/// With nothing tracked yet this is true as well.
	pub fn all_idle(&self, timeout: Duration) -> bool {
		let now = self.clock.now();
		self.last_accessed.iter().all(|entry| elapsed(*entry.value(), now) >= timeout)
	}

	pub fn register_reclaimer(&self, reclaimer: Arc<dyn Reclaimer>) {
		self.reclaimers.write().push(reclaimer);
	}

	/// Run the reclaimers if reclamation is enabled and everything is idle
	pub fn check_idle(&self) -> bool {
		let Some(timeout) = self.config.idle_timeout else {
			return false;
		};
		if !self.config.reclaim_memory || !self.all_idle(timeout) {
			return false;
		}

		let reclaimers = self.reclaimers.read().clone();
		for reclaimer in &reclaimers {
			debug!(reclaimer = reclaimer.name(), "reclaiming idle memory");
			reclaimer.reclaim();
		}
		info!(count = reclaimers.len(), "all endpoints idle, reclaimers run");
		true
	}

	/// Spawn the periodic idle check
	///
	/// Returns `None` when reclamation is disabled. The task holds only a weak
	/// reference and stops once the monitor is dropped.
	pub fn spawn_idle_watch(self: &Arc<Self>) -> Option<JoinHandle<()>> {
		if !self.config.reclaim_memory || self.config.idle_timeout.is_none() {
			return None;
		}
		let period = self.config.check_interval;
		let monitor: Weak<Self> = Arc::downgrade(self);

		Some(tokio::spawn(async move {
			let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
			loop {
				interval.tick().await;
				let Some(monitor) = monitor.upgrade() else {
					debug!("activity monitor dropped, idle watch stopped");
					break;
				};
				monitor.check_idle();
			}
		}))
	}

	/// Snapshot of all access records
	pub fn records(&self) -> Vec<EndpointAccessRecord> {
		self.last_accessed
			.iter()
			.map(|entry| EndpointAccessRecord {
				path: entry.key().to_string(),
				last_accessed_at: *entry.value(),
			})
			.collect()
	}
}

/// Layer recording a hit for every request path
#[derive(Clone)]
pub struct ActivityLayer {
	monitor: Arc<EndpointActivityMonitor>,
}

impl ActivityLayer {
	pub fn new(monitor: Arc<EndpointActivityMonitor>) -> Self {
		Self { monitor }
	}
}

impl<S> Layer<S> for ActivityLayer {
	type Service = ActivityService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		ActivityService { inner, monitor: self.monitor.clone() }
	}
}

#[derive(Clone)]
pub struct ActivityService<S> {
	inner: S,
	monitor: Arc<EndpointActivityMonitor>,
}

impl<S> Service<Request<Body>> for ActivityService<S>
where
	S: Service<Request<Body>, Response = axum::response::Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		self.monitor.record_hit(req.uri().path());
		let fut = self.inner.call(req);
		Box::pin(fut)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ipshield_types::clock::ManualClock;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use tower::ServiceExt;

	struct CountingReclaimer(AtomicUsize);

	impl Reclaimer for CountingReclaimer {
		fn name(&self) -> &str {
			"counting"
		}

		fn reclaim(&self) {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}

	fn monitor(config: ActivityConfig) -> (EndpointActivityMonitor, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::default());
		(EndpointActivityMonitor::new(&config, clock.clone()), clock)
	}

	fn reclaiming() -> ActivityConfig {
		ActivityConfig {
			idle_timeout: Some(Duration::from_secs(600)),
			reclaim_memory: true,
			..ActivityConfig::default()
		}
	}

	#[test]
	fn test_hit_recently() {
		let (monitor, clock) = monitor(ActivityConfig::default());
		assert!(!monitor.hit_recently("/api/items"));

		monitor.record_hit("/api/items");
		assert!(monitor.hit_recently("/api/items"));

		clock.advance(Duration::from_secs(6 * 60));
		assert!(!monitor.hit_recently("/api/items"));
	}

	#[test]
	fn test_trailing_slash_normalized() {
		let (monitor, _clock) = monitor(ActivityConfig::default());
		monitor.record_hit("/api/items/");
		assert!(monitor.was_hit_recently("/api/items", Duration::from_secs(1)));
		monitor.record_hit("/");
		assert!(monitor.hit_recently("/"));
		assert_eq!(monitor.records().len(), 2);
	}

	#[test]
	fn test_all_idle() {
		let (monitor, clock) = monitor(ActivityConfig::default());
		assert!(monitor.all_idle(Duration::from_secs(60)));

		monitor.record_hit("/a");
		clock.advance(Duration::from_secs(30));
		monitor.record_hit("/b");
		clock.advance(Duration::from_secs(40));

		// "/a" idle for 70s, "/b" only for 40s
		assert!(!monitor.all_idle(Duration::from_secs(60)));
		clock.advance(Duration::from_secs(20));
		assert!(monitor.all_idle(Duration::from_secs(60)));
	}

	#[test]
	fn test_check_idle_runs_reclaimers() {
		let (monitor, clock) = monitor(reclaiming());
		let counter = Arc::new(CountingReclaimer(AtomicUsize::new(0)));
		monitor.register_reclaimer(counter.clone());

		monitor.record_hit("/a");
		assert!(!monitor.check_idle());

		clock.advance(Duration::from_secs(601));
		assert!(monitor.check_idle());
		assert_eq!(counter.0.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_check_idle_disabled() {
		let config = ActivityConfig { idle_timeout: Some(Duration::from_secs(1)), ..ActivityConfig::default() };
		let (monitor, clock) = monitor(config);
		let counter = Arc::new(CountingReclaimer(AtomicUsize::new(0)));
		monitor.register_reclaimer(counter.clone());

		clock.advance(Duration::from_secs(10));
		assert!(!monitor.check_idle());
		assert_eq!(counter.0.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_no_watch_without_reclaim() {
		let (monitor, _clock) = monitor(ActivityConfig::default());
		assert!(Arc::new(monitor).spawn_idle_watch().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn test_idle_watch_ticks() {
		let (monitor, clock) = monitor(reclaiming());
		let monitor = Arc::new(monitor);
		let counter = Arc::new(CountingReclaimer(AtomicUsize::new(0)));
		monitor.register_reclaimer(counter.clone());
		clock.advance(Duration::from_secs(3600));

		let handle = monitor.spawn_idle_watch().unwrap();
		tokio::time::sleep(Duration::from_secs(61)).await;
		assert_eq!(counter.0.load(Ordering::SeqCst), 1);

		tokio::time::sleep(Duration::from_secs(60)).await;
		assert_eq!(counter.0.load(Ordering::SeqCst), 2);
		handle.abort();
	}

	#[tokio::test]
	async fn test_layer_records_hits() {
		let (monitor, _clock) = monitor(ActivityConfig::default());
		let monitor = Arc::new(monitor);
		let svc = ActivityLayer::new(monitor.clone()).layer(tower::service_fn(
			|_req: Request<Body>| async { Ok::<_, std::convert::Infallible>(axum::response::Response::new(Body::empty())) },
		));

		let req = Request::builder().uri("/orders/").body(Body::empty()).unwrap();
		svc.oneshot(req).await.unwrap();
		assert!(monitor.hit_recently("/orders"));
	}
}

// vim: ts=4
