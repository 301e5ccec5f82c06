//! Observer lists backed by unbounded flume channels

use parking_lot::Mutex;

pub(crate) struct Subscribers<T> {
	senders: Mutex<Vec<flume::Sender<T>>>,
}

impl<T: Clone> Subscribers<T> {
	pub(crate) fn new() -> Self {
		Self { senders: Mutex::new(Vec::new()) }
	}

	pub(crate) fn subscribe(&self) -> flume::Receiver<T> {
		let (tx, rx) = flume::unbounded();
		self.senders.lock().push(tx);
		rx
	}

	/// Send `event` to every live subscriber, dropping the disconnected ones
	pub(crate) fn notify(&self, event: &T) {
		let mut senders = self.senders.lock();
		senders.retain(|tx| tx.send(event.clone()).is_ok());
	}

	pub(crate) fn detach_all(&self) {
		self.senders.lock().clear();
	}

	pub(crate) fn len(&self) -> usize {
		self.senders.lock().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_notify_reaches_all() {
		let subs = Subscribers::<u32>::new();
		let a = subs.subscribe();
		let b = subs.subscribe();
		subs.notify(&7);
		assert_eq!(a.try_recv().ok(), Some(7));
		assert_eq!(b.try_recv().ok(), Some(7));
	}

	#[test]
	fn test_dropped_receivers_are_pruned() {
		let subs = Subscribers::<u32>::new();
		let a = subs.subscribe();
		drop(subs.subscribe());
		subs.notify(&1);
		assert_eq!(subs.len(), 1);
		assert_eq!(a.try_recv().ok(), Some(1));
	}

	#[test]
	fn test_detach_all_disconnects() {
		let subs = Subscribers::<u32>::new();
		let a = subs.subscribe();
		subs.detach_all();
		assert!(a.recv().is_err());
	}
}

// vim: ts=4
