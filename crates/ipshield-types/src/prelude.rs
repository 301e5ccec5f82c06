pub use crate::clock::{Clock, SharedClock};
pub use crate::error::{Error, ShieldResult};
pub use crate::log_entry::{LogEntry, Severity};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
