pub use ipshield_types::prelude::*;

pub use tracing::{debug, error, info, warn};

pub use crate::state::Shield;

// vim: ts=4
