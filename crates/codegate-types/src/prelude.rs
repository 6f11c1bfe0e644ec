pub use crate::error::{CgResult, Error};
pub use crate::types::{Clock, Timestamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
