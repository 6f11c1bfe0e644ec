pub use crate::app::App;
pub use codegate_types::error::{CgResult, Error};
pub use codegate_types::types::{Clock, Timestamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
