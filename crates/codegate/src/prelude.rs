pub use codegate_core::prelude::*;

// vim: ts=4
