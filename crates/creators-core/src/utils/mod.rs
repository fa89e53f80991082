//! Utility functions for display formatting.

pub mod format;

pub use format::{format_optional, format_timestamp, format_until, truncate_string};
