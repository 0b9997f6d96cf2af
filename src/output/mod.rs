//! Output module for exports and cache statistics
//!
//! This module handles:
//! - Exporting resolved records as JSON in the external wire shape
//! - Reporting cache statistics for the --stats mode

mod json;
pub mod stats;

pub use json::{records_to_json, write_export};
pub use stats::{load_statistics, print_statistics, CacheStatistics};
