//! Output module for notification digests and catalog reports
//!
//! This module handles:
//! - Rendering markdown digests for notifications
//! - Rendering newly tracked records for the log
//! - Loading and printing catalog statistics

mod markdown;
pub mod stats;

pub use markdown::{format_error_digest, format_new_content_digest, format_record_table};
pub use stats::{load_statistics, print_statistics, CatalogStatistics};
