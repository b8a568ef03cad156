//! Catalog statistics
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the storage layer.

use crate::model::MovieState;
use crate::storage::{CatalogStore, PassRecord};
use crate::NotifierError;

/// Catalog statistics summary
#[derive(Debug, Clone)]
pub struct CatalogStatistics {
    /// Total number of tracked records
    pub total_records: u64,

    /// Records a notification was already sent for
    pub notified: u64,

    /// Records with a progression watermark
    pub with_watermark: u64,

    /// Count of records by state snapshot, zero counts omitted
    pub records_by_state: Vec<(MovieState, u64)>,

    /// Most recent sync pass, if any
    pub latest_pass: Option<PassRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The catalog to query
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(NotifierError)` - Failed to query statistics
pub fn load_statistics(store: &dyn CatalogStore) -> Result<CatalogStatistics, NotifierError> {
    let total_records = store.count_records()?;
    let notified = store.count_notified()?;
    let with_watermark = store.count_with_watermark()?;

    let mut records_by_state = Vec::new();
    for state in MovieState::all_states() {
        let count = store.count_by_state(state)?;
        if count > 0 {
            records_by_state.push((state, count));
        }
    }

    let latest_pass = store.get_latest_pass()?;

    Ok(CatalogStatistics {
        total_records,
        notified,
        with_watermark,
        records_by_state,
        latest_pass,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Tracked titles: {}", stats.total_records);
    println!("  Notified: {}", stats.notified);
    println!("  With progression watermark: {}", stats.with_watermark);
    println!();

    if !stats.records_by_state.is_empty() {
        println!("Records by State:");
        for (state, count) in &stats.records_by_state {
            let percentage = if stats.total_records > 0 {
                (*count as f64 / stats.total_records as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", state, count, percentage);
        }
        println!();
    }

    match &stats.latest_pass {
        Some(pass) => {
            println!("Latest Pass:");
            println!("  Id: {}", pass.id);
            println!("  Started: {}", pass.started_at);
            if let Some(finished) = &pass.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Status: {}", pass.status.to_db_string());
            println!(
                "  New series: {}, new seasons: {}, skipped: {}",
                pass.counts.new_series, pass.counts.new_seasons, pass.counts.skipped_items
            );
            if let Some(error) = &pass.error_message {
                println!("  Error: {}", error);
            }
        }
        None => println!("No sync passes recorded yet"),
    }
}
