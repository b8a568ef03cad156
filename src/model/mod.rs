//! Domain model for the continue-page pipeline
//!
//! # Components
//!
//! - `MovieState`: viewing state of a continue-page row
//! - `ScrapedItem`: one transient row of a scrape
//! - `MovieRecord`: the persisted catalog entry
//! - `Watermark`: progression tracking and its acceptance rule

mod movie_state;
mod records;

// Re-export main types
pub use movie_state::MovieState;
pub use records::{LastSeasonInfo, MovieRecord, ScrapedItem, Watermark};
