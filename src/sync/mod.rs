//! Synchronization of the continue page with the catalog
//!
//! - `engine`: one transactional sync pass
//! - `retry`: bounded retries for detail lookups
//! - `worker`: the periodic loop driving the engine

mod engine;
pub mod retry;
mod worker;

pub use engine::{PassOutcome, SyncEngine};
pub use retry::{last_season_info_with_retry, RetryPolicy};
pub use worker::{Worker, AUTH_ERROR_TITLE, SYNC_ERROR_TITLE};
