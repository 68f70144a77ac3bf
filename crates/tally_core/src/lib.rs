//! Tally Core
//!
//! Lifecycle management for a simulation's statistics registry:
//! - Stat, engine, object-tree and output contracts
//! - Group registry mirrored from the object tree
//! - Enable / prepare / dump / reset controller with per-tick dump dedup
//! - Scheduled and periodic dumps
//! - Simulated time

pub mod stats;
pub mod time;

pub use stats::{DumpOutcome, DumpScope, Statistics, StatsError};
pub use time::Tick;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
