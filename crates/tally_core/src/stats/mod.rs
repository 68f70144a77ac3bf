//! Statistics registry core types.
//!
//! Two stat populations are managed side by side: the flat legacy index
//! (stats registered straight with the counting engine) and the group tree
//! bound from the simulated object hierarchy. `Statistics` owns both and
//! drives them through enable, prepare, dump and reset.

mod engine;
mod flags;
mod group;
mod legacy_index;
mod output;
mod schedule;
mod stat;
mod stat_handle;
mod statistics;
mod stats_error;

#[cfg(test)]
mod test_support;

pub use engine::{ChildRef, CountingEngine, StatObject};
pub use flags::Flags;
pub use group::StatGroup;
pub use legacy_index::{compare_dotted, LegacyIndex};
pub use output::{EventLog, Output, RecordedEvent, Recorder, SinkError};
pub use schedule::{StatEvent, StatEventQueue};
pub use stat::{Stat, StatId, StatInfo, StatValue};
pub use stat_handle::StatHandle;
pub use statistics::{DumpOutcome, DumpScope, Lifecycle, Statistics};
pub use stats_error::StatsError;
