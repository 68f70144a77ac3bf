use crate::stats::{SinkError, StatId};
use crate::time::Tick;
use thiserror::Error;

/// Errors raised by the statistics lifecycle.
///
/// None of these are recoverable: they signal either a collaborator that
/// never finished initialising a stat or a caller breaking the
/// enable/dump/reset ordering.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("statistics are already enabled")]
    AlreadyEnabled,

    #[error("statistics have not been enabled")]
    NotEnabled,

    #[error("the stat hierarchy is already bound")]
    AlreadyBound,

    #[error("statistic '{name}' ({id}) was not properly initialized by its owner")]
    UninitializedStat { name: String, id: StatId },

    #[error("dump requested at tick {requested}, but stats were already dumped at tick {last}")]
    TimeRegression { last: Tick, requested: Tick },

    #[error("no stat group at path '{path}'")]
    UnknownGroup { path: String },

    #[error("stat group '{path}' is bound more than once")]
    DuplicateGroup { path: String },

    #[error("object at '{path}' is its own descendant")]
    CyclicHierarchy { path: String },

    #[error(transparent)]
    Sink(#[from] SinkError),
}
