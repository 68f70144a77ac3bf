//! Tally Metrics - Reference counting engine
//!
//! Concrete stat types and an engine that owns them, for models that do not
//! bring their own counting backend.
//!
//! # Usage
//!
//! ```ignore
//! use tally_metrics::{Engine, SimObject, Scalar};
//! use tally_core::{DumpScope, Statistics};
//!
//! let mut engine = Engine::new();
//! let ticks = engine.scalar("sim_ticks", "Number of ticks simulated")?;
//!
//! let root = SimObject::new();
//! let insts = root.add_stat(Scalar::new("insts", "Instructions committed"));
//!
//! let mut stats = Statistics::new(engine);
//! stats.bind(&(root as Rc<dyn StatObject>))?;
//! stats.enable()?;
//! insts.borrow_mut().inc();
//! stats.dump(1_000, DumpScope::Root)?;
//! ```

mod engine;
mod engine_error;
mod formula;
mod host_timer;
mod scalar;
mod sim_object;
mod sim_stats;

pub use engine::Engine;
pub use engine_error::EngineError;
pub use formula::Ratio;
pub use host_timer::{HostSeconds, Value};
pub use scalar::{Scalar, VectorStat};
pub use sim_object::SimObject;
pub use sim_stats::SimStats;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tally_core::stats::StatId;

/// Typed, shared reference to a stat. The registry holds a type-erased clone.
pub type Shared<S> = Rc<RefCell<S>>;

pub fn shared<S>(stat: S) -> Shared<S> {
    Rc::new(RefCell::new(stat))
}

static NEXT_STAT_ID: AtomicU64 = AtomicU64::new(0);

/// Allocate a process-wide unique stat id.
pub fn next_stat_id() -> StatId {
    NEXT_STAT_ID.fetch_add(1, Ordering::Relaxed)
}
