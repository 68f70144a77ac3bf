//! Simulator-wide stats
//!
//! `sim_ticks`, `sim_seconds` and `host_seconds`, registered straight with
//! the engine so they land in the legacy index ahead of any model stats.

use crate::{Engine, EngineError, HostSeconds, Shared, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tally_core::time::SimClock;

/// Handles to the simulator-wide stats.
pub struct SimStats {
    pub host_seconds: Shared<HostSeconds>,
}

impl SimStats {
    /// Register the simulator-wide stats, sampling time from `clock`.
    pub fn register(
        engine: &mut Engine,
        clock: Rc<RefCell<SimClock>>,
    ) -> Result<Self, EngineError> {
        let ticks = Rc::clone(&clock);
        engine.register(Value::new(
            "sim_ticks",
            "Number of ticks simulated",
            move || ticks.borrow().now() as f64,
        ))?;
        engine.register(Value::new(
            "sim_seconds",
            "Number of seconds simulated",
            move || clock.borrow().seconds(),
        ))?;
        let host_seconds = engine.register(HostSeconds::new(
            "host_seconds",
            "Real time elapsed on the host",
        ))?;

        Ok(Self { host_seconds })
    }
}
