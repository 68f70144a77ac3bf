//! Derived stats computed when the registry prepares for a dump

use crate::next_stat_id;
use std::cell::RefCell;
use std::rc::Rc;
use tally_core::stats::{Flags, Stat, StatInfo, StatValue};

/// `numerator / denominator`, evaluated at prepare time.
///
/// Operands are shared with the engine that owns them. The cached value is
/// NaN until the first prepare.
pub struct Ratio {
    info: StatInfo,
    operands: Option<(Rc<RefCell<dyn Stat>>, Rc<RefCell<dyn Stat>>)>,
    cached: f64,
}

impl Ratio {
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            info: StatInfo::new(next_stat_id(), name, desc, Flags::visible()),
            operands: None,
            cached: f64::NAN,
        }
    }

    /// Bind the operands. A ratio without operands fails its self check.
    pub fn of<N, D>(mut self, numerator: Rc<RefCell<N>>, denominator: Rc<RefCell<D>>) -> Self
    where
        N: Stat + 'static,
        D: Stat + 'static,
    {
        let numerator: Rc<RefCell<dyn Stat>> = numerator;
        let denominator: Rc<RefCell<dyn Stat>> = denominator;
        self.operands = Some((numerator, denominator));
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.info.set_flags(flags);
        self
    }
}

impl Stat for Ratio {
    fn info(&self) -> &StatInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StatInfo {
        &mut self.info
    }

    fn value(&self) -> StatValue {
        StatValue::Scalar(self.cached)
    }

    fn check(&self) -> bool {
        self.operands.is_some()
    }

    fn prepare(&mut self) {
        if let Some((numerator, denominator)) = &self.operands {
            let num = numerator.borrow().value().total();
            let den = denominator.borrow().value().total();
            self.cached = num / den;
        }
    }

    // Derived from operands; nothing to reset.
    fn reset(&mut self) {}
}

impl std::fmt::Debug for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ratio")
            .field("info", &self.info)
            .field("cached", &self.cached)
            .finish_non_exhaustive()
    }
}
