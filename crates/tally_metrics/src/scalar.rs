//! Plain event counters

use crate::next_stat_id;
use tally_core::stats::{Flags, Stat, StatInfo, StatValue};

/// A single accumulating value.
#[derive(Debug, Clone)]
pub struct Scalar {
    info: StatInfo,
    value: f64,
}

impl Scalar {
    /// A visible, initialised counter starting at zero.
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            info: StatInfo::new(next_stat_id(), name, desc, Flags::visible()),
            value: 0.0,
        }
    }

    /// Replace the flag set. Leaving out `INIT` marks the stat as never
    /// finished, which makes enabling the registry fail.
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.info.set_flags(flags);
        self
    }

    pub fn inc(&mut self) {
        self.value += 1.0;
    }

    pub fn add(&mut self, value: f64) {
        self.value += value;
    }

    pub fn set(&mut self, value: f64) {
        self.value = value;
    }

    pub fn get(&self) -> f64 {
        self.value
    }
}

impl Stat for Scalar {
    fn info(&self) -> &StatInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StatInfo {
        &mut self.info
    }

    fn value(&self) -> StatValue {
        StatValue::Scalar(self.value)
    }

    fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// A fixed-length vector of counters, one per subname.
#[derive(Debug, Clone)]
pub struct VectorStat {
    info: StatInfo,
    subnames: Vec<String>,
    values: Vec<f64>,
}

impl VectorStat {
    pub fn new(name: impl Into<String>, desc: impl Into<String>, subnames: &[&str]) -> Self {
        Self {
            info: StatInfo::new(next_stat_id(), name, desc, Flags::visible()),
            subnames: subnames.iter().map(|s| s.to_string()).collect(),
            values: vec![0.0; subnames.len()],
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.info.set_flags(flags);
        self
    }

    pub fn subnames(&self) -> &[String] {
        &self.subnames
    }

    /// Add `value` to element `index`. Out-of-range indices are ignored.
    pub fn add(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot += value;
        }
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}

impl Stat for VectorStat {
    fn info(&self) -> &StatInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StatInfo {
        &mut self.info
    }

    fn value(&self) -> StatValue {
        StatValue::Vector(self.values.clone())
    }

    fn check(&self) -> bool {
        !self.values.is_empty()
    }

    fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }
}
