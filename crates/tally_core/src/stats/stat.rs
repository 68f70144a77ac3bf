// stat.rs - The counter contract consumed from the counting engine
//
// Stats are created and owned by the counting engine. The registry only
// holds shared handles and drives the lifecycle hooks below.

use crate::stats::{Flags, Output, SinkError};

pub type StatId = u64;

/// Identity and presentation metadata shared by every stat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatInfo {
    id: StatId,
    name: String,
    desc: String,
    flags: Flags,
}

impl StatInfo {
    pub fn new(id: StatId, name: impl Into<String>, desc: impl Into<String>, flags: Flags) -> Self {
        Self {
            id,
            name: name.into(),
            desc: desc.into(),
            flags,
        }
    }

    #[inline]
    pub fn id(&self) -> StatId {
        self.id
    }

    /// Dotted name, relative to the owning scope.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn desc(&self) -> &str {
        &self.desc
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    /// Whether the stat should appear in human-readable output.
    #[inline]
    pub fn is_displayed(&self) -> bool {
        self.flags.contains(Flags::DISPLAY)
    }

    /// Checks every stat must pass regardless of its concrete type.
    ///
    /// Fails when the owner never marked the stat initialised, or when a
    /// displayed stat was left without a name.
    pub fn base_check(&self) -> bool {
        if !self.flags.contains(Flags::INIT) {
            return false;
        }
        !(self.is_displayed() && self.name.is_empty())
    }

    /// Name given to stats without `DISPLAY` once the registry is enabled.
    pub fn placeholder_name(&self) -> String {
        format!("__Stat{:06}", self.id)
    }
}

/// Snapshot of a stat's value as handed to output sinks.
#[derive(Clone, Debug, PartialEq)]
pub enum StatValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl StatValue {
    pub fn is_zero(&self) -> bool {
        match self {
            StatValue::Scalar(v) => *v == 0.0,
            StatValue::Vector(values) => values.iter().all(|v| *v == 0.0),
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            StatValue::Scalar(v) => v.is_nan(),
            StatValue::Vector(values) => !values.is_empty() && values.iter().all(|v| v.is_nan()),
        }
    }

    /// Sum of all elements (the value itself for scalars).
    pub fn total(&self) -> f64 {
        match self {
            StatValue::Scalar(v) => *v,
            StatValue::Vector(values) => values.iter().sum(),
        }
    }
}

/// A single named measurement exposed by the counting engine.
pub trait Stat {
    fn info(&self) -> &StatInfo;

    fn info_mut(&mut self) -> &mut StatInfo;

    /// Current value. Derived stats report what `prepare` last computed.
    fn value(&self) -> StatValue;

    /// Type-specific self check run once at enable time.
    fn check(&self) -> bool {
        true
    }

    fn base_check(&self) -> bool {
        self.info().base_check()
    }

    /// Called exactly once when the registry is enabled.
    fn enable(&mut self) {}

    /// Finalize derived values before sinks read them.
    fn prepare(&mut self) {}

    /// Return to the base state.
    fn reset(&mut self);

    /// Push this stat into a sink.
    fn visit(&self, output: &mut dyn Output) -> Result<(), SinkError> {
        output.visit(self.info(), &self.value())
    }
}
