use crate::stats::StatHandle;
use std::rc::Rc;

/// The counting engine that owns and updates stat values.
///
/// The lifecycle controller never computes values itself; it only asks the
/// engine for its flat registration list and gives it a chance to flush
/// queued work around dumps and resets.
pub trait CountingEngine {
    /// Every stat registered directly with the engine, in registration order.
    fn registered_stats(&self) -> Vec<StatHandle>;

    /// Called once after every stat has been enabled. Registration closes here.
    fn enable_all(&mut self) {}

    /// Flush work queued for the next dump. Runs once per dump epoch.
    fn process_dump_queue(&mut self) {}

    /// Flush work queued for the next reset.
    fn process_reset_queue(&mut self) {}
}

/// A child reference in the simulated object tree.
#[derive(Clone)]
pub enum ChildRef {
    Single(Rc<dyn StatObject>),
    /// Homogeneous ordered collection; elements bind as `name0`, `name1`, ...
    Vector(Vec<Rc<dyn StatObject>>),
}

/// A node of the simulated object tree whose shape the stat registry mirrors.
pub trait StatObject {
    /// Named children in declaration order.
    fn named_children(&self) -> Vec<(String, ChildRef)>;

    /// Stats owned directly by this object.
    fn stats(&self) -> Vec<StatHandle>;

    /// Reset object-owned derived state. Owned stats are reset by the registry.
    fn reset_stats(&self) {}
}
