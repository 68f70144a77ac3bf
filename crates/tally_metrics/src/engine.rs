// engine.rs - Reference counting engine
//
// Holds the flat registration list handed to the registry at enable time,
// plus the dump and reset callback queues model code hooks into.

use crate::{shared, EngineError, Scalar, Shared};
use tally_core::stats::{CountingEngine, Stat, StatHandle};
use tracing::debug;

type Callback = Box<dyn FnMut()>;

#[derive(Default)]
pub struct Engine {
    stats: Vec<StatHandle>,
    closed: bool,
    dump_queue: Vec<Callback>,
    reset_queue: Vec<Callback>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stat and hand back a typed reference for updating it.
    pub fn register<S: Stat + 'static>(&mut self, stat: S) -> Result<Shared<S>, EngineError> {
        let stat = shared(stat);
        self.register_shared(stat.clone())?;
        Ok(stat)
    }

    /// Register a stat the caller already shares.
    pub fn register_shared<S>(&mut self, stat: Shared<S>) -> Result<(), EngineError>
    where
        S: Stat + 'static,
    {
        if self.closed {
            return Err(EngineError::RegistrationClosed {
                name: stat.borrow().info().name().to_string(),
            });
        }
        self.stats.push(StatHandle::from_shared(stat));
        Ok(())
    }

    /// Shorthand for registering a visible [`Scalar`].
    pub fn scalar(
        &mut self,
        name: impl Into<String>,
        desc: impl Into<String>,
    ) -> Result<Shared<Scalar>, EngineError> {
        self.register(Scalar::new(name, desc))
    }

    /// Run `callback` every time a new dump tick starts.
    pub fn on_dump(&mut self, callback: impl FnMut() + 'static) {
        self.dump_queue.push(Box::new(callback));
    }

    /// Run `callback` on every reset.
    pub fn on_reset(&mut self, callback: impl FnMut() + 'static) {
        self.reset_queue.push(Box::new(callback));
    }

    /// Whether registration has been closed by enabling the registry.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

impl CountingEngine for Engine {
    fn registered_stats(&self) -> Vec<StatHandle> {
        self.stats.clone()
    }

    fn enable_all(&mut self) {
        self.closed = true;
        debug!(stats = self.stats.len(), "engine registration closed");
    }

    fn process_dump_queue(&mut self) {
        for callback in &mut self.dump_queue {
            callback();
        }
    }

    fn process_reset_queue(&mut self) {
        for callback in &mut self.reset_queue {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn registration_closes_on_enable() {
        let mut engine = Engine::new();
        engine.scalar("before", "").unwrap();
        engine.enable_all();

        let err = engine.scalar("after", "").unwrap_err();
        assert!(matches!(err, EngineError::RegistrationClosed { name } if name == "after"));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn handles_share_the_registered_stat() {
        let mut engine = Engine::new();
        let insts = engine.scalar("insts", "").unwrap();
        insts.borrow_mut().add(3.0);

        let registered = engine.registered_stats();
        assert_eq!(registered[0].borrow().value().total(), 3.0);
    }

    #[test]
    fn queues_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        for tag in ["first", "second"] {
            let order = Rc::clone(&order);
            engine.on_dump(move || order.borrow_mut().push(tag));
        }
        let reset_order = Rc::clone(&order);
        engine.on_reset(move || reset_order.borrow_mut().push("reset"));

        engine.process_dump_queue();
        engine.process_dump_queue();
        engine.process_reset_queue();
        assert_eq!(*order.borrow(), ["first", "second", "first", "second", "reset"]);
    }
}
