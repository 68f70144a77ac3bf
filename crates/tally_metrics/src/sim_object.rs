//! Simulated object tree nodes
//!
//! `SimObject` is a minimal object-tree node for models that have no tree
//! of their own: it owns stats, named children and reset hooks.

use crate::{shared, Shared};
use std::cell::RefCell;
use std::rc::Rc;
use tally_core::stats::{ChildRef, Stat, StatHandle, StatObject};

#[derive(Default)]
pub struct SimObject {
    stats: RefCell<Vec<StatHandle>>,
    children: RefCell<Vec<(String, ChildRef)>>,
    reset_hooks: RefCell<Vec<Box<dyn Fn()>>>,
}

impl SimObject {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Attach a stat owned by this object.
    pub fn add_stat<S: Stat + 'static>(&self, stat: S) -> Shared<S> {
        let stat = shared(stat);
        self.stats
            .borrow_mut()
            .push(StatHandle::from_shared(stat.clone()));
        stat
    }

    pub fn add_child(&self, name: impl Into<String>, child: Rc<SimObject>) {
        self.children
            .borrow_mut()
            .push((name.into(), ChildRef::Single(child)));
    }

    /// Attach a vector child; elements bind as `name0`, `name1`, ...
    pub fn add_vector(&self, name: impl Into<String>, children: Vec<Rc<SimObject>>) {
        let children = children
            .into_iter()
            .map(|child| child as Rc<dyn StatObject>)
            .collect();
        self.children
            .borrow_mut()
            .push((name.into(), ChildRef::Vector(children)));
    }

    /// Run `hook` whenever the registry resets this object.
    pub fn on_reset(&self, hook: impl Fn() + 'static) {
        self.reset_hooks.borrow_mut().push(Box::new(hook));
    }
}

impl StatObject for SimObject {
    fn named_children(&self) -> Vec<(String, ChildRef)> {
        self.children.borrow().clone()
    }

    fn stats(&self) -> Vec<StatHandle> {
        self.stats.borrow().clone()
    }

    fn reset_stats(&self) {
        for hook in self.reset_hooks.borrow().iter() {
            hook();
        }
    }
}
