// Test doubles for the engine, stat and object-tree contracts.

use crate::stats::{
    ChildRef, CountingEngine, Flags, Stat, StatHandle, StatId, StatInfo, StatObject, StatValue,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub(crate) struct TestStat {
    pub info: StatInfo,
    pub value: f64,
    pub check_ok: bool,
    pub enabled: bool,
    pub prepares: u32,
    pub resets: u32,
}

impl Stat for TestStat {
    fn info(&self) -> &StatInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StatInfo {
        &mut self.info
    }

    fn value(&self) -> StatValue {
        StatValue::Scalar(self.value)
    }

    fn check(&self) -> bool {
        self.check_ok
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn prepare(&mut self) {
        self.prepares += 1;
    }

    fn reset(&mut self) {
        self.value = 0.0;
        self.resets += 1;
    }
}

pub(crate) fn test_stat(
    id: StatId,
    name: &str,
    flags: Flags,
) -> (StatHandle, Rc<RefCell<TestStat>>) {
    let stat = Rc::new(RefCell::new(TestStat {
        info: StatInfo::new(id, name, "", flags),
        value: 0.0,
        check_ok: true,
        enabled: false,
        prepares: 0,
        resets: 0,
    }));
    (StatHandle::from_shared(stat.clone()), stat)
}

/// A visible, initialised stat.
pub(crate) fn stat(id: StatId, name: &str) -> StatHandle {
    test_stat(id, name, Flags::visible()).0
}

#[derive(Default)]
pub(crate) struct TestEngine {
    pub stats: Vec<StatHandle>,
    pub enabled: bool,
    pub dump_queue_runs: u32,
    pub reset_queue_runs: u32,
}

impl TestEngine {
    pub fn with_stats(stats: Vec<StatHandle>) -> Self {
        Self {
            stats,
            ..Self::default()
        }
    }
}

impl CountingEngine for TestEngine {
    fn registered_stats(&self) -> Vec<StatHandle> {
        self.stats.clone()
    }

    fn enable_all(&mut self) {
        self.enabled = true;
    }

    fn process_dump_queue(&mut self) {
        self.dump_queue_runs += 1;
    }

    fn process_reset_queue(&mut self) {
        self.reset_queue_runs += 1;
    }
}

#[derive(Default)]
pub(crate) struct TestObject {
    stats: Vec<StatHandle>,
    children: RefCell<Vec<(String, ChildRef)>>,
    pub resets: Cell<u32>,
}

impl TestObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stat(mut self, stat: StatHandle) -> Self {
        self.stats.push(stat);
        self
    }

    pub fn with_child(self, name: &str, child: TestObject) -> Self {
        self.with_child_rc(name, Rc::new(child))
    }

    pub fn with_child_rc(self, name: &str, child: Rc<TestObject>) -> Self {
        self.add_child(name, child);
        self
    }

    pub fn with_vector(self, name: &str, children: Vec<TestObject>) -> Self {
        let children = children
            .into_iter()
            .map(|child| Rc::new(child) as Rc<dyn StatObject>)
            .collect();
        self.children
            .borrow_mut()
            .push((name.to_string(), ChildRef::Vector(children)));
        self
    }

    pub fn add_child(&self, name: &str, child: Rc<dyn StatObject>) {
        self.children
            .borrow_mut()
            .push((name.to_string(), ChildRef::Single(child)));
    }

    pub fn into_rc(self) -> Rc<TestObject> {
        Rc::new(self)
    }

    pub fn into_dyn(self) -> Rc<dyn StatObject> {
        Rc::new(self)
    }
}

impl StatObject for TestObject {
    fn named_children(&self) -> Vec<(String, ChildRef)> {
        self.children.borrow().clone()
    }

    fn stats(&self) -> Vec<StatHandle> {
        self.stats.clone()
    }

    fn reset_stats(&self) {
        self.resets.set(self.resets.get() + 1);
    }
}
