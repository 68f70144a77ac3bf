// statistics.rs - Lifecycle controller for the stat registry
//
// Drives the create -> enable -> {prepare, dump}* -> reset ordering over two
// independent populations: the flat legacy index and the bound group tree.
// Whole-tree dumps happen at most once per tick; sub-tree dumps may repeat.

use crate::stats::{
    CountingEngine, LegacyIndex, Output, SinkError, StatGroup, StatHandle, StatObject, StatsError,
};
use crate::time::Tick;
use std::rc::Rc;
use tracing::{debug, info};

/// Where the registry is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Unconfigured,
    Enabled,
    Prepared,
    Dumped,
}

/// What a dump should cover.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DumpScope<'a> {
    /// Every legacy stat followed by the whole group tree.
    Root,
    /// The group at this path (relative to the registry root), bracketed by
    /// `begin_group`/`end_group` for each path component.
    Group(&'a [&'a str]),
}

/// Result of a [`Statistics::dump`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DumpOutcome {
    /// Sinks were driven. `new_epoch` is set when this was the first dump at
    /// its tick, which is also when stats were prepared.
    Emitted { new_epoch: bool },
    /// A whole-tree dump at an already dumped tick.
    Suppressed,
}

/// Owns the registry state: bound groups, legacy index, sinks and the
/// last-dump watermark.
pub struct Statistics<E> {
    engine: E,
    root: StatGroup,
    bound: bool,
    legacy: LegacyIndex,
    outputs: Vec<Box<dyn Output>>,
    state: Lifecycle,
    last_dump: Tick,
}

impl<E: CountingEngine> Statistics<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            root: StatGroup::root(),
            bound: false,
            legacy: LegacyIndex::default(),
            outputs: Vec::new(),
            state: Lifecycle::Unconfigured,
            last_dump: 0,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Mirror the object tree rooted at `root` into the group registry.
    ///
    /// Allowed once, before [`enable`](Self::enable).
    pub fn bind(&mut self, root: &Rc<dyn StatObject>) -> Result<(), StatsError> {
        if self.state != Lifecycle::Unconfigured {
            return Err(StatsError::AlreadyEnabled);
        }
        if self.bound {
            return Err(StatsError::AlreadyBound);
        }

        self.root = StatGroup::bind(root)?;
        self.bound = true;

        let mut groups = 0usize;
        self.root.visit_groups(&mut |_: &StatGroup| groups += 1);
        info!(groups, stats = self.root.stat_count(), "bound stat hierarchy");
        Ok(())
    }

    /// Add a sink. It only sees dumps issued after this call.
    pub fn configure(&mut self, output: Box<dyn Output>) {
        debug!(?output, "configured stat output");
        self.outputs.push(output);
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Freeze the stat population.
    ///
    /// Snapshots the engine's registrations into the legacy index, checks
    /// every stat in both populations, renames hidden stats to their
    /// placeholder and enables everything. Fails without enabling anything
    /// if a stat was never properly initialised.
    pub fn enable(&mut self) -> Result<(), StatsError> {
        if self.state != Lifecycle::Unconfigured {
            return Err(StatsError::AlreadyEnabled);
        }

        let registered = self.engine.registered_stats();
        let mut tree_stats = Vec::new();
        self.root.visit_stats(|_, stat| tree_stats.push(stat.clone()));

        for stat in registered.iter().chain(&tree_stats) {
            check_stat(stat)?;
        }

        let legacy = LegacyIndex::build(registered);
        for stat in legacy.iter().chain(&tree_stats) {
            stat.borrow_mut().enable();
        }
        self.engine.enable_all();

        self.legacy = legacy;
        self.state = Lifecycle::Enabled;
        info!(
            legacy = self.legacy.len(),
            hierarchical = tree_stats.len(),
            "statistics enabled"
        );
        Ok(())
    }

    /// Let every stat finalize derived values before it is read.
    ///
    /// [`dump`](Self::dump) calls this once per new tick; calling it again
    /// inside the same tick simply prepares the values a second time.
    pub fn prepare(&mut self) -> Result<(), StatsError> {
        self.ensure_enabled()?;

        for stat in self.legacy.iter() {
            stat.borrow_mut().prepare();
        }
        self.root.visit_stats(|_, stat| stat.borrow_mut().prepare());

        self.state = Lifecycle::Prepared;
        Ok(())
    }

    /// Dump stats at tick `now` to every valid sink.
    ///
    /// `now` must not be earlier than the previous dump. A whole-tree dump
    /// at the same tick as the previous dump is suppressed; sub-tree dumps
    /// always run. Stats are prepared only on the first dump of a tick.
    pub fn dump(&mut self, now: Tick, scope: DumpScope<'_>) -> Result<DumpOutcome, StatsError> {
        self.ensure_enabled()?;
        if now < self.last_dump {
            return Err(StatsError::TimeRegression {
                last: self.last_dump,
                requested: now,
            });
        }
        if let DumpScope::Group(path) = scope {
            if self.root.resolve(path).is_none() {
                return Err(StatsError::UnknownGroup {
                    path: path.join("."),
                });
            }
        }

        let new_epoch = now != self.last_dump;
        self.last_dump = now;

        if !new_epoch && scope == DumpScope::Root {
            debug!(tick = now, "skipping duplicate stat dump");
            return Ok(DumpOutcome::Suppressed);
        }

        if new_epoch {
            self.engine.process_dump_queue();
            self.prepare()?;
        }

        let subtree = match scope {
            DumpScope::Root => None,
            DumpScope::Group(path) => self.root.resolve(path),
        };
        debug!(tick = now, new_epoch, ?scope, "dumping stats");

        for output in self.outputs.iter_mut() {
            if !output.valid() {
                continue;
            }
            output.begin()?;
            dump_to(output.as_mut(), &self.legacy, &self.root, subtree)?;
            output.end()?;
        }

        self.state = Lifecycle::Dumped;
        Ok(DumpOutcome::Emitted { new_epoch })
    }

    /// Return every stat to its base state. The dump watermark is untouched.
    pub fn reset(&mut self) -> Result<(), StatsError> {
        self.ensure_enabled()?;

        self.root.visit_groups(&mut |group: &StatGroup| {
            if let Some(object) = group.object() {
                object.reset_stats();
            }
            for stat in group.stats() {
                stat.borrow_mut().reset();
            }
        });
        for stat in self.legacy.iter() {
            stat.borrow_mut().reset();
        }
        self.engine.process_reset_queue();

        self.state = Lifecycle::Enabled;
        debug!("statistics reset");
        Ok(())
    }

    fn ensure_enabled(&self) -> Result<(), StatsError> {
        match self.state {
            Lifecycle::Unconfigured => Err(StatsError::NotEnabled),
            _ => Ok(()),
        }
    }
}

impl<E> Statistics<E> {
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state != Lifecycle::Unconfigured
    }

    /// Tick of the most recent dump request (0 before any dump).
    pub fn last_dump(&self) -> Tick {
        self.last_dump
    }

    pub fn root(&self) -> &StatGroup {
        &self.root
    }

    pub fn legacy(&self) -> &LegacyIndex {
        &self.legacy
    }

    /// Look up a legacy stat by its (post-enable) name.
    pub fn find(&self, name: &str) -> Option<&StatHandle> {
        self.legacy.find(name)
    }
}

fn check_stat(stat: &StatHandle) -> Result<(), StatsError> {
    let mut stat = stat.borrow_mut();
    if !stat.check() || !stat.base_check() {
        return Err(StatsError::UninitializedStat {
            name: stat.info().name().to_string(),
            id: stat.info().id(),
        });
    }
    if !stat.info().is_displayed() {
        let placeholder = stat.info().placeholder_name();
        stat.info_mut().set_name(placeholder);
    }
    Ok(())
}

fn dump_to(
    output: &mut dyn Output,
    legacy: &LegacyIndex,
    root: &StatGroup,
    subtree: Option<&StatGroup>,
) -> Result<(), SinkError> {
    let Some(group) = subtree else {
        for stat in legacy.iter() {
            stat.borrow().visit(output)?;
        }
        return root.dump_into(output);
    };

    for name in group.path() {
        output.begin_group(name)?;
    }
    group.dump_into(output)?;
    for _ in group.path() {
        output.end_group()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::test_support::{test_stat, TestEngine, TestObject};
    use crate::stats::{Flags, RecordedEvent, Recorder};

    fn count_begins(log: &[RecordedEvent]) -> usize {
        log.iter().filter(|e| **e == RecordedEvent::Begin).count()
    }

    #[test]
    fn lifecycle_states() {
        let mut stats = Statistics::new(TestEngine::default());
        assert_eq!(stats.state(), Lifecycle::Unconfigured);

        stats.enable().unwrap();
        assert_eq!(stats.state(), Lifecycle::Enabled);
        assert!(stats.engine().enabled);

        stats.prepare().unwrap();
        assert_eq!(stats.state(), Lifecycle::Prepared);

        stats.dump(10, DumpScope::Root).unwrap();
        assert_eq!(stats.state(), Lifecycle::Dumped);

        stats.reset().unwrap();
        assert_eq!(stats.state(), Lifecycle::Enabled);
    }

    #[test]
    fn operations_before_enable_are_rejected() {
        let mut stats = Statistics::new(TestEngine::default());
        assert!(matches!(stats.prepare(), Err(StatsError::NotEnabled)));
        assert!(matches!(stats.dump(1, DumpScope::Root), Err(StatsError::NotEnabled)));
        assert!(matches!(stats.reset(), Err(StatsError::NotEnabled)));
    }

    #[test]
    fn second_enable_is_rejected() {
        let mut stats = Statistics::new(TestEngine::default());
        stats.enable().unwrap();
        assert!(matches!(stats.enable(), Err(StatsError::AlreadyEnabled)));
    }

    #[test]
    fn bind_rules() {
        let root = TestObject::new().into_dyn();
        let mut stats = Statistics::new(TestEngine::default());
        stats.bind(&root).unwrap();
        assert!(matches!(stats.bind(&root), Err(StatsError::AlreadyBound)));

        let mut stats = Statistics::new(TestEngine::default());
        stats.enable().unwrap();
        assert!(matches!(stats.bind(&root), Err(StatsError::AlreadyEnabled)));
    }

    #[test]
    fn hidden_stats_are_renamed_but_still_visited() {
        let (hidden, _) = test_stat(42, "internal", Flags::INIT);
        let (shown, _) = test_stat(43, "shown", Flags::visible());
        let mut stats = Statistics::new(TestEngine::with_stats(vec![hidden.clone(), shown]));
        let recorder = Recorder::new();
        let log = recorder.log();
        stats.configure(Box::new(recorder));

        stats.enable().unwrap();
        assert_eq!(hidden.name(), "__Stat000042");
        assert!(stats.find("__Stat000042").is_some());
        assert!(stats.find("internal").is_none());

        stats.dump(1, DumpScope::Root).unwrap();
        let names: Vec<String> = log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Stat { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, ["__Stat000042", "shown"]);
    }

    #[test]
    fn uninitialized_stat_fails_enable() {
        let (bad, _) = test_stat(7, "bad", Flags::DISPLAY);
        let (good, good_ref) = test_stat(8, "good", Flags::visible());
        let mut stats = Statistics::new(TestEngine::with_stats(vec![good, bad]));

        let err = stats.enable().unwrap_err();
        assert!(matches!(err, StatsError::UninitializedStat { ref name, id: 7 } if name == "bad"));
        assert!(!good_ref.borrow().enabled);
        assert_eq!(stats.state(), Lifecycle::Unconfigured);
    }

    #[test]
    fn failing_self_check_fails_enable() {
        let (stat, stat_ref) = test_stat(3, "ratio", Flags::visible());
        stat_ref.borrow_mut().check_ok = false;
        let root = TestObject::new().with_stat(stat).into_dyn();

        let mut stats = Statistics::new(TestEngine::default());
        stats.bind(&root).unwrap();
        assert!(matches!(
            stats.enable(),
            Err(StatsError::UninitializedStat { id: 3, .. })
        ));
    }

    #[test]
    fn dump_at_tick_zero_is_a_duplicate() {
        let mut stats = Statistics::new(TestEngine::default());
        stats.enable().unwrap();
        assert_eq!(stats.dump(0, DumpScope::Root).unwrap(), DumpOutcome::Suppressed);
        assert_eq!(
            stats.dump(1, DumpScope::Root).unwrap(),
            DumpOutcome::Emitted { new_epoch: true }
        );
    }

    #[test]
    fn prepare_runs_once_per_tick() {
        let (legacy, legacy_ref) = test_stat(1, "legacy", Flags::visible());
        let (owned, owned_ref) = test_stat(2, "owned", Flags::visible());
        let root = TestObject::new()
            .with_child("cpu", TestObject::new().with_stat(owned))
            .into_dyn();
        let mut stats = Statistics::new(TestEngine::with_stats(vec![legacy]));
        stats.bind(&root).unwrap();
        stats.enable().unwrap();

        stats.dump(10, DumpScope::Root).unwrap();
        stats.dump(10, DumpScope::Group(&["cpu"])).unwrap();
        stats.dump(10, DumpScope::Group(&["cpu"])).unwrap();
        assert_eq!(legacy_ref.borrow().prepares, 1);
        assert_eq!(owned_ref.borrow().prepares, 1);
        assert_eq!(stats.engine().dump_queue_runs, 1);

        // A sub-tree dump at a new tick still prepares everything.
        stats.dump(11, DumpScope::Group(&["cpu"])).unwrap();
        assert_eq!(legacy_ref.borrow().prepares, 2);
        assert_eq!(stats.engine().dump_queue_runs, 2);
    }

    #[test]
    fn invalid_sinks_are_skipped() {
        let mut stats = Statistics::new(TestEngine::default());
        let good = Recorder::new();
        let bad = Recorder::new();
        let (good_log, bad_log) = (good.log(), bad.log());
        bad.validity().set(false);
        stats.configure(Box::new(good));
        stats.configure(Box::new(bad));
        stats.enable().unwrap();

        stats.dump(5, DumpScope::Root).unwrap();
        assert_eq!(count_begins(&good_log.borrow()), 1);
        assert!(bad_log.borrow().is_empty());
    }

    #[test]
    fn unknown_group_leaves_watermark_alone() {
        let mut stats = Statistics::new(TestEngine::default());
        stats.enable().unwrap();
        stats.dump(5, DumpScope::Root).unwrap();

        let err = stats.dump(9, DumpScope::Group(&["nope", "deeper"])).unwrap_err();
        assert!(matches!(err, StatsError::UnknownGroup { path } if path == "nope.deeper"));
        assert_eq!(stats.last_dump(), 5);
    }

    #[test]
    fn late_sinks_only_see_later_dumps() {
        let mut stats = Statistics::new(TestEngine::default());
        stats.enable().unwrap();
        stats.dump(1, DumpScope::Root).unwrap();

        let recorder = Recorder::new();
        let log = recorder.log();
        stats.configure(Box::new(recorder));
        assert!(log.borrow().is_empty());

        stats.dump(2, DumpScope::Root).unwrap();
        assert_eq!(count_begins(&log.borrow()), 1);
    }

    #[test]
    fn reset_reaches_objects_stats_and_engine() {
        let (legacy, legacy_ref) = test_stat(1, "legacy", Flags::visible());
        let (owned, owned_ref) = test_stat(2, "owned", Flags::visible());
        let object = TestObject::new().with_stat(owned).into_rc();
        let root = TestObject::new().with_child_rc("cpu", object.clone()).into_dyn();

        let mut stats = Statistics::new(TestEngine::with_stats(vec![legacy]));
        stats.bind(&root).unwrap();
        stats.enable().unwrap();
        stats.reset().unwrap();

        assert_eq!(legacy_ref.borrow().resets, 1);
        assert_eq!(owned_ref.borrow().resets, 1);
        assert_eq!(object.resets.get(), 1);
        assert_eq!(stats.engine().reset_queue_runs, 1);
    }
}
