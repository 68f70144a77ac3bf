use crate::stats::StatHandle;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Flat, name-sorted snapshot of the stats registered with the engine.
///
/// Built once at enable time; membership never changes afterwards.
#[derive(Debug, Default)]
pub struct LegacyIndex {
    stats: Vec<StatHandle>,
    name_lookup: HashMap<String, StatHandle>,
}

impl LegacyIndex {
    /// Sort `stats` by dotted name and index them.
    ///
    /// The sort is stable, so stats sharing a name keep registration order
    /// and the lookup table resolves to the last of them.
    pub fn build(mut stats: Vec<StatHandle>) -> Self {
        stats.sort_by(|a, b| compare_dotted(a.borrow().info().name(), b.borrow().info().name()));

        let name_lookup = stats
            .iter()
            .map(|stat| (stat.name(), stat.clone()))
            .collect();

        Self { stats, name_lookup }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatHandle> {
        self.stats.iter()
    }

    pub fn find(&self, name: &str) -> Option<&StatHandle> {
        self.name_lookup.get(name)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Compare dotted names component by component.
///
/// Each component is compared as a plain string, so `cpu10` sorts between
/// `cpu1` and `cpu2`. A name that is a component-prefix of another sorts
/// first (`a.b` < `a.b.c`).
pub fn compare_dotted(a: &str, b: &str) -> Ordering {
    a.split('.').cmp(b.split('.'))
}
