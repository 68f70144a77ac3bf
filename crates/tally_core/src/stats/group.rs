// group.rs - Hierarchical stat registry mirrored from the object tree
//
// Groups are built once by `StatGroup::bind` and never restructured
// afterwards. Children keep the order in which they were bound.

use crate::stats::{ChildRef, Output, SinkError, StatHandle, StatObject, StatsError};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// A node of the stat registry: owned stats plus named child groups.
pub struct StatGroup {
    path: Vec<String>,
    stats: Vec<StatHandle>,
    children: IndexMap<String, StatGroup>,
    object: Option<Rc<dyn StatObject>>,
}

impl StatGroup {
    /// Create an empty root group with no backing object.
    pub fn root() -> Self {
        Self {
            path: Vec::new(),
            stats: Vec::new(),
            children: IndexMap::new(),
            object: None,
        }
    }

    /// Build a registry tree mirroring the named-child structure of `root`.
    ///
    /// Vector children bind each element under the child name with its
    /// index appended (`cpu0`, `cpu1`, ...).
    pub fn bind(root: &Rc<dyn StatObject>) -> Result<Self, StatsError> {
        let mut group = Self {
            path: Vec::new(),
            stats: root.stats(),
            children: IndexMap::new(),
            object: Some(Rc::clone(root)),
        };
        let mut ancestors = vec![object_addr(root)];
        group.bind_children(root, &mut ancestors)?;
        Ok(group)
    }

    fn bind_children(
        &mut self,
        object: &Rc<dyn StatObject>,
        ancestors: &mut Vec<*const ()>,
    ) -> Result<(), StatsError> {
        for (name, child) in object.named_children() {
            match child {
                ChildRef::Single(obj) => self.bind_child(name, &obj, ancestors)?,
                ChildRef::Vector(objs) => {
                    for (idx, obj) in objs.iter().enumerate() {
                        self.bind_child(format!("{name}{idx}"), obj, ancestors)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn bind_child(
        &mut self,
        name: String,
        object: &Rc<dyn StatObject>,
        ancestors: &mut Vec<*const ()>,
    ) -> Result<(), StatsError> {
        let mut path = self.path.clone();
        path.push(name.clone());

        let addr = object_addr(object);
        if ancestors.contains(&addr) {
            return Err(StatsError::CyclicHierarchy {
                path: path.join("."),
            });
        }
        if self.children.contains_key(&name) {
            return Err(StatsError::DuplicateGroup {
                path: path.join("."),
            });
        }

        let mut child = StatGroup {
            path,
            stats: object.stats(),
            children: IndexMap::new(),
            object: Some(Rc::clone(object)),
        };
        ancestors.push(addr);
        child.bind_children(object, ancestors)?;
        ancestors.pop();

        self.children.insert(name, child);
        Ok(())
    }

    /// Last path component; empty for the root.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    /// Path components from the root (the root itself has none).
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Stats owned directly by this group.
    pub fn stats(&self) -> &[StatHandle] {
        &self.stats
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &StatGroup)> {
        self.children.iter().map(|(name, group)| (name.as_str(), group))
    }

    pub fn child(&self, name: &str) -> Option<&StatGroup> {
        self.children.get(name)
    }

    pub(crate) fn object(&self) -> Option<&Rc<dyn StatObject>> {
        self.object.as_ref()
    }

    /// Follow `path` down from this group.
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&StatGroup> {
        path.iter()
            .try_fold(self, |group, name| group.children.get(name.as_ref()))
    }

    /// Pre-order walk: this group first, then each child in bind order.
    pub fn visit_groups<F>(&self, visitor: &mut F)
    where
        F: FnMut(&StatGroup),
    {
        visitor(self);
        for child in self.children.values() {
            child.visit_groups(visitor);
        }
    }

    /// Call `visitor` once per stat, grouped by owner in pre-order.
    pub fn visit_stats<F>(&self, mut visitor: F)
    where
        F: FnMut(&StatGroup, &StatHandle),
    {
        self.visit_groups(&mut |group: &StatGroup| {
            for stat in &group.stats {
                visitor(group, stat);
            }
        });
    }

    /// Number of stats in this group and all descendants.
    pub fn stat_count(&self) -> usize {
        let mut count = 0;
        self.visit_groups(&mut |group: &StatGroup| count += group.stats.len());
        count
    }

    /// Emit this group's contents into a sink.
    ///
    /// Owned stats come first; each child is then wrapped in a
    /// `begin_group`/`end_group` pair. The group's own name is not emitted.
    pub fn dump_into(&self, output: &mut dyn Output) -> Result<(), SinkError> {
        for stat in &self.stats {
            stat.borrow().visit(output)?;
        }
        for (name, child) in &self.children {
            output.begin_group(name)?;
            child.dump_into(output)?;
            output.end_group()?;
        }
        Ok(())
    }
}

impl Default for StatGroup {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for StatGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatGroup")
            .field("path", &self.path)
            .field("stats", &self.stats)
            .field("children", &self.children)
            .finish()
    }
}

fn object_addr(object: &Rc<dyn StatObject>) -> *const () {
    Rc::as_ptr(object) as *const ()
}
