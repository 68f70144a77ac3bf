use crate::stats::{Stat, StatId};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Non-owning view of a stat held by the registry.
///
/// The counting engine keeps its own typed `Rc` to each stat; the registry
/// shares it through this type-erased handle.
#[derive(Clone)]
pub struct StatHandle(Rc<RefCell<dyn Stat>>);

impl StatHandle {
    pub fn new<S: Stat + 'static>(stat: S) -> Self {
        Self(Rc::new(RefCell::new(stat)))
    }

    /// Share a stat the caller keeps a typed reference to.
    pub fn from_shared<S: Stat + 'static>(stat: Rc<RefCell<S>>) -> Self {
        Self(stat)
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, dyn Stat> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Stat> {
        self.0.borrow_mut()
    }

    pub fn id(&self) -> StatId {
        self.0.borrow().info().id()
    }

    pub fn name(&self) -> String {
        self.0.borrow().info().name().to_string()
    }

    /// Whether both handles refer to the same stat.
    pub fn ptr_eq(&self, other: &StatHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for StatHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(stat) => f
                .debug_struct("StatHandle")
                .field("id", &stat.info().id())
                .field("name", &stat.info().name())
                .finish(),
            Err(_) => f.write_str("StatHandle(<borrowed>)"),
        }
    }
}
