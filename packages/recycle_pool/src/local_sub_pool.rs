use std::any::{Any, type_name};
use std::cell::RefCell;
use std::fmt;

use crate::LocalConstructor;

/// The free list for one object type in a [`LocalRecyclePool`][crate::LocalRecyclePool].
///
/// Single-threaded counterpart of [`SubPool`][crate::SubPool]. Borrows of the free list never
/// outlive a single push, pop or extend, so constructors are free to call back into the pool.
pub(crate) struct LocalSubPool<T> {
    free: RefCell<Vec<Box<T>>>,
    constructor: LocalConstructor<T>,
}

impl<T: 'static> LocalSubPool<T> {
    pub(crate) fn new(constructor: LocalConstructor<T>) -> Self {
        Self {
            free: RefCell::new(Vec::new()),
            constructor,
        }
    }

    pub(crate) fn pop(&self) -> Option<Box<T>> {
        self.free.borrow_mut().pop()
    }

    pub(crate) fn push(&self, object: Box<T>) {
        self.free.borrow_mut().push(object);
    }

    pub(crate) fn construct(&self) -> Box<T> {
        Box::new((*self.constructor)())
    }

    pub(crate) fn fill(&self, constructor: &dyn Fn() -> T, count: usize) {
        let fresh = (0..count)
            .map(|_| Box::new(constructor()))
            .collect::<Vec<_>>();

        self.free.borrow_mut().extend(fresh);
    }
}

impl<T> fmt::Debug for LocalSubPool<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("available", &self.free.borrow().len())
            .finish_non_exhaustive()
    }
}

/// A local sub-pool for which we no longer know the object type.
pub(crate) trait LocalErasedSubPool: fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    /// # Panics
    ///
    /// Panics if the object is not of the sub-pool's type.
    fn push_any(&self, object: Box<dyn Any>);

    fn len(&self) -> usize;
}

impl<T: 'static> LocalErasedSubPool for LocalSubPool<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn push_any(&self, object: Box<dyn Any>) {
        let object = object.downcast::<T>().expect("guarded by TypeId");

        self.push(object);
    }

    fn len(&self) -> usize {
        self.free.borrow().len()
    }
}

pub(crate) fn downcast_local_sub_pool<T: 'static>(
    erased: &dyn LocalErasedSubPool,
) -> &LocalSubPool<T> {
    erased
        .as_any()
        .downcast_ref::<LocalSubPool<T>>()
        .expect("guarded by TypeId")
}
