use std::any::{Any, type_name};
use std::fmt;

use parking_lot::Mutex;

use crate::SharedConstructor;

/// The free list for one object type in a [`RecyclePool`][crate::RecyclePool].
///
/// Objects are handed out in LIFO order. The lock is only ever held for a single push, pop or
/// extend - constructors always run outside of it.
pub(crate) struct SubPool<T> {
    free: Mutex<Vec<Box<T>>>,

    // Registered when the sub-pool was created, used when the pool has to construct an
    // instance without a constructor supplied by the caller.
    constructor: SharedConstructor<T>,
}

impl<T: Send + 'static> SubPool<T> {
    pub(crate) fn new(constructor: SharedConstructor<T>) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            constructor,
        }
    }

    pub(crate) fn pop(&self) -> Option<Box<T>> {
        self.free.lock().pop()
    }

    pub(crate) fn push(&self, object: Box<T>) {
        self.free.lock().push(object);
    }

    /// Constructs a fresh instance with the registered constructor, bypassing the free list.
    pub(crate) fn construct(&self) -> Box<T> {
        Box::new((*self.constructor)())
    }

    /// Constructs `count` fresh instances and adds them to the free list.
    pub(crate) fn fill(&self, constructor: &dyn Fn() -> T, count: usize) {
        let fresh = (0..count)
            .map(|_| Box::new(constructor()))
            .collect::<Vec<_>>();

        self.free.lock().extend(fresh);
    }
}

impl<T> fmt::Debug for SubPool<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("available", &self.free.lock().len())
            .finish_non_exhaustive()
    }
}

/// A sub-pool for which we no longer know the object type.
///
/// The pool stores its sub-pools in this form and downcasts back to [`SubPool<T>`] when the
/// caller names the type. Freeing an object whose type is only known at runtime goes through
/// [`push_any()`][Self::push_any] instead.
pub(crate) trait ErasedSubPool: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Adds an object to the free list.
    ///
    /// # Panics
    ///
    /// Panics if the object is not of the sub-pool's type. The pool selects sub-pools by the
    /// object's `TypeId`, so this does not happen.
    fn push_any(&self, object: Box<dyn Any + Send>);

    fn len(&self) -> usize;
}

impl<T: Send + 'static> ErasedSubPool for SubPool<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn push_any(&self, object: Box<dyn Any + Send>) {
        let object = object.downcast::<T>().expect("guarded by TypeId");

        self.push(object);
    }

    fn len(&self) -> usize {
        self.free.lock().len()
    }
}

/// Recovers the typed sub-pool from its erased form.
///
/// # Panics
///
/// Panics if `erased` is not a `SubPool<T>`. The pool only calls this with a sub-pool that it
/// found under `TypeId::of::<T>()`, so this does not happen.
pub(crate) fn downcast_sub_pool<T: Send + 'static>(erased: &dyn ErasedSubPool) -> &SubPool<T> {
    erased
        .as_any()
        .downcast_ref::<SubPool<T>>()
        .expect("guarded by TypeId")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(SubPool<String>: Send, Sync);

    #[test]
    fn pop_from_empty_is_none() {
        let sub_pool = SubPool::<u32>::new(Arc::new(|| 7));

        assert!(sub_pool.pop().is_none());
        assert_eq!(sub_pool.len(), 0);
    }

    #[test]
    fn pop_returns_last_pushed() {
        let sub_pool = SubPool::<u32>::new(Arc::new(|| 0));

        sub_pool.push(Box::new(1));
        sub_pool.push(Box::new(2));

        assert_eq!(*sub_pool.pop().unwrap(), 2);
        assert_eq!(*sub_pool.pop().unwrap(), 1);
        assert!(sub_pool.pop().is_none());
    }

    #[test]
    fn construct_uses_registered_constructor_and_skips_free_list() {
        let sub_pool = SubPool::<u32>::new(Arc::new(|| 42));
        sub_pool.push(Box::new(1));

        assert_eq!(*sub_pool.construct(), 42);
        assert_eq!(sub_pool.len(), 1);
    }

    #[test]
    fn fill_is_additive() {
        let sub_pool = SubPool::<u32>::new(Arc::new(|| 0));

        sub_pool.fill(&|| 5, 3);
        sub_pool.fill(&|| 6, 2);

        assert_eq!(sub_pool.len(), 5);
        assert_eq!(*sub_pool.pop().unwrap(), 6);
    }

    #[test]
    fn fill_with_zero_count_adds_nothing() {
        let sub_pool = SubPool::<u32>::new(Arc::new(|| 0));

        sub_pool.fill(&|| 5, 0);

        assert_eq!(sub_pool.len(), 0);
    }

    #[test]
    fn push_any_accepts_matching_type() {
        let sub_pool = SubPool::<String>::new(Arc::new(String::new));
        let erased: &dyn ErasedSubPool = &sub_pool;

        erased.push_any(Box::new("owl".to_string()));

        assert_eq!(erased.len(), 1);
        assert_eq!(*sub_pool.pop().unwrap(), "owl");
    }

    #[test]
    #[should_panic(expected = "guarded by TypeId")]
    fn push_any_rejects_foreign_type() {
        let sub_pool = SubPool::<String>::new(Arc::new(String::new));
        let erased: &dyn ErasedSubPool = &sub_pool;

        erased.push_any(Box::new(42_u32));
    }

    #[test]
    fn downcast_recovers_typed_sub_pool() {
        let sub_pool = SubPool::<u64>::new(Arc::new(|| 9));
        let erased: &dyn ErasedSubPool = &sub_pool;

        let typed = downcast_sub_pool::<u64>(erased);

        assert_eq!(*typed.construct(), 9);
    }

    #[test]
    fn debug_reports_available_count() {
        let sub_pool = SubPool::<u8>::new(Arc::new(|| 0));
        sub_pool.fill(&|| 1, 2);

        let output = format!("{sub_pool:?}");

        assert!(output.contains("available: 2"));
    }
}
