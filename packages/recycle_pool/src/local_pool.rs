use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hash_hasher::HashedMap;
use tracing::{debug, trace};

use crate::{
    LocalConstructor, LocalErasedSubPool, LocalSubPool, RecyclePoolBuilder, TryGetFallback,
    downcast_local_sub_pool,
};

/// A single-threaded pool of reusable heap-allocated objects of any type.
///
/// This is the single-threaded counterpart of [`RecyclePool`][crate::RecyclePool] with the
/// same allocation, freeing and sub-pool creation rules. It avoids all synchronization and
/// accepts objects that are not `Send`.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use recycle_pool::LocalRecyclePool;
///
/// let pool = LocalRecyclePool::new();
///
/// let shared = pool.allocate_with(|| Rc::new(41_u32));
/// pool.free(shared);
///
/// assert_eq!(pool.available_for::<Rc<u32>>(), 1);
/// ```
///
/// # Thread safety
///
/// This type is single-threaded (neither `Send` nor `Sync`).
#[derive(Clone)]
pub struct LocalRecyclePool {
    core: Rc<LocalCore>,
}

struct LocalCore {
    // Transparent HashMap because the TypeId is already a hash.
    sub_pools: RefCell<HashedMap<TypeId, Rc<dyn LocalErasedSubPool>>>,

    try_get_fallback: TryGetFallback,
}

impl fmt::Debug for LocalRecyclePool {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("sub_pools", &self.core.sub_pools)
            .field("try_get_fallback", &self.core.try_get_fallback)
            .finish()
    }
}

impl LocalRecyclePool {
    /// Creates a new empty pool with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build_local()
    }

    /// Returns a builder for creating a [`LocalRecyclePool`] with custom configuration.
    ///
    /// Finish the builder with [`build_local()`][RecyclePoolBuilder::build_local].
    pub fn builder() -> RecyclePoolBuilder {
        RecyclePoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(try_get_fallback: TryGetFallback) -> Self {
        Self {
            core: Rc::new(LocalCore {
                sub_pools: RefCell::new(HashedMap::default()),
                try_get_fallback,
            }),
        }
    }

    /// Adds `count` freshly constructed objects of type `T` to the pool.
    ///
    /// See [`RecyclePool::preallocate()`][crate::RecyclePool::preallocate].
    pub fn preallocate<T, F>(&self, constructor: F, count: usize)
    where
        T: 'static,
        F: Fn() -> T + 'static,
    {
        self.with_sub_pool(constructor, |sub_pool, constructor| {
            sub_pool.fill(constructor, count);
        });

        trace!(type_name = type_name::<T>(), count, "preallocated objects");
    }

    /// Returns an object of type `T`, either a previously freed one or a new one created by
    /// `constructor`.
    ///
    /// See [`RecyclePool::allocate_with()`][crate::RecyclePool::allocate_with].
    #[must_use]
    pub fn allocate_with<T, F>(&self, constructor: F) -> Box<T>
    where
        T: 'static,
        F: Fn() -> T + 'static,
    {
        self.with_sub_pool(constructor, |sub_pool, constructor| {
            sub_pool.pop().unwrap_or_else(|| Box::new(constructor()))
        })
    }

    /// Returns an object of type `T`, either a previously freed one or a new default value.
    #[must_use]
    pub fn allocate<T: Default + 'static>(&self) -> Box<T> {
        self.allocate_with(T::default)
    }

    /// Returns an object of type `T` if the pool has ever allocated or preallocated objects of
    /// this type, `None` otherwise.
    ///
    /// See [`RecyclePool::try_get()`][crate::RecyclePool::try_get].
    #[must_use]
    pub fn try_get<T: 'static>(&self) -> Option<Box<T>> {
        let erased = self.find_sub_pool(TypeId::of::<T>())?;
        let sub_pool = downcast_local_sub_pool::<T>(&*erased);

        sub_pool.pop().or_else(|| match self.core.try_get_fallback {
            TryGetFallback::Construct => Some(sub_pool.construct()),
            TryGetFallback::Absent => None,
        })
    }

    /// Returns an object to the pool. Objects of types the pool has never allocated are
    /// dropped.
    pub fn free<T: 'static>(&self, object: Box<T>) {
        if let Some(erased) = self.find_sub_pool(TypeId::of::<T>()) {
            downcast_local_sub_pool::<T>(&*erased).push(object);
        } else {
            trace!(
                type_name = type_name::<T>(),
                "dropping freed object of a type the pool has not seen"
            );
        }
    }

    /// Returns an object whose type is only known at runtime to the pool.
    pub fn free_any(&self, object: Box<dyn Any>) {
        let type_id = (*object).type_id();

        if let Some(erased) = self.find_sub_pool(type_id) {
            erased.push_any(object);
        } else {
            trace!(
                ?type_id,
                "dropping freed object of a type the pool has not seen"
            );
        }
    }

    /// The number of free objects of type `T` currently held by the pool.
    #[must_use]
    pub fn available_for<T: 'static>(&self) -> usize {
        self.find_sub_pool(TypeId::of::<T>())
            .map(|erased| erased.len())
            .unwrap_or_default()
    }

    /// The number of free objects of all types currently held by the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.core
            .sub_pools
            .borrow()
            .values()
            .map(|sub_pool| sub_pool.len())
            .sum()
    }

    /// Whether the pool currently holds no free objects of any type.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// The number of object types the pool has created sub-pools for.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.core.sub_pools.borrow().len()
    }

    /// Whether the pool has created a sub-pool for objects of type `T`.
    #[must_use]
    pub fn contains_type<T: 'static>(&self) -> bool {
        self.core
            .sub_pools
            .borrow()
            .contains_key(&TypeId::of::<T>())
    }

    fn find_sub_pool(&self, type_id: TypeId) -> Option<Rc<dyn LocalErasedSubPool>> {
        self.core.sub_pools.borrow().get(&type_id).map(Rc::clone)
    }

    fn with_sub_pool<T, F, R>(
        &self,
        constructor: F,
        f: impl FnOnce(&LocalSubPool<T>, &dyn Fn() -> T) -> R,
    ) -> R
    where
        T: 'static,
        F: Fn() -> T + 'static,
    {
        if let Some(existing) = self.find_sub_pool(TypeId::of::<T>()) {
            return f(downcast_local_sub_pool::<T>(&*existing), &constructor);
        }

        let constructor: LocalConstructor<T> = Rc::new(constructor);
        let erased = self.register_sub_pool(&constructor);

        f(downcast_local_sub_pool::<T>(&*erased), &*constructor)
    }

    fn register_sub_pool<T: 'static>(
        &self,
        constructor: &LocalConstructor<T>,
    ) -> Rc<dyn LocalErasedSubPool> {
        let mut sub_pools = self.core.sub_pools.borrow_mut();

        let entry = sub_pools.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!(type_name = type_name::<T>(), "creating sub-pool");

            let sub_pool: Rc<dyn LocalErasedSubPool> =
                Rc::new(LocalSubPool::new(Rc::clone(constructor)));
            sub_pool
        });

        Rc::clone(entry)
    }
}

impl Default for LocalRecyclePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(LocalRecyclePool: Clone);
    assert_not_impl_any!(LocalRecyclePool: Send, Sync);

    #[test]
    fn allocate_free_allocate_round_trip() {
        let pool = LocalRecyclePool::new();

        let mut x = pool.allocate::<Vec<u32>>();
        x.push(1);
        pool.free(x);

        assert_eq!(*pool.allocate::<Vec<u32>>(), vec![1]);
    }

    #[test]
    fn holds_non_send_objects() {
        let pool = LocalRecyclePool::new();

        let cell = pool.allocate_with(|| Rc::new(Cell::new(0_u8)));
        cell.set(4);
        pool.free(cell);

        assert_eq!(pool.try_get::<Rc<Cell<u8>>>().unwrap().get(), 4);
    }

    #[test]
    fn try_get_unknown_type_creates_nothing() {
        let pool = LocalRecyclePool::new();

        assert!(pool.try_get::<u8>().is_none());
        assert_eq!(pool.type_count(), 0);
    }

    #[test]
    fn try_get_default_fallback_constructs() {
        let pool = LocalRecyclePool::new();

        pool.preallocate(|| 3_u8, 1);

        assert_eq!(pool.try_get::<u8>().map(|x| *x), Some(3));
        assert_eq!(pool.try_get::<u8>().map(|x| *x), Some(3));
        assert_eq!(pool.available_for::<u8>(), 0);
    }

    #[test]
    fn preallocate_is_additive() {
        let pool = LocalRecyclePool::new();

        pool.preallocate(|| 0_i16, 5);
        pool.preallocate(|| 0_i16, 5);

        assert_eq!(pool.available_for::<i16>(), 10);
        assert!(!pool.is_empty());
    }

    #[test]
    fn free_unknown_type_is_dropped() {
        let pool = LocalRecyclePool::new();

        pool.free(Box::new(5_u8));
        pool.free_any(Box::new(6_u16));

        assert_eq!(pool.type_count(), 0);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn free_any_routes_by_concrete_type() {
        let pool = LocalRecyclePool::new();

        let mut number = pool.allocate::<i32>();
        *number = -8;
        let objects: Vec<Box<dyn Any>> = vec![number, pool.allocate::<String>()];

        for object in objects {
            pool.free_any(object);
        }

        assert_eq!(pool.available(), 2);
        assert_eq!(*pool.allocate::<i32>(), -8);
    }

    #[test]
    fn constructor_may_capture_local_state() {
        let pool = LocalRecyclePool::new();
        let constructed = Rc::new(Cell::new(0_u32));

        let counter = Rc::clone(&constructed);
        let first = pool.allocate_with(move || {
            counter.set(counter.get() + 1);
            counter.get()
        });

        assert_eq!(*first, 1);

        // The registered constructor keeps its captured state for later fallback construction.
        assert_eq!(pool.try_get::<u32>().map(|x| *x), Some(2));
        assert_eq!(constructed.get(), 2);
    }

    #[test]
    fn constructor_may_use_the_pool() {
        thread_local! {
            static POOL: LocalRecyclePool = LocalRecyclePool::new();
        }

        let outer = POOL.with(|pool| {
            pool.allocate_with(|| POOL.with(|pool| u64::from(*pool.allocate_with(|| 9_u8))))
        });

        assert_eq!(*outer, 9);
        assert_eq!(POOL.with(LocalRecyclePool::type_count), 2);
    }
}
