use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use hash_hasher::HashedMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::{
    ErasedSubPool, RecyclePoolBuilder, SharedConstructor, SubPool, TryGetFallback,
    downcast_sub_pool,
};

/// A thread-safe pool of reusable heap-allocated objects of any type.
///
/// The pool keeps a separate free list (sub-pool) for every object type it has been asked to
/// allocate. Allocating an object pops a previously freed instance of that type if there is
/// one and otherwise constructs a new one. Freeing an object pushes it back onto the free list
/// of its type, making it available to the next allocation.
///
/// Recycled objects are returned exactly as they were freed. Resetting any state before reuse
/// is the caller's responsibility.
///
/// # Lifetime management
///
/// The pool type itself acts as a handle - any clones of it are functionally equivalent,
/// similar to `Arc`. Independent pools can coexist; pass a handle to whatever code needs it.
///
/// The pool does not track which objects it has handed out. Objects that are never freed are
/// simply dropped by their owner and objects that did not come from the pool may still be
/// freed into it.
///
/// # Sub-pool creation
///
/// Only [`allocate()`][Self::allocate], [`allocate_with()`][Self::allocate_with] and
/// [`preallocate()`][Self::preallocate] create sub-pools. Freeing an object of a type the pool
/// has never allocated drops the object instead of creating a sub-pool for it.
///
/// # Example
///
/// ```rust
/// use recycle_pool::RecyclePool;
///
/// #[derive(Default)]
/// struct IntBox {
///     value: i64,
/// }
///
/// let pool = RecyclePool::new();
///
/// let mut x = pool.allocate::<IntBox>();
/// assert_eq!(x.value, 0);
///
/// x.value = 999;
/// pool.free(x);
///
/// // The same instance is handed out again, with its contents intact.
/// let y = pool.allocate::<IntBox>();
/// assert_eq!(y.value, 999);
/// ```
///
/// # Thread safety
///
/// The pool is thread-safe (`Send` and `Sync`) and requires that pooled objects are `Send`.
/// Concurrent first-time use of a type creates exactly one sub-pool for it.
#[derive(Clone)]
pub struct RecyclePool {
    core: Arc<Core>,
}

struct Core {
    // This is a transparent HashMap, meaning it does not do any hashing.
    // The reason is that the TypeId is already a hash, so hashing it again is redundant.
    //
    // Entries are only ever added, never removed.
    sub_pools: RwLock<HashedMap<TypeId, Arc<dyn ErasedSubPool>>>,

    try_get_fallback: TryGetFallback,
}

impl fmt::Debug for RecyclePool {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("sub_pools", &self.core.sub_pools)
            .field("try_get_fallback", &self.core.try_get_fallback)
            .finish()
    }
}

impl RecyclePool {
    /// Creates a new empty pool with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for creating a [`RecyclePool`] with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::{RecyclePool, TryGetFallback};
    ///
    /// let pool = RecyclePool::builder()
    ///     .try_get_fallback(TryGetFallback::Absent)
    ///     .build();
    /// ```
    pub fn builder() -> RecyclePoolBuilder {
        RecyclePoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(try_get_fallback: TryGetFallback) -> Self {
        Self {
            core: Arc::new(Core {
                sub_pools: RwLock::new(HashedMap::default()),
                try_get_fallback,
            }),
        }
    }

    /// Adds `count` freshly constructed objects of type `T` to the pool.
    ///
    /// If the pool has not seen `T` before, a sub-pool is created for it with `constructor` as
    /// its registered constructor (even if `count` is zero).
    ///
    /// This increases the number of available objects, it does not set it. Calling this twice
    /// with a count of 5 makes (at least) 10 objects available.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::RecyclePool;
    ///
    /// let pool = RecyclePool::new();
    ///
    /// pool.preallocate(|| vec![0_u8; 1024], 5);
    /// pool.preallocate(|| vec![0_u8; 1024], 5);
    ///
    /// assert_eq!(pool.available_for::<Vec<u8>>(), 10);
    /// ```
    pub fn preallocate<T, F>(&self, constructor: F, count: usize)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.with_sub_pool(constructor, |sub_pool, constructor| {
            sub_pool.fill(constructor, count);
        });

        trace!(type_name = type_name::<T>(), count, "preallocated objects");
    }

    /// Returns an object of type `T`, either a previously freed one or a new one created by
    /// `constructor`.
    ///
    /// A previously freed object is returned as-is, without any reset of its contents.
    ///
    /// If the pool has not seen `T` before, a sub-pool is created for it with `constructor` as
    /// its registered constructor.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::RecyclePool;
    ///
    /// let pool = RecyclePool::new();
    ///
    /// let mut buffer = pool.allocate_with(|| String::with_capacity(256));
    /// buffer.push_str("hello");
    /// pool.free(buffer);
    ///
    /// let buffer = pool.allocate_with(|| String::with_capacity(256));
    /// assert_eq!(*buffer, "hello");
    /// ```
    #[must_use]
    pub fn allocate_with<T, F>(&self, constructor: F) -> Box<T>
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.with_sub_pool(constructor, |sub_pool, constructor| {
            // The constructor runs after the free list lock is released.
            sub_pool
                .pop()
                .unwrap_or_else(|| Box::new(constructor()))
        })
    }

    /// Returns an object of type `T`, either a previously freed one or a new default value.
    ///
    /// Equivalent to [`allocate_with()`][Self::allocate_with] with `T::default` as the
    /// constructor.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::RecyclePool;
    ///
    /// let pool = RecyclePool::new();
    ///
    /// let value = pool.allocate::<u64>();
    /// assert_eq!(*value, 0);
    /// ```
    #[must_use]
    pub fn allocate<T: Default + Send + 'static>(&self) -> Box<T> {
        self.allocate_with(T::default)
    }

    /// Returns an object of type `T` if the pool has ever allocated or preallocated objects of
    /// this type, `None` otherwise.
    ///
    /// Never creates a sub-pool. If a sub-pool for `T` exists but holds no free object, the
    /// outcome depends on the pool's [`TryGetFallback`]: by default a fresh object is created
    /// with the constructor registered for `T`, with [`TryGetFallback::Absent`] the result is
    /// `None`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::RecyclePool;
    ///
    /// let pool = RecyclePool::new();
    ///
    /// assert!(pool.try_get::<u32>().is_none());
    ///
    /// pool.preallocate(|| 5_u32, 1);
    ///
    /// assert_eq!(pool.try_get::<u32>().map(|x| *x), Some(5));
    /// ```
    #[must_use]
    pub fn try_get<T: Send + 'static>(&self) -> Option<Box<T>> {
        let erased = self.find_sub_pool(TypeId::of::<T>())?;
        let sub_pool = downcast_sub_pool::<T>(&*erased);

        sub_pool.pop().or_else(|| match self.core.try_get_fallback {
            TryGetFallback::Construct => Some(sub_pool.construct()),
            TryGetFallback::Absent => None,
        })
    }

    /// Returns an object to the pool, making it available to later allocations of type `T`.
    ///
    /// The object does not need to have come from this pool. If the pool has never allocated
    /// or preallocated objects of type `T`, the object is dropped instead.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::RecyclePool;
    ///
    /// let pool = RecyclePool::new();
    ///
    /// // Never allocated from this pool, so the pool does not keep it.
    /// pool.free(Box::new(7_u8));
    /// assert_eq!(pool.available_for::<u8>(), 0);
    ///
    /// let value = pool.allocate::<u8>();
    /// pool.free(value);
    /// assert_eq!(pool.available_for::<u8>(), 1);
    /// ```
    pub fn free<T: Send + 'static>(&self, object: Box<T>) {
        match self.find_sub_pool(TypeId::of::<T>()) {
            Some(erased) => downcast_sub_pool::<T>(&*erased).push(object),
            None => {
                trace!(
                    type_name = type_name::<T>(),
                    "dropping freed object of a type the pool has not seen"
                );
                drop(object);
            }
        }
    }

    /// Returns an object whose type is only known at runtime to the pool.
    ///
    /// The object is routed to the sub-pool of its concrete type, exactly as if
    /// [`free()`][Self::free] had been called with the concrete type. This is useful for
    /// code that holds a heterogeneous collection of pooled objects.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::any::Any;
    ///
    /// use recycle_pool::RecyclePool;
    ///
    /// let pool = RecyclePool::new();
    ///
    /// let mut number = pool.allocate::<u32>();
    /// *number = 300;
    /// let mut text = pool.allocate::<String>();
    /// text.push_str("owl");
    ///
    /// let objects: Vec<Box<dyn Any + Send>> = vec![number, text];
    ///
    /// for object in objects {
    ///     pool.free_any(object);
    /// }
    ///
    /// assert_eq!(*pool.allocate::<u32>(), 300);
    /// assert_eq!(*pool.allocate::<String>(), "owl");
    /// ```
    pub fn free_any(&self, object: Box<dyn Any + Send>) {
        // Dereference first, otherwise we get the TypeId of the box itself.
        let type_id = (*object).type_id();

        match self.find_sub_pool(type_id) {
            Some(erased) => erased.push_any(object),
            None => {
                trace!(
                    ?type_id,
                    "dropping freed object of a type the pool has not seen"
                );
                drop(object);
            }
        }
    }

    /// The number of free objects of type `T` currently held by the pool.
    #[must_use]
    pub fn available_for<T: Send + 'static>(&self) -> usize {
        self.find_sub_pool(TypeId::of::<T>())
            .map(|erased| erased.len())
            .unwrap_or_default()
    }

    /// The number of free objects of all types currently held by the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        let sub_pools = self.core.sub_pools.read();

        sub_pools.values().map(|sub_pool| sub_pool.len()).sum()
    }

    /// Whether the pool currently holds no free objects of any type.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// The number of object types the pool has created sub-pools for.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.core.sub_pools.read().len()
    }

    /// Whether the pool has created a sub-pool for objects of type `T`.
    ///
    /// Once this returns `true` for a type, it keeps returning `true` for the lifetime of the
    /// pool.
    #[must_use]
    pub fn contains_type<T: Send + 'static>(&self) -> bool {
        self.core
            .sub_pools
            .read()
            .contains_key(&TypeId::of::<T>())
    }

    fn find_sub_pool(&self, type_id: TypeId) -> Option<Arc<dyn ErasedSubPool>> {
        self.core.sub_pools.read().get(&type_id).map(Arc::clone)
    }

    /// Calls `f` with the sub-pool for `T` and the constructor to use for fresh objects,
    /// creating the sub-pool with `constructor` registered if the pool has not seen `T` yet.
    fn with_sub_pool<T, F, R>(
        &self,
        constructor: F,
        f: impl FnOnce(&SubPool<T>, &dyn Fn() -> T) -> R,
    ) -> R
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        if let Some(existing) = self.find_sub_pool(TypeId::of::<T>()) {
            return f(downcast_sub_pool::<T>(&*existing), &constructor);
        }

        // Only the creating path pays for sharing the constructor.
        let constructor: SharedConstructor<T> = Arc::new(constructor);
        let erased = self.register_sub_pool(&constructor);

        f(downcast_sub_pool::<T>(&*erased), &*constructor)
    }

    fn register_sub_pool<T: Send + 'static>(
        &self,
        constructor: &SharedConstructor<T>,
    ) -> Arc<dyn ErasedSubPool> {
        let mut sub_pools = self.core.sub_pools.write();

        // Another thread may have created the sub-pool between our read and write locks,
        // in which case the entry already exists and we use that one.
        let entry = sub_pools.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!(type_name = type_name::<T>(), "creating sub-pool");

            let sub_pool: Arc<dyn ErasedSubPool> =
                Arc::new(SubPool::new(Arc::clone(constructor)));
            sub_pool
        });

        Arc::clone(entry)
    }
}

impl Default for RecyclePool {
    fn default() -> Self {
        Self::new()
    }
}
