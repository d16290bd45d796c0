/// Determines what [`try_get()`][crate::RecyclePool::try_get] does when the pool knows the
/// requested type but currently holds no free instance of it.
///
/// The pool learns about a type (and its constructor) the first time that type is allocated
/// or preallocated. From then on the pool is able to construct fresh instances of that type
/// on its own, and this policy decides whether `try_get()` is allowed to do so.
///
/// For types the pool has never seen, `try_get()` always returns `None`, regardless of policy.
///
/// # Examples
///
/// ```
/// use recycle_pool::{RecyclePool, TryGetFallback};
///
/// let pool = RecyclePool::builder()
///     .try_get_fallback(TryGetFallback::Absent)
///     .build();
///
/// pool.preallocate(|| 0_u64, 1);
///
/// assert!(pool.try_get::<u64>().is_some());
///
/// // The only pooled instance has been handed out and nothing new is constructed.
/// assert!(pool.try_get::<u64>().is_none());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum TryGetFallback {
    /// An empty but known sub-pool constructs a fresh instance using the constructor that was
    /// registered when the type was first seen by the pool. This is the default.
    #[default]
    Construct,

    /// An empty sub-pool yields `None`. Only previously freed or preallocated instances are
    /// ever returned.
    Absent,
}
