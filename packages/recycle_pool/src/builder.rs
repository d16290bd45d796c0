use crate::{LocalRecyclePool, RecyclePool, TryGetFallback};

/// Builder for creating an instance of [`RecyclePool`] or [`LocalRecyclePool`].
///
/// This builder allows configuration of pool behavior before creation.
///
/// # Examples
///
/// ```
/// use recycle_pool::{RecyclePool, TryGetFallback};
///
/// // Default pool.
/// let pool = RecyclePool::builder().build();
///
/// // A pool whose `try_get()` only ever returns recycled objects.
/// let pool = RecyclePool::builder()
///     .try_get_fallback(TryGetFallback::Absent)
///     .build();
/// ```
#[derive(Debug)]
#[must_use]
pub struct RecyclePoolBuilder {
    try_get_fallback: TryGetFallback,
}

impl RecyclePoolBuilder {
    pub(crate) fn new() -> Self {
        Self {
            try_get_fallback: TryGetFallback::default(),
        }
    }

    /// Sets the [fallback behavior][TryGetFallback] of `try_get()` for types that the pool
    /// knows but currently has no free objects of.
    ///
    /// # Examples
    ///
    /// ```
    /// use recycle_pool::{RecyclePool, TryGetFallback};
    ///
    /// let pool = RecyclePool::builder()
    ///     .try_get_fallback(TryGetFallback::Absent)
    ///     .build();
    /// ```
    pub fn try_get_fallback(mut self, fallback: TryGetFallback) -> Self {
        self.try_get_fallback = fallback;
        self
    }

    /// Builds a thread-safe pool with the specified configuration.
    #[must_use]
    pub fn build(self) -> RecyclePool {
        RecyclePool::new_inner(self.try_get_fallback)
    }

    /// Builds a single-threaded pool with the specified configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use recycle_pool::{LocalRecyclePool, TryGetFallback};
    ///
    /// let pool = LocalRecyclePool::builder()
    ///     .try_get_fallback(TryGetFallback::Absent)
    ///     .build_local();
    /// ```
    #[must_use]
    pub fn build_local(self) -> LocalRecyclePool {
        LocalRecyclePool::new_inner(self.try_get_fallback)
    }
}
