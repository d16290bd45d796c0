//! This package provides [`RecyclePool`], a pool that recycles heap-allocated objects of any
//! type so that short-lived objects can be reused instead of being allocated and dropped over
//! and over.
//!
//! The pool keeps one free list per object type, created on demand the first time a type is
//! allocated. Allocating takes an object off the free list of its type or constructs a new one
//! with a caller-supplied constructor closure. Freeing puts the object back on the free list.
//!
//! # Features
//!
//! - **Any type**: one pool serves objects of every type; each type has its own free list.
//! - **No reset on reuse**: recycled objects come back exactly as they were freed.
//! - **LIFO reuse**: the most recently freed object of a type is handed out first.
//! - **Preallocation**: fill the free list of a type ahead of time.
//! - **Type-erased freeing**: objects known only as `Box<dyn Any + Send>` are routed to the
//!   free list of their concrete type.
//! - **Thread-safe and single-threaded variants**: [`RecyclePool`] for multi-threaded use,
//!   [`LocalRecyclePool`] for single-threaded use and objects that are not `Send`.
//!
//! # Example
//!
//! ```rust
//! use recycle_pool::RecyclePool;
//!
//! #[derive(Default)]
//! struct Message {
//!     payload: Vec<u8>,
//! }
//!
//! let pool = RecyclePool::new();
//!
//! let mut message = pool.allocate::<Message>();
//! message.payload.extend_from_slice(b"hello");
//!
//! // The caller is responsible for resetting state before or after reuse.
//! message.payload.clear();
//! pool.free(message);
//!
//! // The same allocation, including the capacity of its buffer, is reused.
//! let message = pool.allocate::<Message>();
//! assert!(message.payload.capacity() >= 5);
//! ```
//!
//! Checking whether a type is already in circulation without constructing anything new:
//!
//! ```rust
//! use recycle_pool::{RecyclePool, TryGetFallback};
//!
//! let pool = RecyclePool::builder()
//!     .try_get_fallback(TryGetFallback::Absent)
//!     .build();
//!
//! assert!(pool.try_get::<String>().is_none());
//!
//! pool.preallocate(|| String::with_capacity(64), 2);
//!
//! assert!(pool.try_get::<String>().is_some());
//! assert!(pool.try_get::<String>().is_some());
//! assert!(pool.try_get::<String>().is_none());
//! ```

mod builder;
mod constructor;
mod fallback;
mod local_pool;
mod local_sub_pool;
mod pool;
mod sub_pool;

pub use builder::*;
pub(crate) use constructor::*;
pub use fallback::*;
pub use local_pool::*;
pub(crate) use local_sub_pool::*;
pub use pool::*;
pub(crate) use sub_pool::*;
