use std::rc::Rc;
use std::sync::Arc;

// A sub-pool keeps the constructor it was created with, so that it can construct objects
// later without the caller supplying one. Closures may capture state, hence trait objects.

/// Registered constructor of a [`SubPool`][crate::SubPool], shared between threads.
pub(crate) type SharedConstructor<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Registered constructor of a [`LocalSubPool`][crate::LocalSubPool].
pub(crate) type LocalConstructor<T> = Rc<dyn Fn() -> T>;
