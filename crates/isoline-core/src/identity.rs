//! Reference-identity comparison for layer props.
//!
//! Props that carry large buffers are shared as `Arc`s. Layers decide whether
//! to rebuild derived GPU state by comparing pointers, never contents, so
//! handing the same `Arc` back on the next update is free.

use std::sync::Arc;

/// Whether two optional shared values are the same allocation.
///
/// Two `None`s are the same; `None` and `Some` never are.
#[inline]
pub fn same_ref<T: ?Sized>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Whether a prop changed identity between the previous and the next update.
///
/// With no previous props every present value counts as changed.
#[inline]
pub fn changed<T: ?Sized>(next: Option<&Arc<T>>, previous: Option<Option<&Arc<T>>>) -> bool {
    match previous {
        Some(previous) => !same_ref(next, previous),
        None => true,
    }
}
