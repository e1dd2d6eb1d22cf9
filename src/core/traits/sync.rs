//! Synchronized state abstraction for values shared between contexts.
//!
//! The parameter table is read at boot, written from command handlers and
//! consulted by the radio task. `SharedState` hides the lock that makes this
//! safe so the same accessor code runs on the target (critical-section mutex)
//! and on the host (`RefCell`).

/// Platform-agnostic synchronized state access.
///
/// Implementations:
/// - `EmbassyState<T>` for embedded targets using Embassy's critical-section Mutex
/// - `MockState<T>` for host testing using RefCell (single-threaded)
///
/// # Example
///
/// ```ignore
/// fn bump_channel<S: SharedState<u8>>(channel: &S) -> u8 {
///     channel.with_mut(|c| {
///         *c = (*c % 13) + 1;
///         *c
///     })
/// }
/// ```
pub trait SharedState<T> {
    /// Run `f` with shared access to the inner value.
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Run `f` with exclusive access to the inner value.
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

#[cfg(feature = "embassy")]
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Critical-section protected state for the embedded target.
///
/// Every access runs inside a critical section, so it is safe from async tasks
/// and interrupt handlers alike. Keep the closures short.
#[cfg(feature = "embassy")]
pub struct EmbassyState<T> {
    inner: Mutex<CriticalSectionRawMutex, core::cell::RefCell<T>>,
}

#[cfg(feature = "embassy")]
impl<T> EmbassyState<T> {
    /// Wrap `value`; usable in `static` initializers.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(core::cell::RefCell::new(value)),
        }
    }
}

#[cfg(feature = "embassy")]
impl<T> SharedState<T> for EmbassyState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Single-threaded state for host tests.
///
/// # Panics
///
/// Panics on a nested `with_mut` inside `with` (or vice versa); that is a bug
/// in the calling code.
pub struct MockState<T> {
    inner: core::cell::RefCell<T>,
}

impl<T> MockState<T> {
    /// Wrap `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: core::cell::RefCell::new(value),
        }
    }
}

impl<T> SharedState<T> for MockState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.borrow())
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.inner.borrow_mut())
    }
}
