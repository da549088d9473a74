//! Spin lock for state shared with the real-time audio thread.
//!
//! The audio callback must never block: it uses [`RtLock::try_lock`] and
//! outputs silence when the lock is contended. Control threads use
//! [`RtLock::lock`], which spins a bounded number of times and then falls
//! back to yielding, so they cannot priority-invert the audio thread for
//! long. The analysis pipeline has no real-time deadline and does not use
//! this primitive.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

/// Spins this many times between yields when acquiring from a control thread.
const SPIN_LIMIT: u32 = 100;

pub struct RtLock<T> {
    locked: AtomicBool,
    value: UnsafeCell<T>,
}

// The guard hands out &T/&mut T across threads, so T must be Send.
unsafe impl<T: Send> Send for RtLock<T> {}
unsafe impl<T: Send> Sync for RtLock<T> {}

impl<T> RtLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    /// Non-blocking acquire for the audio thread.
    #[inline]
    pub fn try_lock(&self) -> Option<RtLockGuard<'_, T>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(RtLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Blocking acquire for control threads: bounded spin, then yield.
    pub fn lock(&self) -> RtLockGuard<'_, T> {
        loop {
            for _ in 0..SPIN_LIMIT {
                if let Some(guard) = self.try_lock() {
                    return guard;
                }
                std::hint::spin_loop();
            }
            std::thread::yield_now();
        }
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for RtLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.try_lock() {
            Some(guard) => f.debug_struct("RtLock").field("value", &*guard).finish(),
            None => f.debug_struct("RtLock").field("value", &"<locked>").finish(),
        }
    }
}

pub struct RtLockGuard<'a, T> {
    lock: &'a RtLock<T>,
}

impl<T> Deref for RtLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for RtLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for RtLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
