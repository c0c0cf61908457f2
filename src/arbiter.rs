//! Single-permit lock over the device link.
//!
//! User commands wait a bounded time for the permit; background updates only
//! take it when it is free, so they never delay or queue behind a user.

use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub struct Arbiter<T> {
    held: Mutex<bool>,
    released: Condvar,
    value: Mutex<T>,
}

/// Exclusive access to the guarded value. Dropping it releases the permit.
pub struct Permit<'a, T> {
    arbiter: &'a Arbiter<T>,
    value: Option<MutexGuard<'a, T>>,
}

impl<T> Arbiter<T> {
    pub fn new(value: T) -> Self {
        Self {
            held: Mutex::new(false),
            released: Condvar::new(),
            value: Mutex::new(value),
        }
    }

    /// Wait up to `wait` for the permit. `None` means the device is busy.
    pub fn acquire_foreground(&self, wait: Duration) -> Option<Permit<'_, T>> {
        let deadline = Instant::now() + wait;
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        while *held {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = self
                .released
                .wait_timeout(held, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            held = guard;
        }
        *held = true;
        drop(held);
        Some(self.permit())
    }

    /// Take the permit only if nobody holds it.
    pub fn acquire_background(&self) -> Option<Permit<'_, T>> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if *held {
            return None;
        }
        *held = true;
        drop(held);
        Some(self.permit())
    }

    pub fn is_held(&self) -> bool {
        *self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn permit(&self) -> Permit<'_, T> {
        Permit {
            arbiter: self,
            value: Some(self.value.lock().unwrap_or_else(PoisonError::into_inner)),
        }
    }

    fn release(&self) {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        *held = false;
        self.released.notify_one();
    }
}

impl<T> Deref for Permit<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `drop` takes the guard out.
        self.value.as_deref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> DerefMut for Permit<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_deref_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for Permit<'_, T> {
    fn drop(&mut self) {
        self.value.take();
        self.arbiter.release();
    }
}
