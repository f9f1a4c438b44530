//! Process-wide console lock as an explicit capability.
//!
//! Core entry points take a `&ConsoleGuard` so holding the lock is visible in
//! their signatures. They never lock on their own.

use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct ConsoleLock {
    inner: Mutex<()>,
}

/// Proof that the console lock is held.
#[derive(Debug)]
pub struct ConsoleGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl ConsoleLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> ConsoleGuard<'_> {
        // The lock protects no data of its own; a poisoned lock is still a lock.
        let guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        ConsoleGuard { _guard: guard }
    }
}
