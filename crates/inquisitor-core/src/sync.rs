//! Synchronization utilities for handling poisoned locks.

use std::sync::{Mutex, MutexGuard};

/// Extension trait for `Mutex` that ignores lock poisoning.
///
/// The mock collaborators record their call history behind a mutex; a panic in
/// one test assertion should not turn every later history read into a second
/// panic.
pub trait IgnoreLock<T> {
    /// Lock the mutex, returning the guard even if the lock is poisoned.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnoreLock<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_after_poison() {
        let history = Arc::new(Mutex::new(vec!["first query".to_owned()]));
        let poisoner = Arc::clone(&history);

        thread::spawn(move || {
            let _guard = poisoner.lock_ignore_poison();
            panic!("poison the lock");
        })
        .join()
        .unwrap_err();
        assert!(history.is_poisoned());

        let guard = history.lock_ignore_poison();
        assert_eq!(guard.len(), 1);
    }
}
