use crate::error::{AnyError, AnyResult};
use crate::{AnyValue, KeyedStorage, TypeTag};
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct State<S> {
    storage: S,
    ready: bool,
}

/// A thread-safe wrapper adding producer/consumer blocking to a storage.
///
/// Every access goes through one mutex. `get` blocks until at least one `put`
/// has completed since the wrapper was created; once data is ready, readers
/// no longer wait. Values cross the boundary by copy, so no two threads ever
/// share a stored value.
///
/// # Examples
///
/// ```
/// use sovran_anystore::{AnyValue, MapStorage, SynchronizedStorage};
/// use std::sync::Arc;
/// use std::thread;
///
/// let storage = Arc::new(SynchronizedStorage::<MapStorage>::new());
///
/// let producer = {
///     let storage = Arc::clone(&storage);
///     thread::spawn(move || {
///         storage.put(AnyValue::new("hey".to_string()), AnyValue::new(3i32)).unwrap();
///     })
/// };
///
/// // Blocks until the producer has stored something
/// let value = storage.get(&AnyValue::new(3i32)).unwrap();
/// assert_eq!(value.extract_ref::<String>().unwrap(), "hey");
/// producer.join().unwrap();
/// ```
pub struct SynchronizedStorage<S> {
    state: Mutex<State<S>>,
    cond: Condvar,
}

impl<S: KeyedStorage + Default> SynchronizedStorage<S> {
    /// Wraps a new, empty `S`
    pub fn new() -> Self {
        Self::with_storage(S::default())
    }
}

impl<S: KeyedStorage> SynchronizedStorage<S> {
    /// Wraps `storage`. Readers block until the first `put`, even if
    /// `storage` already holds values.
    pub fn with_storage(storage: S) -> Self {
        Self {
            state: Mutex::new(State {
                storage,
                ready: false,
            }),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> AnyResult<MutexGuard<'_, State<S>>> {
        self.state.lock().map_err(|_| AnyError::LockError)
    }

    /// Stores `value` and wakes blocked readers.
    ///
    /// A failed put leaves the ready state as it was and wakes nobody.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::LockError` if the internal lock cannot be acquired,
    /// or whatever the wrapped storage's `put` returns.
    pub fn put(&self, value: AnyValue, key: AnyValue) -> AnyResult<AnyValue> {
        let result = {
            let mut state = self.lock()?;
            let was_ready = state.ready;
            state.ready = false;
            let result = state.storage.put(value, key);
            state.ready = was_ready || result.is_ok();
            result
        };
        match &result {
            Ok(_) => {
                tracing::trace!("Synchronized put complete");
                self.cond.notify_all();
            }
            Err(e) => tracing::debug!(error = %e, "Synchronized put failed"),
        }
        result
    }

    /// Returns the value for `key`, blocking until data is ready.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::LockError` if the internal lock cannot be acquired,
    /// or whatever the wrapped storage's `get` returns.
    pub fn get(&self, key: &AnyValue) -> AnyResult<AnyValue> {
        let mut state = self.lock()?;
        if !state.ready {
            tracing::debug!("Waiting for data");
        }
        while !state.ready {
            state = self.cond.wait(state).map_err(|_| AnyError::LockError)?;
        }
        state.storage.get(key)
    }

    /// Like [`SynchronizedStorage::get`] but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::Timeout` if no data became ready in time.
    pub fn get_timeout(&self, key: &AnyValue, timeout: Duration) -> AnyResult<AnyValue> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock()?;
        while !state.ready {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::debug!(?timeout, "Timed out waiting for data");
                return Err(AnyError::Timeout(timeout));
            }
            let (guard, _) = self
                .cond
                .wait_timeout(state, remaining)
                .map_err(|_| AnyError::LockError)?;
            state = guard;
        }
        state.storage.get(key)
    }

    /// Whether a `put` has completed, i.e. whether `get` would return immediately
    pub fn is_ready(&self) -> AnyResult<bool> {
        Ok(self.lock()?.ready)
    }

    pub fn key_type(&self) -> AnyResult<TypeTag> {
        Ok(self.lock()?.storage.key_type())
    }

    pub fn len(&self) -> AnyResult<usize> {
        Ok(self.lock()?.storage.len())
    }

    pub fn is_empty(&self) -> AnyResult<bool> {
        Ok(self.lock()?.storage.is_empty())
    }

    /// Deep-copies the wrapped storage into a new, independently locked
    /// wrapper. The copy starts out not ready: its readers block until the
    /// copy itself receives a `put`.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::LockError` if the internal lock cannot be acquired.
    pub fn try_clone(&self) -> AnyResult<Self> {
        let state = self.lock()?;
        tracing::debug!(entries = state.storage.len(), "Cloning synchronized storage");
        Ok(Self::with_storage(dyn_clone::clone(&state.storage)))
    }

    /// Unwraps the inner storage
    pub fn into_inner(self) -> AnyResult<S> {
        self.state
            .into_inner()
            .map(|state| state.storage)
            .map_err(|_| AnyError::LockError)
    }
}

impl<S: KeyedStorage + Default> Default for SynchronizedStorage<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: KeyedStorage> Clone for SynchronizedStorage<S> {
    /// See [`SynchronizedStorage::try_clone`]; a poisoned lock is ignored here.
    fn clone(&self) -> Self {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Self::with_storage(dyn_clone::clone(&state.storage))
    }
}

impl<S: KeyedStorage> fmt::Debug for SynchronizedStorage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_lock() {
            Ok(state) => f
                .debug_struct("SynchronizedStorage")
                .field("storage", &state.storage)
                .field("ready", &state.ready)
                .finish(),
            Err(_) => f.write_str("SynchronizedStorage(<locked>)"),
        }
    }
}

impl<S: KeyedStorage> KeyedStorage for SynchronizedStorage<S> {
    fn get(&self, key: &AnyValue) -> AnyResult<AnyValue> {
        SynchronizedStorage::get(self, key)
    }

    fn put(&mut self, value: AnyValue, key: AnyValue) -> AnyResult<AnyValue> {
        SynchronizedStorage::put(self, value, key)
    }

    fn key_type(&self) -> TypeTag {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.storage.key_type()
    }

    fn len(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.storage.len()
    }
}
