use crate::error::AnyResult;
use crate::{AnyValue, IndexedStorage, MapStorage, SingleSlotStorage, SynchronizedStorage, TypeTag};
use dyn_clone::DynClone;
use std::fmt::Debug;
use std::sync::Arc;

/// Get/put access to `AnyValue`s addressed by an `AnyValue` key.
///
/// Implementations are plain value stores and are not synchronized; wrap one
/// in a [`SynchronizedStorage`] to share it between threads. Cloning a storage
/// (including a `Box<dyn KeyedStorage>`) deep-copies every stored value.
pub trait KeyedStorage: DynClone + Debug + Send + Sync {
    /// Returns a copy of the value stored under `key`.
    ///
    /// Pass `AnyValue::empty()` for storages that ignore the key.
    fn get(&self, key: &AnyValue) -> AnyResult<AnyValue>;

    /// Stores `value` under `key` and returns the key actually used.
    ///
    /// Storages that generate keys do so when `key` is empty.
    fn put(&mut self, value: AnyValue, key: AnyValue) -> AnyResult<AnyValue>;

    /// Type of the keys this storage is addressed with
    fn key_type(&self) -> TypeTag;

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

dyn_clone::clone_trait_object!(KeyedStorage);

impl KeyedStorage for Box<dyn KeyedStorage> {
    fn get(&self, key: &AnyValue) -> AnyResult<AnyValue> {
        (**self).get(key)
    }

    fn put(&mut self, value: AnyValue, key: AnyValue) -> AnyResult<AnyValue> {
        (**self).put(value, key)
    }

    fn key_type(&self) -> TypeTag {
        (**self).key_type()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// Reference-counted handle to a synchronized storage.
///
/// Cloning the handle aliases the same storage; use
/// [`SynchronizedStorage::try_clone`] for an independent copy.
pub type SharedStorage<S> = Arc<SynchronizedStorage<S>>;

/// The storage variants that can be created without naming a concrete type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// One value, key ignored
    Single,
    /// Positional values addressed by `usize`
    Indexed,
    /// Values addressed by arbitrary comparable keys
    Mapped,
}

impl StorageKind {
    /// Creates an empty storage of this kind
    pub fn create(self) -> Box<dyn KeyedStorage> {
        match self {
            StorageKind::Single => Box::new(SingleSlotStorage::new()),
            StorageKind::Indexed => Box::new(IndexedStorage::new()),
            StorageKind::Mapped => Box::new(MapStorage::new()),
        }
    }

    /// Creates an empty storage of this kind behind a shared synchronized handle
    pub fn create_synchronized(self) -> SharedStorage<Box<dyn KeyedStorage>> {
        Arc::new(SynchronizedStorage::with_storage(self.create()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_key_types() {
        assert!(StorageKind::Single.create().key_type().is_empty());
        assert_eq!(StorageKind::Indexed.create().key_type(), TypeTag::of::<usize>());
        assert_eq!(
            StorageKind::Mapped.create().key_type(),
            TypeTag::of::<AnyValue>()
        );
    }

    #[test]
    fn test_boxed_clone_is_independent() {
        let mut original = StorageKind::Indexed.create();
        original.put(AnyValue::new(1i32), AnyValue::empty()).unwrap();

        let mut copy = original.clone();
        copy.put(AnyValue::new(2i32), AnyValue::new(0usize)).unwrap();

        let key = AnyValue::new(0usize);
        assert_eq!(original.get(&key).unwrap().extract::<i32>().unwrap(), 1);
        assert_eq!(copy.get(&key).unwrap().extract::<i32>().unwrap(), 2);
    }

    #[test]
    fn test_shared_handle_aliases() {
        let shared = StorageKind::Single.create_synchronized();
        let alias = Arc::clone(&shared);
        alias.put(AnyValue::new(5u8), AnyValue::empty()).unwrap();
        assert_eq!(
            shared.get(&AnyValue::empty()).unwrap().extract::<u8>().unwrap(),
            5
        );
        assert_eq!(Arc::strong_count(&shared), 2);
    }
}
