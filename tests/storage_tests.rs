use sovran_anystore::{
    AnyError, AnyValue, IndexedStorage, KeyedStorage, MapStorage, SingleSlotStorage, StorageKind,
    SynchronizedStorage, TypeTag,
};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_single_storage() {
    let mut storage = SingleSlotStorage::new();
    storage.put(AnyValue::new(123i32), AnyValue::empty()).unwrap();
    assert_eq!(storage.get(&AnyValue::empty()).unwrap().extract::<i32>().unwrap(), 123);
}

#[test]
fn test_indexed_storage() {
    let mut storage = IndexedStorage::new();
    let k1 = storage.put(AnyValue::new(123i32), AnyValue::empty()).unwrap();
    let k2 = storage.put(AnyValue::new("321".to_string()), AnyValue::empty()).unwrap();
    assert!(storage.get(&k1).unwrap().equals_value(&123i32).unwrap());
    assert!(storage.get(&k2).unwrap().equals_value(&"321".to_string()).unwrap());

    storage.put(AnyValue::new(321i32), k1.clone()).unwrap();
    assert!(storage.get(&k1).unwrap().equals_value(&321i32).unwrap());
}

#[test]
fn test_map_storage() {
    let mut storage = MapStorage::new();
    let k1 = storage.put(AnyValue::new(123i32), AnyValue::new(1i32)).unwrap();
    let k2 = storage.put(AnyValue::new("321".to_string()), AnyValue::new(4i32)).unwrap();
    assert!(storage.get(&k1).unwrap().equals_value(&123i32).unwrap());
    assert!(storage.get(&k2).unwrap().equals_value(&"321".to_string()).unwrap());

    storage.put(AnyValue::new(321i32), k1.clone()).unwrap();
    assert!(storage.get(&k1).unwrap().equals_value(&321i32).unwrap());
}

#[test]
fn test_map_storage_string_value_int_key() {
    let mut storage = MapStorage::new();
    storage
        .put(AnyValue::new(String::from("hey")), AnyValue::new(3i32))
        .unwrap();
    let value = storage.get(&AnyValue::new(3i32)).unwrap();
    assert_eq!(value.extract::<String>().unwrap(), "hey");
}

#[test]
fn test_map_storage_mixed_key_types() {
    let mut storage = MapStorage::new();
    storage.put(AnyValue::new(1i32), AnyValue::new(5i32)).unwrap();
    storage.put(AnyValue::new(2i32), AnyValue::new("five".to_string())).unwrap();
    storage.put(AnyValue::new(3i32), AnyValue::new(5u64)).unwrap();

    assert_eq!(storage.len(), 3);
    assert!(storage.get(&AnyValue::new(5i32)).unwrap().equals_value(&1i32).unwrap());
    assert!(storage
        .get(&AnyValue::new("five".to_string()))
        .unwrap()
        .equals_value(&2i32)
        .unwrap());
    assert!(storage.get(&AnyValue::new(5u64)).unwrap().equals_value(&3i32).unwrap());
    assert!(storage.get(&AnyValue::new(5u8)).unwrap().is_empty());
}

#[test]
fn test_clone_deep_copies_values() {
    let mut storage = MapStorage::new();
    storage.put(AnyValue::new(vec![1, 2]), AnyValue::new(0i32)).unwrap();

    let mut copy = storage.clone();
    copy.put(AnyValue::new(vec![9]), AnyValue::new(0i32)).unwrap();

    let key = AnyValue::new(0i32);
    assert_eq!(storage.get(&key).unwrap().extract::<Vec<i32>>().unwrap(), vec![1, 2]);
    assert_eq!(copy.get(&key).unwrap().extract::<Vec<i32>>().unwrap(), vec![9]);
}

#[test]
fn test_factory_storages_behave_like_concrete_ones() {
    for kind in [StorageKind::Single, StorageKind::Indexed, StorageKind::Mapped] {
        let mut storage = kind.create();
        let key = match kind {
            StorageKind::Mapped => AnyValue::new("key".to_string()),
            _ => AnyValue::empty(),
        };
        let used = storage.put(AnyValue::new(11i32), key).unwrap();
        let value = storage.get(&used).unwrap();
        assert_eq!(value.extract::<i32>().unwrap(), 11, "{:?}", kind);
    }
}

#[test]
fn test_synchronized_key_type_follows_inner() {
    let storage = SynchronizedStorage::<IndexedStorage>::new();
    assert_eq!(storage.key_type().unwrap(), TypeTag::of::<usize>());
}

#[test]
fn test_synchronized_map_storage() {
    let storage = Arc::new(SynchronizedStorage::<MapStorage>::new());
    let k1 = storage.put(AnyValue::new(123i32), AnyValue::new(1i32)).unwrap();
    let k2 = storage.put(AnyValue::new("321".to_string()), AnyValue::new(4i32)).unwrap();
    assert!(storage.get(&k1).unwrap().equals_value(&123i32).unwrap());
    assert!(storage.get(&k2).unwrap().equals_value(&"321".to_string()).unwrap());
    storage.put(AnyValue::new(321i32), k1.clone()).unwrap();
    assert!(storage.get(&k1).unwrap().equals_value(&321i32).unwrap());
}

#[test]
fn test_get_blocks_until_put() {
    let storage = StorageKind::Single.create_synchronized();
    let barrier = Arc::new(Barrier::new(2));

    let reader = {
        let storage = Arc::clone(&storage);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            storage.get(&AnyValue::empty())
        })
    };

    barrier.wait();
    thread::sleep(Duration::from_millis(50));
    assert!(!reader.is_finished());

    storage.put(AnyValue::new(1i32), AnyValue::empty()).unwrap();
    let value = reader.join().unwrap().unwrap();
    assert_eq!(value.extract::<i32>().unwrap(), 1);
}

#[test]
fn test_all_blocked_readers_wake() {
    let storage = Arc::new(SynchronizedStorage::<SingleSlotStorage>::new());
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let storage = Arc::clone(&storage);
            thread::spawn(move || storage.get(&AnyValue::empty()).unwrap())
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    storage.put(AnyValue::new("go".to_string()), AnyValue::empty()).unwrap();

    for reader in readers {
        let value = reader.join().unwrap();
        assert_eq!(value.extract_ref::<String>().unwrap(), "go");
    }
}

#[test]
fn test_concurrent_producers() {
    let storage = Arc::new(SynchronizedStorage::<IndexedStorage>::new());
    let mut handles = vec![];
    for t in 0..8usize {
        let storage = Arc::clone(&storage);
        handles.push(thread::spawn(move || {
            for i in 0..50usize {
                storage
                    .put(AnyValue::new(t * 1000 + i), AnyValue::empty())
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Every append lands in its own slot
    assert_eq!(storage.len().unwrap(), 400);
    let inner = Arc::try_unwrap(storage).unwrap().into_inner().unwrap();
    let mut seen: Vec<usize> = inner.iter().map(|v| v.extract::<usize>().unwrap()).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 400);
}

#[test]
fn test_put_errors_do_not_poison() {
    let storage = SynchronizedStorage::<MapStorage>::new();
    assert!(matches!(
        storage.put(AnyValue::new(1i32), AnyValue::empty()),
        Err(AnyError::EmptyCompare)
    ));
    storage.put(AnyValue::new(2i32), AnyValue::new(1i32)).unwrap();
    assert!(storage.get(&AnyValue::new(1i32)).unwrap().equals_value(&2i32).unwrap());
}
