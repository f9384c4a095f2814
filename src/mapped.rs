use crate::error::{AnyError, AnyResult};
use crate::{AnyValue, KeyedStorage, TypeTag};
use std::cmp::Ordering;

/// Storage mapping `AnyValue` keys to `AnyValue` values.
///
/// Entries are kept sorted: first by key type, then by the registered
/// comparator of that type. Keys of different types can therefore share one
/// storage, but a key type without a registered comparator fails as soon as
/// two keys of that type have to be ordered.
///
/// A key that does not compare equal to itself, such as a floating point NaN,
/// cannot be ordered: `put` rejects it with `AnyError::InvalidKey` and lookups
/// treat it as absent.
#[derive(Debug, Clone, Default)]
pub struct MapStorage {
    entries: Vec<(AnyValue, AnyValue)>,
    first_key_type: Option<TypeTag>,
}

fn key_order(a: &AnyValue, b: &AnyValue) -> AnyResult<Ordering> {
    let (ta, tb) = (a.type_tag(), b.type_tag());
    if ta != tb {
        return Ok(ta.cmp(&tb));
    }
    if a.less(b)? {
        Ok(Ordering::Less)
    } else if b.less(a)? {
        Ok(Ordering::Greater)
    } else {
        Ok(Ordering::Equal)
    }
}

/// True for keys whose comparator says they differ from themselves
fn is_unordered(key: &AnyValue) -> bool {
    matches!(key.equal(key), Ok(false))
}

impl MapStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of an existing entry for `key`; empty and unordered keys match nothing
    fn find(&self, key: &AnyValue) -> AnyResult<Option<usize>> {
        if key.is_empty() || is_unordered(key) {
            return Ok(None);
        }
        Ok(self.search(key)?.ok())
    }

    /// Position of `key`, or the position it would be inserted at
    fn search(&self, key: &AnyValue) -> AnyResult<Result<usize, usize>> {
        let (mut lo, mut hi) = (0, self.entries.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match key_order(&self.entries[mid].0, key)? {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(Ok(mid)),
            }
        }
        Ok(Err(lo))
    }

    pub fn contains_key(&self, key: &AnyValue) -> AnyResult<bool> {
        Ok(self.find(key)?.is_some())
    }

    /// Removes the entry for `key`, returning its value if there was one
    pub fn remove(&mut self, key: &AnyValue) -> AnyResult<Option<AnyValue>> {
        let removed = self.find(key)?.map(|pos| self.entries.remove(pos).1);
        if self.entries.is_empty() {
            self.first_key_type = None;
        }
        Ok(removed)
    }

    /// Copies of all keys, in storage order
    pub fn keys(&self) -> Vec<AnyValue> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl KeyedStorage for MapStorage {
    /// Returns the value for `key`, or an empty value if there is none.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::ComparatorNotImplemented` if `key` has to be
    /// compared with a stored key of a type that has no comparator.
    fn get(&self, key: &AnyValue) -> AnyResult<AnyValue> {
        Ok(self
            .find(key)?
            .map_or_else(AnyValue::empty, |pos| self.entries[pos].1.clone()))
    }

    /// Inserts or overwrites the value for `key` and returns `key`.
    ///
    /// # Errors
    ///
    /// - `AnyError::EmptyCompare` if `key` is empty
    /// - `AnyError::InvalidKey` if `key` does not compare equal to itself
    /// - `AnyError::ComparatorNotImplemented` as for [`MapStorage::get`]
    fn put(&mut self, value: AnyValue, key: AnyValue) -> AnyResult<AnyValue> {
        if key.is_empty() {
            return Err(AnyError::EmptyCompare);
        }
        if is_unordered(&key) {
            return Err(AnyError::InvalidKey(key.type_tag()));
        }
        match self.search(&key)? {
            Ok(pos) => self.entries[pos].1.copy_from(&value),
            Err(pos) => {
                self.first_key_type.get_or_insert(key.type_tag());
                self.entries.insert(pos, (key.clone(), value));
            }
        }
        Ok(key)
    }

    /// Type of the first key inserted, or `AnyValue` while the map is empty
    fn key_type(&self) -> TypeTag {
        self.first_key_type
            .unwrap_or_else(TypeTag::of::<AnyValue>)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
