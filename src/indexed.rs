use crate::error::{AnyError, AnyResult};
use crate::{AnyValue, KeyedStorage, TypeTag};

/// Vector-like storage addressed by `usize` position.
///
/// Putting with an empty key appends; putting past the end grows the storage
/// with empty slots so the target position exists.
#[derive(Debug, Clone, Default)]
pub struct IndexedStorage {
    values: Vec<AnyValue>,
}

impl IndexedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` and returns its position
    pub fn push(&mut self, value: AnyValue) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnyValue> {
        self.values.iter()
    }

    fn index_of(key: &AnyValue) -> AnyResult<usize> {
        key.extract::<usize>()
    }
}

impl KeyedStorage for IndexedStorage {
    /// # Errors
    ///
    /// - `AnyError::TypeMismatch` if `key` does not hold a `usize`
    /// - `AnyError::KeyNotFound` if the position is past the end
    fn get(&self, key: &AnyValue) -> AnyResult<AnyValue> {
        let index = Self::index_of(key)?;
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| AnyError::KeyNotFound(index.to_string()))
    }

    fn put(&mut self, value: AnyValue, key: AnyValue) -> AnyResult<AnyValue> {
        if key.is_empty() {
            return Ok(AnyValue::new(self.push(value)));
        }
        let index = Self::index_of(&key)?;
        if index >= self.values.len() {
            tracing::trace!(from = self.values.len(), to = index + 1, "Growing indexed storage");
            self.values.resize_with(index + 1, AnyValue::empty);
        }
        self.values[index].copy_from(&value);
        Ok(key)
    }

    fn key_type(&self) -> TypeTag {
        TypeTag::of::<usize>()
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}
