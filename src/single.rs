use crate::error::AnyResult;
use crate::{AnyValue, KeyedStorage, TypeTag};

/// Storage holding a single value; every key addresses the same slot
#[derive(Debug, Clone, Default)]
pub struct SingleSlotStorage {
    value: AnyValue,
}

impl SingleSlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the stored value out, leaving the slot empty
    pub fn take(&mut self) -> AnyValue {
        self.value.take()
    }
}

impl KeyedStorage for SingleSlotStorage {
    fn get(&self, _key: &AnyValue) -> AnyResult<AnyValue> {
        Ok(self.value.clone())
    }

    /// Overwrites the slot. The returned key is always empty.
    fn put(&mut self, value: AnyValue, _key: AnyValue) -> AnyResult<AnyValue> {
        self.value.copy_from(&value);
        Ok(AnyValue::empty())
    }

    fn key_type(&self) -> TypeTag {
        TypeTag::empty()
    }

    fn len(&self) -> usize {
        usize::from(!self.value.is_empty())
    }
}
