use crate::compare::ComparatorRegistry;
use crate::error::{AnyError, AnyResult};
use crate::TypeTag;
use std::any::Any;
use std::fmt;
use std::mem;

/// Operations bound to the concrete type of a stored value
trait Holder: Send + Sync {
    fn type_tag(&self) -> TypeTag;
    fn clone_box(&self) -> Box<dyn Holder>;
    /// Assigns `other`'s value in place. Returns false if `other` holds another type.
    fn assign_from(&mut self, other: &dyn Holder) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn size_of(&self) -> usize;
    fn align_of(&self) -> usize;
    fn less(&self, other: &dyn Holder, registry: &ComparatorRegistry) -> AnyResult<bool>;
    fn equal(&self, other: &dyn Holder, registry: &ComparatorRegistry) -> AnyResult<bool>;
}

struct ValueHolder<T> {
    value: T,
}

impl<T> Holder for ValueHolder<T>
where
    T: Any + Clone + Send + Sync,
{
    fn type_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn clone_box(&self) -> Box<dyn Holder> {
        Box::new(ValueHolder {
            value: self.value.clone(),
        })
    }

    fn assign_from(&mut self, other: &dyn Holder) -> bool {
        match other.as_any().downcast_ref::<T>() {
            Some(value) => {
                self.value.clone_from(value);
                true
            }
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        &self.value
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut self.value
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        Box::new(self.value)
    }

    fn size_of(&self) -> usize {
        mem::size_of::<T>()
    }

    fn align_of(&self) -> usize {
        mem::align_of::<T>()
    }

    fn less(&self, other: &dyn Holder, registry: &ComparatorRegistry) -> AnyResult<bool> {
        registry.less(self.type_tag(), self.as_any(), other.as_any())
    }

    fn equal(&self, other: &dyn Holder, registry: &ComparatorRegistry) -> AnyResult<bool> {
        registry.equal(self.type_tag(), self.as_any(), other.as_any())
    }
}

/// A container for a single value of any cloneable type.
///
/// The value's type is recorded when it is stored and checked every time the
/// value is read back or compared. Cloning an `AnyValue` clones the held value.
///
/// # Examples
///
/// ```
/// use sovran_anystore::{AnyError, AnyValue};
///
/// let mut value = AnyValue::new(3.14f64);
/// value.copy_from(&AnyValue::new(42i32));
/// assert_eq!(value.extract::<i32>()?, 42);
///
/// assert!(matches!(
///     value.extract::<f64>(),
///     Err(AnyError::TypeMismatch { .. })
/// ));
/// # Ok::<(), AnyError>(())
/// ```
#[derive(Default)]
pub struct AnyValue {
    holder: Option<Box<dyn Holder>>,
}

impl AnyValue {
    /// Create a new AnyValue holding `value`
    pub fn new<T: Any + Clone + Send + Sync>(value: T) -> Self {
        Self {
            holder: Some(Box::new(ValueHolder { value })),
        }
    }

    /// Create an AnyValue that holds nothing
    pub fn empty() -> Self {
        Self { holder: None }
    }

    pub fn is_empty(&self) -> bool {
        self.holder.is_none()
    }

    /// Type of the held value, or `TypeTag::empty()` if there is none
    pub fn type_tag(&self) -> TypeTag {
        self.holder
            .as_ref()
            .map_or_else(TypeTag::empty, |h| h.type_tag())
    }

    /// Check if the contained value is of type T
    pub fn is<T: Any>(&self) -> bool {
        self.type_tag().is::<T>()
    }

    /// Makes `self` hold a copy of `other`'s value.
    ///
    /// When both hold the same type the value is assigned in place and the
    /// existing holder is kept. Otherwise `other` is cloned first and then
    /// swapped in, so `self` is untouched if cloning panics.
    pub fn copy_from(&mut self, other: &AnyValue) {
        if let (Some(mine), Some(theirs)) = (self.holder.as_mut(), other.holder.as_ref()) {
            if mine.type_tag() == theirs.type_tag() && mine.assign_from(theirs.as_ref()) {
                return;
            }
        }
        let mut copy = other.clone();
        self.swap(&mut copy);
    }

    /// Stores `value`, reusing the current holder if it already holds a `T`
    pub fn assign<T: Any + Clone + Send + Sync>(&mut self, value: T) {
        if let Some(slot) = self
            .holder
            .as_mut()
            .and_then(|h| h.as_any_mut().downcast_mut::<T>())
        {
            *slot = value;
            return;
        }
        *self = AnyValue::new(value);
    }

    /// Returns a copy of the held value.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::TypeMismatch` unless the held value is a `T`.
    pub fn extract<T: Any + Clone>(&self) -> AnyResult<T> {
        self.extract_ref::<T>().cloned()
    }

    /// Returns a reference to the held value.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::TypeMismatch` unless the held value is a `T`.
    pub fn extract_ref<T: Any>(&self) -> AnyResult<&T> {
        let found = self.type_tag();
        self.holder
            .as_ref()
            .and_then(|h| h.as_any().downcast_ref::<T>())
            .ok_or_else(|| AnyError::mismatch(TypeTag::of::<T>(), found))
    }

    /// Returns a mutable reference to the held value.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::TypeMismatch` unless the held value is a `T`.
    pub fn extract_mut<T: Any>(&mut self) -> AnyResult<&mut T> {
        let found = self.type_tag();
        self.holder
            .as_mut()
            .and_then(|h| h.as_any_mut().downcast_mut::<T>())
            .ok_or_else(|| AnyError::mismatch(TypeTag::of::<T>(), found))
    }

    /// Consumes the AnyValue and returns the held value.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::TypeMismatch` unless the held value is a `T`; the
    /// value is dropped in that case.
    pub fn into_inner<T: Any>(self) -> AnyResult<T> {
        let found = self.type_tag();
        self.holder
            .and_then(|h| h.into_any().downcast::<T>().ok())
            .map(|boxed| *boxed)
            .ok_or_else(|| AnyError::mismatch(TypeTag::of::<T>(), found))
    }

    /// Exchanges the contents of two values
    pub fn swap(&mut self, other: &mut AnyValue) {
        mem::swap(&mut self.holder, &mut other.holder);
    }

    /// Moves the held value out, leaving `self` empty
    pub fn take(&mut self) -> AnyValue {
        AnyValue {
            holder: self.holder.take(),
        }
    }

    /// Builds a value that owns whatever `source` held; `source` is left empty
    pub fn transfer_from(source: &mut AnyValue) -> AnyValue {
        source.take()
    }

    /// `self < other`, dispatched through the global comparator registry.
    ///
    /// # Errors
    ///
    /// - `AnyError::TypeMismatch` if the two values hold different types
    /// - `AnyError::EmptyCompare` if both are empty
    /// - `AnyError::ComparatorNotImplemented` if no comparator is registered
    pub fn less(&self, other: &AnyValue) -> AnyResult<bool> {
        self.less_in(other, ComparatorRegistry::global())
    }

    /// `self > other`; see [`AnyValue::less`] for errors
    pub fn greater(&self, other: &AnyValue) -> AnyResult<bool> {
        other.less(self)
    }

    /// `self == other`; see [`AnyValue::less`] for errors
    pub fn equal(&self, other: &AnyValue) -> AnyResult<bool> {
        self.equal_in(other, ComparatorRegistry::global())
    }

    /// `self != other`; see [`AnyValue::less`] for errors
    pub fn not_equal(&self, other: &AnyValue) -> AnyResult<bool> {
        self.equal(other).map(|eq| !eq)
    }

    /// Like [`AnyValue::less`] but consults `registry` instead of the global one
    pub fn less_in(&self, other: &AnyValue, registry: &ComparatorRegistry) -> AnyResult<bool> {
        let (a, b) = self.comparable(other)?;
        a.less(b, registry)
    }

    /// Like [`AnyValue::equal`] but consults `registry` instead of the global one
    pub fn equal_in(&self, other: &AnyValue, registry: &ComparatorRegistry) -> AnyResult<bool> {
        let (a, b) = self.comparable(other)?;
        a.equal(b, registry)
    }

    /// Compares the held value with a plain `T` using `T`'s own `PartialEq`.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::TypeMismatch` unless the held value is a `T`.
    pub fn equals_value<T: Any + PartialEq>(&self, value: &T) -> AnyResult<bool> {
        self.extract_ref::<T>().map(|held| held == value)
    }

    fn comparable<'a>(&'a self, other: &'a AnyValue) -> AnyResult<(&'a dyn Holder, &'a dyn Holder)> {
        let (mine, theirs) = (self.type_tag(), other.type_tag());
        if mine != theirs {
            return Err(AnyError::mismatch(mine, theirs));
        }
        match (self.holder.as_deref(), other.holder.as_deref()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(AnyError::EmptyCompare),
        }
    }

    /// Size in bytes of the held value
    pub fn size_of(&self) -> Option<usize> {
        self.holder.as_ref().map(|h| h.size_of())
    }

    /// Alignment in bytes of the held value
    pub fn align_of(&self) -> Option<usize> {
        self.holder.as_ref().map(|h| h.align_of())
    }

    /// Untyped address of the held value.
    ///
    /// No type check is performed; dereferencing the pointer is only sound
    /// for a caller that already knows the held type.
    pub fn as_ptr(&self) -> Option<*const ()> {
        self.holder
            .as_ref()
            .map(|h| h.as_any() as *const _ as *const ())
    }

    /// Untyped mutable address of the held value; see [`AnyValue::as_ptr`]
    pub fn as_mut_ptr(&mut self) -> Option<*mut ()> {
        self.holder
            .as_mut()
            .map(|h| h.as_any_mut() as *mut _ as *mut ())
    }
}

impl Clone for AnyValue {
    fn clone(&self) -> Self {
        Self {
            holder: self.holder.as_ref().map(|h| h.clone_box()),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.copy_from(source);
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.holder {
            Some(h) => write!(f, "AnyValue<{}>", h.type_tag()),
            None => f.write_str("AnyValue(empty)"),
        }
    }
}

/// `a < b`; see [`AnyValue::less`]
pub fn any_less(a: &AnyValue, b: &AnyValue) -> AnyResult<bool> {
    a.less(b)
}

/// `a == b`; see [`AnyValue::equal`]
pub fn any_equal(a: &AnyValue, b: &AnyValue) -> AnyResult<bool> {
    a.equal(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_extract() {
        let value = AnyValue::new(42i32);
        assert!(!value.is_empty());
        assert!(value.is::<i32>());
        assert_eq!(value.extract::<i32>().unwrap(), 42);
        assert_eq!(*value.extract_ref::<i32>().unwrap(), 42);
    }

    #[test]
    fn test_empty_value() {
        let value = AnyValue::empty();
        assert!(value.is_empty());
        assert!(value.type_tag().is_empty());
        assert!(value.size_of().is_none());
        assert!(value.as_ptr().is_none());
        assert!(AnyValue::default().is_empty());
    }

    #[test]
    fn test_extract_wrong_type_reports_both_types() {
        let value = AnyValue::new("hello".to_string());
        match value.extract::<i32>() {
            Err(AnyError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, TypeTag::of::<i32>());
                assert_eq!(found, TypeTag::of::<String>());
            }
            other => panic!("Expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_from_empty_is_mismatch() {
        let value = AnyValue::empty();
        match value.extract_ref::<u8>() {
            Err(AnyError::TypeMismatch { found, .. }) => assert!(found.is_empty()),
            other => panic!("Expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_copy_from_same_type_keeps_holder() {
        let mut value = AnyValue::new(1u64);
        let before = value.as_ptr();
        value.copy_from(&AnyValue::new(7u64));
        assert_eq!(value.as_ptr(), before);
        assert_eq!(value.extract::<u64>().unwrap(), 7);
    }

    #[test]
    fn test_copy_from_other_type_replaces_holder() {
        let mut value = AnyValue::new(3.14f64);
        value.copy_from(&AnyValue::new(42i32));
        assert_eq!(value.type_tag(), TypeTag::of::<i32>());
        assert_eq!(value.extract::<i32>().unwrap(), 42);
    }

    #[test]
    fn test_copy_from_empty_empties() {
        let mut value = AnyValue::new(5u8);
        value.copy_from(&AnyValue::empty());
        assert!(value.is_empty());
    }

    #[test]
    fn test_assign_in_place_and_replace() {
        let mut value = AnyValue::new(10i32);
        let before = value.as_ptr();
        value.assign(20i32);
        assert_eq!(value.as_ptr(), before);
        assert_eq!(value.extract::<i32>().unwrap(), 20);

        value.assign("text".to_string());
        assert!(value.is::<String>());
        assert_eq!(value.extract_ref::<String>().unwrap(), "text");
    }

    #[test]
    fn test_clone_is_deep() {
        let original = AnyValue::new(vec![1, 2, 3]);
        let mut copy = original.clone();
        copy.extract_mut::<Vec<i32>>().unwrap().push(4);
        assert_eq!(original.extract_ref::<Vec<i32>>().unwrap().len(), 3);
        assert_eq!(copy.extract_ref::<Vec<i32>>().unwrap().len(), 4);
    }

    #[test]
    fn test_swap() {
        let mut a = AnyValue::new(1i32);
        let mut b = AnyValue::new("b".to_string());
        a.swap(&mut b);
        assert!(a.is::<String>());
        assert_eq!(b.extract::<i32>().unwrap(), 1);

        let mut empty = AnyValue::empty();
        a.swap(&mut empty);
        assert!(a.is_empty());
        assert!(empty.is::<String>());
    }

    #[test]
    fn test_transfer_leaves_source_empty() {
        let mut source = AnyValue::new(3.0f64);
        let moved = AnyValue::transfer_from(&mut source);
        assert!(source.is_empty());
        assert_eq!(moved.extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_into_inner() {
        let value = AnyValue::new(String::from("owned"));
        assert_eq!(value.into_inner::<String>().unwrap(), "owned");
        assert!(AnyValue::new(1u8).into_inner::<u16>().is_err());
        assert!(AnyValue::empty().into_inner::<u16>().is_err());
    }

    #[test]
    fn test_size_and_alignment() {
        let value = AnyValue::new(0u32);
        assert_eq!(value.size_of(), Some(4));
        assert_eq!(value.align_of(), Some(mem::align_of::<u32>()));

        let value = AnyValue::new([0u8; 3]);
        assert_eq!(value.size_of(), Some(3));
        assert_eq!(value.align_of(), Some(1));
    }

    #[test]
    fn test_raw_address_points_at_value() {
        let mut value = AnyValue::new(99i64);
        let ptr = value.as_mut_ptr().unwrap() as *mut i64;
        unsafe {
            *ptr = 100;
        }
        assert_eq!(value.extract::<i64>().unwrap(), 100);
    }

    #[test]
    fn test_equals_value() {
        let value = AnyValue::new(String::from("hey"));
        assert!(value.equals_value(&String::from("hey")).unwrap());
        assert!(!value.equals_value(&String::from("ho")).unwrap());
        assert!(value.equals_value(&5i32).is_err());
    }

    #[test]
    fn test_debug_output() {
        assert_eq!(format!("{:?}", AnyValue::empty()), "AnyValue(empty)");
        assert_eq!(format!("{:?}", AnyValue::new(1u8)), "AnyValue<u8>");
    }
}
