use crate::error::{AnyError, AnyResult};
use crate::TypeTag;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Comparison hooks a type can provide for itself.
///
/// Implement this next to the type and register it once with
/// [`ComparatorRegistry::register_type`]; `AnyValue` comparisons then find it
/// without knowing anything about the type.
///
/// ```
/// use sovran_anystore::{AnyCompare, AnyValue, ComparatorRegistry};
///
/// #[derive(Clone)]
/// struct Version { major: u32, minor: u32 }
///
/// impl AnyCompare for Version {
///     fn any_less(&self, other: &Self) -> bool {
///         (self.major, self.minor) < (other.major, other.minor)
///     }
///     fn any_equal(&self, other: &Self) -> bool {
///         (self.major, self.minor) == (other.major, other.minor)
///     }
/// }
///
/// ComparatorRegistry::global().register_type::<Version>().unwrap();
///
/// let a = AnyValue::new(Version { major: 1, minor: 2 });
/// let b = AnyValue::new(Version { major: 1, minor: 3 });
/// assert!(a.less(&b).unwrap());
/// ```
pub trait AnyCompare: Any + Send + Sync {
    fn any_less(&self, other: &Self) -> bool;
    fn any_equal(&self, other: &Self) -> bool;
}

/// A less/equal pair with its operand type erased
trait ErasedComparator: Send + Sync {
    fn less(&self, a: &dyn Any, b: &dyn Any) -> Option<bool>;
    fn equal(&self, a: &dyn Any, b: &dyn Any) -> Option<bool>;
}

type CompareFn<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

struct TypedComparator<T> {
    less: CompareFn<T>,
    equal: CompareFn<T>,
}

impl<T: Any> ErasedComparator for TypedComparator<T> {
    fn less(&self, a: &dyn Any, b: &dyn Any) -> Option<bool> {
        Some((self.less)(a.downcast_ref::<T>()?, b.downcast_ref::<T>()?))
    }

    fn equal(&self, a: &dyn Any, b: &dyn Any) -> Option<bool> {
        Some((self.equal)(a.downcast_ref::<T>()?, b.downcast_ref::<T>()?))
    }
}

/// Per-type table of less/equal functions used by `AnyValue` comparisons.
///
/// A fresh registry comes with entries for the integer, floating point,
/// `bool`, `char`, `String` and `&'static str` types. Looking up a type with
/// no entry is not an error until a comparison is actually attempted.
///
/// Raw pointers are not `Send + Sync` and cannot be stored in an `AnyValue`.
/// Shared `&'static T` references can; [`ComparatorRegistry::register_ptr_identity`]
/// makes them compare by address.
pub struct ComparatorRegistry {
    entries: RwLock<HashMap<TypeId, Arc<dyn ErasedComparator>>>,
}

macro_rules! builtin {
    ($map:ident, $($t:ty),* $(,)?) => {
        $(
            $map.insert(
                TypeId::of::<$t>(),
                Arc::new(TypedComparator::<$t> {
                    less: Box::new(|a: &$t, b: &$t| a < b),
                    equal: Box::new(|a: &$t, b: &$t| a == b),
                }) as Arc<dyn ErasedComparator>,
            );
        )*
    };
}

impl ComparatorRegistry {
    /// Creates a registry holding only the built-in entries
    pub fn new() -> Self {
        let mut map: HashMap<TypeId, Arc<dyn ErasedComparator>> = HashMap::new();
        builtin!(
            map, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool,
            char, String, &'static str,
        );
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Creates a registry with no entries at all
    pub fn empty() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry consulted by `AnyValue::less` and `AnyValue::equal`
    pub fn global() -> &'static ComparatorRegistry {
        static GLOBAL: OnceLock<ComparatorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ComparatorRegistry::new)
    }

    /// Registers (or replaces) the comparison functions for `T`.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::LockError` if the internal lock cannot be acquired.
    pub fn register<T, L, E>(&self, less: L, equal: E) -> AnyResult<()>
    where
        T: Any,
        L: Fn(&T, &T) -> bool + Send + Sync + 'static,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let entry = TypedComparator::<T> {
            less: Box::new(less),
            equal: Box::new(equal),
        };
        let mut entries = self.entries.write().map_err(|_| AnyError::LockError)?;
        let replaced = entries.insert(TypeId::of::<T>(), Arc::new(entry)).is_some();
        tracing::debug!(ty = std::any::type_name::<T>(), replaced, "Registered comparator");
        Ok(())
    }

    /// Registers `T` using its `Ord` implementation
    pub fn register_ord<T: Any + Ord>(&self) -> AnyResult<()> {
        self.register::<T, _, _>(|a, b| a < b, |a, b| a == b)
    }

    /// Registers `T` using its `PartialOrd` implementation
    pub fn register_partial_ord<T: Any + PartialOrd>(&self) -> AnyResult<()> {
        self.register::<T, _, _>(|a, b| a < b, |a, b| a == b)
    }

    /// Registers `&'static T` so that references compare by the address they
    /// point to rather than by the referenced value
    pub fn register_ptr_identity<T: ?Sized + Sync + 'static>(&self) -> AnyResult<()> {
        self.register::<&'static T, _, _>(
            |a, b| (*a as *const T) < (*b as *const T),
            |a, b| std::ptr::eq(*a, *b),
        )
    }

    /// Registers `T` using the hooks it provides through `AnyCompare`
    pub fn register_type<T: AnyCompare>(&self) -> AnyResult<()> {
        self.register::<T, _, _>(T::any_less, T::any_equal)
    }

    /// Removes the entry for `T`, returning whether one was present
    pub fn unregister<T: Any>(&self) -> AnyResult<bool> {
        let mut entries = self.entries.write().map_err(|_| AnyError::LockError)?;
        Ok(entries.remove(&TypeId::of::<T>()).is_some())
    }

    pub fn contains<T: Any>(&self) -> AnyResult<bool> {
        self.contains_tag(&TypeTag::of::<T>())
    }

    pub fn contains_tag(&self, tag: &TypeTag) -> AnyResult<bool> {
        let entries = self.entries.read().map_err(|_| AnyError::LockError)?;
        Ok(entries.contains_key(&tag.id()))
    }

    /// Evaluates `a < b` for two values both of the type named by `tag`
    pub(crate) fn less(&self, tag: TypeTag, a: &dyn Any, b: &dyn Any) -> AnyResult<bool> {
        self.lookup(tag)?
            .less(a, b)
            .ok_or_else(|| AnyError::mismatch(tag, TypeTag::empty()))
    }

    /// Evaluates `a == b` for two values both of the type named by `tag`
    pub(crate) fn equal(&self, tag: TypeTag, a: &dyn Any, b: &dyn Any) -> AnyResult<bool> {
        self.lookup(tag)?
            .equal(a, b)
            .ok_or_else(|| AnyError::mismatch(tag, TypeTag::empty()))
    }

    fn lookup(&self, tag: TypeTag) -> AnyResult<Arc<dyn ErasedComparator>> {
        let entries = self.entries.read().map_err(|_| AnyError::LockError)?;
        entries
            .get(&tag.id())
            .cloned()
            .ok_or(AnyError::ComparatorNotImplemented(tag))
    }
}

impl Default for ComparatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
