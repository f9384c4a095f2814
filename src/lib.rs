//! # sovran-anystore
//!
//! Type-erased values with runtime type checks, and keyed storages built on them.
//!
//! `sovran-anystore` provides [`AnyValue`], a single non-generic container that can
//! hold a value of any cloneable type. The type is recorded when the value is stored
//! and checked when it is read back or compared, so mistakes surface as errors at the
//! point of use instead of as silent reinterpretation.
//!
//! ## Key Features
//!
//! - **Value semantics**: Cloning, copying and assigning an `AnyValue` copies the held value
//! - **Type-checked access**: Extraction and comparison report the expected and actual types on mismatch
//! - **Pluggable comparison**: A per-type comparator registry that user types can join
//! - **Keyed storages**: Single-slot, indexed and ordered-map storages of `AnyValue`s
//! - **Producer/consumer**: A synchronized wrapper whose readers block until data has been put
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_anystore::{AnyError, AnyValue};
//!
//! fn main() -> Result<(), AnyError> {
//!     let number = AnyValue::new(42i32);
//!     let mut other = AnyValue::new(3.14f64);
//!
//!     // Copying from a value of another type replaces the held type
//!     other.copy_from(&number);
//!     assert_eq!(other.extract::<i32>()?, 42);
//!
//!     // Reading with the wrong type is an error, not a reinterpretation
//!     match other.extract::<f64>() {
//!         Ok(value) => println!("Value: {}", value),
//!         Err(AnyError::TypeMismatch { expected, found }) => {
//!             println!("Wanted {}, but the value is a {}", expected, found)
//!         }
//!         Err(e) => println!("Other error: {}", e),
//!     }
//!
//!     // Moving a value out leaves the source empty
//!     let mut source = AnyValue::new(String::from("moved"));
//!     let target = AnyValue::transfer_from(&mut source);
//!     assert!(source.is_empty());
//!     assert_eq!(target.extract_ref::<String>()?, "moved");
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Comparing Values
//!
//! ```rust
//! use sovran_anystore::{AnyError, AnyValue, ComparatorRegistry};
//!
//! fn main() -> Result<(), AnyError> {
//!     // Built-in comparators cover primitives and strings
//!     assert!(AnyValue::new(2i32).less(&AnyValue::new(4i32))?);
//!     assert!(AnyValue::new("a".to_string()).equal(&AnyValue::new("a".to_string()))?);
//!
//!     // Different types never compare
//!     assert!(matches!(
//!         AnyValue::new(1i32).equal(&AnyValue::new(1i64)),
//!         Err(AnyError::TypeMismatch { .. })
//!     ));
//!
//!     // Types without a comparator fail only when compared
//!     #[derive(Clone, PartialEq, PartialOrd)]
//!     struct Celsius(f64);
//!
//!     let warm = AnyValue::new(Celsius(25.0));
//!     let cold = AnyValue::new(Celsius(-5.0));
//!     assert!(matches!(
//!         cold.less(&warm),
//!         Err(AnyError::ComparatorNotImplemented(_))
//!     ));
//!
//!     ComparatorRegistry::global().register_partial_ord::<Celsius>()?;
//!     assert!(cold.less(&warm)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Keyed Storage
//!
//! ```rust
//! use sovran_anystore::{AnyError, AnyValue, KeyedStorage, StorageKind};
//!
//! fn main() -> Result<(), AnyError> {
//!     let mut map = StorageKind::Mapped.create();
//!     map.put(AnyValue::new("hey".to_string()), AnyValue::new(3i32))?;
//!
//!     let value = map.get(&AnyValue::new(3i32))?;
//!     assert_eq!(value.extract_ref::<String>()?, "hey");
//!
//!     // Unknown keys read back as empty values
//!     assert!(map.get(&AnyValue::new(4i32))?.is_empty());
//!
//!     let mut list = StorageKind::Indexed.create();
//!     let key = list.put(AnyValue::new(1.5f32), AnyValue::empty())?;
//!     assert_eq!(key.extract::<usize>()?, 0);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Sharing Storage Between Threads
//!
//! ```rust
//! use sovran_anystore::{AnyError, AnyValue, SingleSlotStorage, SynchronizedStorage};
//! use std::sync::Arc;
//! use std::thread;
//!
//! fn main() -> Result<(), AnyError> {
//!     let slot = Arc::new(SynchronizedStorage::<SingleSlotStorage>::new());
//!
//!     let consumer = {
//!         let slot = Arc::clone(&slot);
//!         // Blocks until the producer below has put a value
//!         thread::spawn(move || slot.get(&AnyValue::empty()))
//!     };
//!
//!     slot.put(AnyValue::new(7u64), AnyValue::empty())?;
//!
//!     let value = consumer.join().expect("consumer panicked")?;
//!     assert_eq!(value.extract::<u64>()?, 7);
//!
//!     Ok(())
//! }
//! ```

mod any_value;
mod compare;
mod error;
mod indexed;
mod mapped;
mod single;
mod storage;
mod sync;
mod type_tag;


pub use any_value::{any_equal, any_less, AnyValue};
pub use compare::{AnyCompare, ComparatorRegistry};
pub use error::{AnyError, AnyResult};
pub use indexed::IndexedStorage;
pub use mapped::MapStorage;
pub use single::SingleSlotStorage;
pub use storage::{KeyedStorage, SharedStorage, StorageKind};
pub use sync::SynchronizedStorage;
pub use type_tag::{Empty, TypeTag};

// Re-export std::any for convenience
pub use std::any::{Any, TypeId};
