//! # Rgstry
//!
//! Typed metadata registries for classes and methods.
//!
//! A registry attaches arbitrary, caller-shaped metadata to classes (Rust
//! types) and their methods at definition time and retrieves it later from
//! the class, an instance, or the method. Multiple independent registries
//! coexist, each with its own ID and merge policy, so frameworks can layer
//! declarative annotations (authorization roles, routing info, validation
//! rules) without agreeing on a shared schema.
//!
//! ## Components
//!
//! - [`RegistryStore`] - process-wide table owning all registry records
//! - [`MetadataFactory`] (alias [`Rgstry`]) - creates registries and hands
//!   out bound operation sets
//! - [`RegistryHandle`] - attach/read/has operations closed over one
//!   registry ID
//! - [`ReflectionProvider`] - optional external facility supplying parameter
//!   and return type descriptors, surfaced through [`Reflector`]
//!
//! ## Example
//!
//! ```
//! use rgstry::{RegistryConfig, Rgstry};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct AuthMeta {
//!     role: &'static str,
//! }
//!
//! struct AdminController;
//!
//! # fn main() -> Result<(), rgstry::RegistryError> {
//! let auth = Rgstry::create::<AuthMeta, AuthMeta>(RegistryConfig::new().merged())?;
//!
//! auth.attach_class::<AdminController>(AuthMeta { role: "admin" })?;
//!
//! assert_eq!(
//!     auth.class_metadata::<AdminController>()?,
//!     vec![AuthMeta { role: "admin" }],
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod reflect;
pub mod registry;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use key::ClassKey;
pub use reflect::{ReflectedClass, ReflectedMethod, ReflectionProvider, Reflector, TypeDescriptor};
pub use registry::{MetadataFactory, RegistryHandle};
pub use store::{ClassEntry, MethodEntry, RegistryRecord, RegistryStore};

/// Short alias for [`MetadataFactory`], the crate's entry point.
pub use registry::MetadataFactory as Rgstry;
