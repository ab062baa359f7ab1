//! Binary persistence and deep cloning of cyclic object graphs.
//!
//! A [`Serializer`] walks a graph held in a [`Heap`], groups every object by
//! runtime type into a [`TypeRepo`], and writes one [`TypeSchema`] plus one
//! data section per type. Loading reverses this while tolerating drift
//! between the stored schemas and the live [`TypeRegistry`]: members are
//! matched by name and declared type, removed or unconstructible types
//! degrade to `null`, and members that no longer match are skipped.
//!
//! ```
//! use sg_reflect::info::{MemberInfo, ObjectInfo, TypeInfo};
//! use sg_reflect::{Heap, TypeRegistry, Value};
//! use sg_serial::Serializer;
//!
//! let mut registry = TypeRegistry::new();
//! let circular = registry
//!     .register(TypeInfo::object(
//!         "app::Circular",
//!         ObjectInfo::new().with_member(MemberInfo::field("this", "app::Circular")),
//!     ))
//!     .unwrap();
//!
//! let mut heap = Heap::new();
//! let a = heap.new_object(&registry, circular).unwrap();
//! heap.set_member(&registry, a, "this", Value::Ref(a)).unwrap();
//!
//! let mut serializer = Serializer::new(&registry);
//! let copy = serializer.clone(&mut heap, &Value::Ref(a)).unwrap();
//! let copy = copy.as_obj().unwrap();
//!
//! assert_ne!(copy, a);
//! assert_eq!(heap.member(&registry, copy, "this"), Ok(Value::Ref(copy)));
//! ```
//!
//! [`Heap`]: sg_reflect::Heap
//! [`TypeRegistry`]: sg_reflect::TypeRegistry
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod options;
mod wire;

pub mod envelope;
pub mod file;
pub mod header;
pub mod repo;
pub mod schema;
pub mod serializer;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::{Error, Result};
pub use file::SerializerFile;
pub use header::Header;
pub use options::SerializerOptions;
pub use repo::{RepoCreator, RepoCreators, Shape, TypeRepo};
pub use schema::{MemberSchema, SchemaFlags, TypeSchema};
pub use serializer::Serializer;
