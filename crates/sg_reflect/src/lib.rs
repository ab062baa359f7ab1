//! Runtime type model for snapgraph.
//!
//! Rust has no runtime reflection, so object graphs that must survive
//! schema drift are described explicitly:
//!
//! - [`info`]: what a type looks like ([`TypeInfo`], [`TypeShape`], [`ObjectInfo`],
//!   [`MemberInfo`], [`Visibility`]).
//! - [`registry`]: the [`TypeRegistry`] mapping type paths to dense [`TypeKey`]s.
//! - [`value`]: inline [`Value`]s (primitives, strings, enums, dates, handles).
//! - [`heap`]: the [`Heap`] arena holding reference objects addressed by [`ObjRef`].
//!
//! Cycles are ordinary handle cycles inside one [`Heap`].
//!
//! [`TypeInfo`]: info::TypeInfo
//! [`TypeShape`]: info::TypeShape
//! [`ObjectInfo`]: info::ObjectInfo
//! [`MemberInfo`]: info::MemberInfo
//! [`Visibility`]: info::Visibility
//! [`TypeRegistry`]: registry::TypeRegistry
//! [`TypeKey`]: registry::TypeKey
//! [`Value`]: value::Value
//! [`Heap`]: heap::Heap
//! [`ObjRef`]: heap::ObjRef
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod heap;
pub mod info;
pub mod registry;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use heap::{Heap, ObjRef};
pub use registry::{TypeKey, TypeRegistry};
pub use value::{FromValue, Value};
