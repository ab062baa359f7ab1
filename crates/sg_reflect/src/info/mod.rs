//! Provide runtime type information.
//!
//! ## Menu
//!
//! - [`TypeInfo`]: one registered type: its path, [`Visibility`] and [`TypeShape`].
//!
//! - [`TypeShape`]: the closed set of shapes the serializer understands, the inner is one of:
//!     - [`ObjectInfo`]: a class-like type with ordered members and an optional base type.
//!     - [`PrimitiveKind`]: a fixed-width scalar stored inline.
//!     - [`EnumInfo`]: named integer constants over an underlying primitive.
//!     - `String`, `DateTime`, `DateTimeOffset`, `TimeSpan`, `TimeZone`, `Version`, `Type`.
//!     - `Array`, `List`, `Map`, `Set`: containers, element types referenced by path.
//!
//! - [`TypeKind`]: a fieldless discriminator of [`TypeShape`], also used as the wire tag.
//!
//! - [`MemberInfo`]: a field or property of an [`ObjectInfo`].
//!
//! - [`Visibility`]: the public/private/protected data attribute of types and members.

// -----------------------------------------------------------------------------
// Modules

mod enum_info;
mod member_info;
mod object_info;
mod primitive;
mod type_info;
mod visibility;

// -----------------------------------------------------------------------------
// Exports

pub use enum_info::EnumInfo;
pub use member_info::{MemberInfo, MemberKind};
pub use object_info::ObjectInfo;
pub use primitive::PrimitiveKind;
pub use type_info::{TypeInfo, TypeKind, TypeKindError, TypeShape};
pub use visibility::Visibility;

pub(crate) use type_info::short_name;
