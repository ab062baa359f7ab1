use alloc::string::String;

use thiserror::Error;

use crate::heap::ObjRef;
use crate::registry::TypeKey;

// -----------------------------------------------------------------------------
// Error

/// An error returned by [`Heap`](crate::heap::Heap) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HeapError {
    #[error("object handle {0} is not allocated")]
    InvalidRef(ObjRef),

    #[error("type {0} is not registered")]
    UnknownType(TypeKey),

    #[error("type `{0}` is not an object type")]
    NotAnObject(String),

    #[error("type `{0}` has no accessible constructor")]
    MissingConstructor(String),

    #[error("type `{ty}` has no member `{name}`")]
    NoSuchMember { ty: String, name: String },

    #[error("expected {expected} data, found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("too many objects in one heap")]
    Overflow,
}
