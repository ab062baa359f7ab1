use alloc::string::String;
use std::io;

use sg_reflect::heap::HeapError;
use sg_reflect::registry::RegistryError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// An error raised while saving, loading or cloning a graph.
///
/// Structural errors (`Io`, `BadMagic`, `UnsupportedVersion`, `Base64`,
/// `Decompress`, `InvalidTypeIndex`, ...) abort the operation. The kinds
/// describing one type or member (`UnknownType`, `NotPublicNotPrivate`,
/// `MissingConstructor`, `TypeChanged`) are logged and degrade that type
/// or member only.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("stream does not start with the snapgraph magic bytes")]
    BadMagic,

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid gzip data: {0}")]
    Decompress(#[source] io::Error),

    #[error("type `{0}` is not registered, its objects load as null")]
    UnknownType(String),

    #[error("type `{0}` is marked neither public nor private data")]
    NotPublicNotPrivate(String),

    #[error("type `{0}` has no accessible constructor, its objects load as null")]
    MissingConstructor(String),

    #[error("member `{member}` was stored as `{stored}` but is now `{live}`")]
    TypeChanged {
        member: String,
        stored: String,
        live: String,
    },

    #[error("no encoding rule for primitive value `{0}`")]
    UnhandledPrimitiveType(String),

    #[error("values of type `{0}` are assigned, not cloned")]
    NotCloneable(String),

    #[error("a `{found}` cannot be stored where `{declared}` is declared")]
    TypeMismatch { declared: String, found: String },

    #[error("a graph may reference at most {0} distinct types")]
    TooManyTypes(usize),

    #[error("type index {0} is out of range")]
    InvalidTypeIndex(u16),

    #[error("object index {index} is out of range for type `{ty}`")]
    InvalidObjectIndex { ty: String, index: u32 },

    #[error("the load session owning this lazy member is gone")]
    NoActiveSession,

    #[error("lazy member `{0}` is not resolved yet")]
    Deferred(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Heap(#[from] HeapError),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
