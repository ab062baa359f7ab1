use alloc::string::String;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("type `{0}` is already registered")]
    DuplicatePath(String),

    #[error("type `{ty}` names unregistered base type `{base}`")]
    UnknownBase { ty: String, base: String },

    #[error("type `{ty}` names `{base}` as base, which is not an object type")]
    BaseNotObject { ty: String, base: String },

    #[error("too many registered types")]
    Overflow,
}
