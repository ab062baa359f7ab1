//! Provide the [`TypeRegistry`], the central store of runtime type information.

// -----------------------------------------------------------------------------
// Modules

mod error;
mod type_key;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use error::RegistryError;
pub use type_key::TypeKey;
pub use type_registry::{TypeEntry, TypeRegistry};
