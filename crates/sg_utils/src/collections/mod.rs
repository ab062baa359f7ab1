//! Insertion-ordered hash containers.

// -----------------------------------------------------------------------------
// Modules

mod ordered_map;
mod ordered_set;

// -----------------------------------------------------------------------------
// Exports

pub use ordered_map::OrderedMap;
pub use ordered_set::OrderedSet;
