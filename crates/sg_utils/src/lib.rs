//! Small shared utilities for the snapgraph crates.
//!
//! - [`hash`]: fixed-seed hash containers built on *hashbrown* and *foldhash*.
//! - [`collections`]: insertion-ordered [`OrderedMap`] and [`OrderedSet`].
//!
//! [`OrderedMap`]: collections::OrderedMap
//! [`OrderedSet`]: collections::OrderedSet
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod collections;
pub mod hash;
