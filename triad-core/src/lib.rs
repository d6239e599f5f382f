//! # Triad Core
//!
//! Core types and the in-memory index for the Triad triple store.
//!
//! This crate provides:
//! - The term model: [`Resource`], [`Variable`], generic [`Term`],
//!   [`Triple`], [`TriplePattern`] and ordered [`VarMap`]s
//! - [`Dictionary`]: dense dictionary encoding of resources
//! - Pattern utilities: matching, binding, substitution, merging
//! - [`RdfIndex`]: the linked triple table with pattern evaluation
//! - The restartable [`Cursor`] protocol shared by scans and joins
//!
//! ## Design principles
//!
//! 1. **Single-threaded**: the store is exclusively owned by its driver;
//!    scans take shared borrows, so mutation while reading cannot compile
//! 2. **Append-only**: rows and dictionary entries are immortal, indices
//!    grow monotonically, duplicate inserts are no-ops
//! 3. **Contract violations are bugs**: preconditions are `debug_assert`s,
//!    not runtime errors

pub mod cursor;
pub mod dict;
pub mod index;
pub mod pattern;
pub mod term;

pub use cursor::Cursor;
pub use dict::Dictionary;
pub use index::{FullScan, IndexChoice, LinkKind, PatternScan, RdfIndex, TableOffset, TABLE_END};
pub use term::{
    Code, CodedTerm, CodedTriple, CodedTriplePattern, CodedVarMap, Resource, Shape, Term, Triple,
    TriplePattern, VarMap, Variable,
};
