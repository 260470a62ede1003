//! dp_core — typed relation/column store, verticals, and the option system.
//!
//! This crate is the shared, read-only data model used by `dp_algo`: the
//! `Relation`/`Column` typed store (§3, §4.1) and the `Vertical` bitset
//! type, plus the generic `OptionsRegistry` (§4.1) that every
//! `Primitive` builds on.

#![forbid(unsafe_code)]

pub mod bitset;
pub mod errors;
pub mod options;
pub mod relation;
pub mod vertical;

pub use bitset::BitSet;
pub use errors::CoreError;
pub use options::{OptionPhase, OptionSpec, OptionValue, OptionsRegistry};
pub use relation::{Column, DataType, Relation, TypedValue};
pub use vertical::Vertical;
