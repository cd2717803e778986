#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the rtix crates.
//!
//! - [`Interner`]: deduplicates interface names into cheap [`Symbol`] handles
//! - [`Colors`]: ANSI palette for terminal rendering of types

mod colors;
mod interner;

#[cfg(test)]
mod interner_tests;

pub use colors::Colors;
pub use interner::{Interner, Symbol};
