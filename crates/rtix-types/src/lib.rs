#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Runtime type information.
//!
//! A [`Universe`] interns every type a program mentions as a [`Descriptor`]
//! addressed by [`TypeId`]. Types are built from compiler-emitted recipes
//! ([`Universe::parse`]), compared with [`Universe::is_subtype`], and checked
//! against runtime [`Value`]s through per-type [`Predicate`]s.

pub mod config;
pub mod descriptor;
mod display;
pub mod error;
mod invariants;
pub mod predicate;
mod recipe;
pub mod rules;
mod substitute;
mod subtype;
pub mod universe;
pub mod value;

#[cfg(test)]
mod display_tests;
#[cfg(test)]
mod rules_tests;

pub use config::UniverseConfig;
pub use descriptor::{Descriptor, FunctionParams, NamedParam, TypeId, TypeKind, Variance};
pub use error::{InternalError, RulesError, TypeError};
pub use predicate::Predicate;
pub use rules::{InterfaceRule, RuleEntry, TypeRules};
pub use universe::{CoreTypes, Universe, names};
pub use value::{ClosureValue, ListValue, ObjectValue, RecordValue, Value};
