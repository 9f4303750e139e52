//! Dereferencing of the almanac's normalized tables
//!
//! This module turns the referenced tables (records pointing at each other by
//! integer id) into fully nested records, resolving tables in dependency
//! order according to per-table plans.

pub mod error;
pub mod graph;
pub mod lookup;
pub mod transform;
pub mod types;
mod engine;

pub use engine::{Dereferencer, TableState};
pub use error::{DereferenceError, DereferenceResult};
pub use graph::DependencyGraph;
pub use types::*;
