//! Core types for dereferencing

mod plan;
mod table;

pub use plan::*;
pub use table::*;
