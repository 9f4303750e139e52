//! Reading referenced tables and writing dereferenced output

pub mod export;
pub mod read;
pub mod write;

pub use export::export_records;
pub use read::{read_about, read_records};
pub use write::{Document, OutputError, write_document, write_records};
