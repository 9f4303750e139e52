// Services layer
//
// Operations built on the dereferencing engine and the io layer, shared by
// the CLI commands.

pub mod describe;
pub mod pipeline;

pub use describe::populate_descriptions;
pub use pipeline::{build_document, dereference_table, load_tables, required_tables};
