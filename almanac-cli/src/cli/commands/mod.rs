//! Command handlers

mod dereference;
mod describe;
mod export;
mod order;

pub use dereference::{DereferenceArgs, handle_dereference_command};
pub use describe::handle_describe_command;
pub use export::{ExportArgs, handle_export_command};
pub use order::{OrderArgs, handle_order_command};
