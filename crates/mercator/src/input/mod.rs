//! Raw input records and generation context.

mod context;
mod source;

pub use context::ContextHints;
pub use source::{DataTable, RawRow};
