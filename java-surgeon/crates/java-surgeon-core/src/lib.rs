//! java-surgeon-core: source text bookkeeping for AST-level code editing.
//!
//! This crate knows nothing about Java semantics. It keeps the source buffer
//! and its edit log, scans text for whitespace / comment boundaries, infers
//! formatting and validates parse trees. The AST layer lives in `wb-ast`.

pub mod buffer;
pub mod edit;
pub mod format;
pub mod scan;
pub mod validate;

pub use buffer::{BufferError, SourceBuffer};
pub use edit::{difference_interval, EditConflict, EditSet, TextEdit};
