//! wb-store: persisted storage of an editable compilation unit.
//!
//! The AST layer edits an in-memory buffer; this crate is where that text
//! ends up. It provides the `PersistedStorage` seam, a file-backed and an
//! in-memory implementation, and the commit-listener protocol used to flush
//! the editor text into storage.

pub mod commit;
pub mod error;
pub mod file_ops;
pub mod storage;

pub use commit::{commit_changes, save_changes, Commit, CommitListener, CommitOutcome};
pub use error::StoreError;
pub use storage::{FileStorage, MemoryStorage, PersistedStorage};
