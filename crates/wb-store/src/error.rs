use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    // File system errors
    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    MkdirError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Atomic rename failed for {path}: {source}")]
    RenameError {
        path: PathBuf,
        source: std::io::Error,
    },

    // Buffer errors
    #[error("Edit does not fit the stored text: {0}")]
    BadEdit(String),

    // Protocol errors
    #[error("Commit listener refused to edit the base file")]
    Rejected,
}
