//! The storage seam behind an editable compilation unit.

use crate::error::StoreError;
use crate::file_ops::{atomic_write, read_text};
use java_surgeon_core::{EditSet, TextEdit};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backing store of a compilation unit: a text buffer that may hold changes
/// not yet saved to the underlying resource.
pub trait PersistedStorage {
    /// Text of the storage buffer (unsaved changes included).
    fn current_text(&self) -> Result<String, StoreError>;

    /// True when the buffer holds no unsaved changes.
    fn is_consistent_with_memory(&self) -> bool;

    /// Replace the whole buffer text.
    fn write_text(&mut self, text: &str) -> Result<(), StoreError>;

    /// Apply one edit to the buffer text.
    fn replace(&mut self, edit: &TextEdit) -> Result<(), StoreError> {
        let current = self.current_text()?;
        let set = EditSet::new(vec![edit.clone()], current.len())
            .map_err(|e| StoreError::BadEdit(e.to_string()))?;
        self.write_text(&set.apply(&current))
    }

    /// True when the unit is open in another editor, which owns saving.
    fn is_working_copy(&self) -> bool;

    /// Flush the buffer to the underlying resource.
    fn save(&mut self) -> Result<(), StoreError>;
}

/// A source file on disk with an in-memory buffer of unsaved text.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    buffer: Option<String>,
    working_copy: bool,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        // fail early for missing files
        read_text(&path)?;
        Ok(Self {
            path,
            buffer: None,
            working_copy: false,
        })
    }

    /// Mark the file as held by another editor.
    pub fn as_working_copy(mut self) -> Self {
        self.working_copy = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistedStorage for FileStorage {
    fn current_text(&self) -> Result<String, StoreError> {
        match &self.buffer {
            Some(text) => Ok(text.clone()),
            None => read_text(&self.path),
        }
    }

    fn is_consistent_with_memory(&self) -> bool {
        self.buffer.is_none()
    }

    fn write_text(&mut self, text: &str) -> Result<(), StoreError> {
        self.buffer = Some(text.to_string());
        Ok(())
    }

    fn is_working_copy(&self) -> bool {
        self.working_copy
    }

    fn save(&mut self) -> Result<(), StoreError> {
        if let Some(text) = &self.buffer {
            atomic_write(&self.path, text.as_bytes())?;
            debug!(path = %self.path.display(), bytes = text.len(), "saved");
            self.buffer = None;
        }
        Ok(())
    }
}

/// Storage without a backing resource, for tests and scratch units.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    text: String,
    saved: String,
    working_copy: bool,
    saves: usize,
}

impl MemoryStorage {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            saved: text.clone(),
            text,
            working_copy: false,
            saves: 0,
        }
    }

    pub fn as_working_copy(mut self) -> Self {
        self.working_copy = true;
        self
    }

    /// Last saved text.
    pub fn saved_text(&self) -> &str {
        &self.saved
    }

    /// Number of `save` calls that flushed changes.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl PersistedStorage for MemoryStorage {
    fn current_text(&self) -> Result<String, StoreError> {
        Ok(self.text.clone())
    }

    fn is_consistent_with_memory(&self) -> bool {
        self.text == self.saved
    }

    fn write_text(&mut self, text: &str) -> Result<(), StoreError> {
        self.text = text.to_string();
        Ok(())
    }

    fn is_working_copy(&self) -> bool {
        self.working_copy
    }

    fn save(&mut self) -> Result<(), StoreError> {
        if self.text != self.saved {
            self.saved = self.text.clone();
            self.saves += 1;
        }
        Ok(())
    }
}
