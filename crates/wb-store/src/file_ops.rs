use crate::error::StoreError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write content to a file atomically using write-to-temp-then-rename.
/// The temp file is created in the same directory as the target so the
/// rename stays on one filesystem.
pub fn atomic_write(target: &Path, content: &[u8]) -> Result<(), StoreError> {
    let parent = target.parent().ok_or_else(|| StoreError::WriteError {
        path: target.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent directory"),
    })?;

    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent).map_err(|e| StoreError::MkdirError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| StoreError::WriteError {
        path: target.to_path_buf(),
        source: e,
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| StoreError::WriteError {
            path: target.to_path_buf(),
            source: e,
        })?;

    // Sync to disk before rename
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| StoreError::WriteError {
            path: target.to_path_buf(),
            source: e,
        })?;

    temp_file.persist(target).map_err(|e| StoreError::RenameError {
        path: target.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

/// Read a UTF-8 source file.
pub fn read_text(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|e| StoreError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Test.java");
        atomic_write(&target, b"class Test {}").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "class Test {}");
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Test.java");
        fs::write(&target, "class Test {}").unwrap();
        atomic_write(&target, b"class Test { int a; }").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "class Test { int a; }");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("src").join("test").join("Test.java");
        atomic_write(&target, b"package test;").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "package test;");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Test.java");
        atomic_write(&target, b"a").unwrap();
        atomic_write(&target, b"b").unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_text_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(&dir.path().join("Missing.java")).unwrap_err();
        assert!(matches!(err, StoreError::ReadError { .. }));
    }
}
