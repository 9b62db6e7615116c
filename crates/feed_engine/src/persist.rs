use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cache directory missing or not writable: {0}")]
    CacheDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the directory exists; create if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::CacheDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::CacheDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::CacheDir(e.to_string()))?;
    }
    Ok(())
}

/// Replaces one file by writing a sibling temp file and renaming it over the target.
///
/// Readers see either the old content or the new one, never a truncated file.
pub struct AtomicFileWriter {
    target: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(target: PathBuf) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn write(&self, content: &str) -> Result<(), PersistError> {
        let dir = match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        ensure_dir(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&self.target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::AtomicFileWriter;
    use tempfile::TempDir;

    #[test]
    fn creates_missing_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested").join("list.txt");
        AtomicFileWriter::new(target.clone()).write("a").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "a");
    }

    #[test]
    fn replaces_existing_content_without_leftovers() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("list.txt");
        let writer = AtomicFileWriter::new(target.clone());

        writer.write("hello").unwrap();
        writer.write("world").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "world");
        let entries = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn parent_that_is_a_file_fails() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();

        let result = AtomicFileWriter::new(blocker.join("list.txt")).write("data");
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
    }
}
