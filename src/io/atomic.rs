use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Filesystem writes the task store performs.
///
/// The store only ever replaces or removes whole task files, so that is the
/// entire surface. Tests swap in failing implementations to check that a
/// failed write leaves the store untouched.
pub trait Persist: Send + Sync {
    /// Replace `path` with `content` so readers see the old or the new file, never a mix
    fn write_atomic(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Real filesystem: temp file + fsync + rename
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomicFs;

impl Persist for AtomicFs {
    fn write_atomic(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        atomic_write(path, content)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Write `content` to `path` atomically using a sibling temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_and_replaces() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("T-001.md");

        atomic_write(&path, b"first").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");

        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        atomic_write(&tmp.path().join("T-001.md"), b"x").unwrap();
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("T-001.md")]);
    }

    #[test]
    fn test_atomic_write_into_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("T-001.md");
        assert!(atomic_write(&path, b"x").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_atomic_fs_remove() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("T-001.md");
        AtomicFs.write_atomic(&path, b"x").unwrap();
        AtomicFs.remove(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(
            AtomicFs.remove(&path).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
