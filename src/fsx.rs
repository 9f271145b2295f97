//! A small filesystem capability scoped to a single directory.
//!
//! The tool operates on exactly two directories, the Go binary directory
//! and the SDK directory, and only ever through the operations below. The
//! trait exists so the reconciliation logic can run against an in-memory
//! double in tests.

use crate::error::{GoverError, Result};
use std::io;
use std::path::{Component, Path, PathBuf};

/// A directory entry as returned by [`DirFs::read_dir`].
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Filesystem operations relative to one rooted directory.
///
/// "Not found" is a condition callers routinely need to tolerate:
/// [`DirFs::exists`] and [`DirFs::read_link`] report it as a value, while
/// [`DirFs::remove`] surfaces it as [`io::ErrorKind::NotFound`] so callers
/// can decide whether absence matters.
pub trait DirFs: Send + Sync {
    /// Whether an entry exists at the given relative path.
    fn exists(&self, name: &str) -> Result<bool>;

    /// List the entries of the root directory.
    fn read_dir(&self) -> Result<Vec<DirEntry>>;

    /// Remove a single entry.
    fn remove(&self, name: &str) -> Result<()>;

    /// Remove an entry and everything below it.
    fn remove_all(&self, name: &str) -> Result<()>;

    /// Create a symlink named `link` pointing at `target`, both relative
    /// to the root.
    fn symlink(&self, target: &str, link: &str) -> Result<()>;

    /// Read a symlink's target, or `None` if the link does not exist.
    fn read_link(&self, name: &str) -> Result<Option<PathBuf>>;
}

/// The production [`DirFs`] backed by the OS filesystem.
pub struct OsDir {
    root: PathBuf,
}

impl OsDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a relative name against the root, refusing anything that
    /// could escape it.
    fn join(&self, name: &str) -> Result<PathBuf> {
        let path = Path::new(name);
        let escapes = path.components().any(|c| {
            !matches!(c, Component::Normal(_) | Component::CurDir)
        });
        if escapes || name.is_empty() {
            return Err(GoverError::PathEscape(name.to_string()));
        }
        Ok(self.root.join(path))
    }
}

impl DirFs for OsDir {
    fn exists(&self, name: &str) -> Result<bool> {
        match std::fs::symlink_metadata(self.join(name)?) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn read_dir(&self) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        Ok(entries)
    }

    fn remove(&self, name: &str) -> Result<()> {
        std::fs::remove_file(self.join(name)?)?;
        Ok(())
    }

    fn remove_all(&self, name: &str) -> Result<()> {
        std::fs::remove_dir_all(self.join(name)?)?;
        Ok(())
    }

    fn symlink(&self, target: &str, link: &str) -> Result<()> {
        let target = self.join(target)?;
        let link = self.join(link)?;

        #[cfg(unix)]
        std::os::unix::fs::symlink(&target, &link)?;

        #[cfg(windows)]
        std::os::windows::fs::symlink_file(&target, &link)?;

        Ok(())
    }

    fn read_link(&self, name: &str) -> Result<Option<PathBuf>> {
        match std::fs::read_link(self.join(name)?) {
            Ok(target) => Ok(Some(target)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// An in-memory [`DirFs`] that records every call it receives, for
/// asserting on the exact sequence of filesystem operations in tests.
#[cfg(test)]
pub struct MemDir {
    label: &'static str,
    files: Vec<&'static str>,
    link: Option<&'static str>,
    calls: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

#[cfg(test)]
impl MemDir {
    pub fn new(
        label: &'static str,
        files: &[&'static str],
        link: Option<&'static str>,
        calls: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    ) -> Self {
        Self {
            label,
            files: files.to_vec(),
            link,
            calls,
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[cfg(test)]
impl DirFs for MemDir {
    fn exists(&self, name: &str) -> Result<bool> {
        self.record(format!("call: {}.exists({:?})", self.label, name));
        Ok(self.files.iter().any(|f| *f == name))
    }

    fn read_dir(&self) -> Result<Vec<DirEntry>> {
        self.record(format!("call: {}.read_dir()", self.label));
        Ok(self
            .files
            .iter()
            .filter(|f| !f.contains('/'))
            .map(|f| DirEntry {
                name: f.to_string(),
                is_dir: false,
            })
            .collect())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.record(format!("call: {}.remove({:?})", self.label, name));
        Ok(())
    }

    fn remove_all(&self, name: &str) -> Result<()> {
        self.record(format!("call: {}.remove_all({:?})", self.label, name));
        Ok(())
    }

    fn symlink(&self, target: &str, link: &str) -> Result<()> {
        self.record(format!(
            "call: {}.symlink({:?}, {:?})",
            self.label, target, link
        ));
        Ok(())
    }

    fn read_link(&self, name: &str) -> Result<Option<PathBuf>> {
        self.record(format!("call: {}.read_link({:?})", self.label, name));
        Ok(self.link.map(PathBuf::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_exists_and_read_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("go1.18"), b"").unwrap();
        std::fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let dir = OsDir::new(temp_dir.path().to_path_buf());
        assert!(dir.exists("go1.18").unwrap());
        assert!(!dir.exists("go1.19").unwrap());

        let mut entries = dir.read_dir().unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "go1.18");
        assert!(!entries[0].is_dir);
        assert_eq!(entries[1].name, "sub");
        assert!(entries[1].is_dir);
    }

    #[test]
    fn test_remove_and_remove_all() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("go1.18"), b"").unwrap();
        std::fs::create_dir_all(temp_dir.path().join("go1.19/bin")).unwrap();

        let dir = OsDir::new(temp_dir.path().to_path_buf());
        dir.remove("go1.18").unwrap();
        assert!(!dir.exists("go1.18").unwrap());

        dir.remove_all("go1.19").unwrap();
        assert!(!dir.exists("go1.19").unwrap());

        let err = dir.remove("go1.18").unwrap_err();
        match err {
            GoverError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("go1.18"), b"").unwrap();

        let dir = OsDir::new(temp_dir.path().to_path_buf());
        assert_eq!(dir.read_link("go").unwrap(), None);

        dir.symlink("go1.18", "go").unwrap();
        let target = dir.read_link("go").unwrap().unwrap();
        assert_eq!(target, temp_dir.path().join("go1.18"));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let temp_dir = TempDir::new().unwrap();
        let dir = OsDir::new(temp_dir.path().to_path_buf());

        for name in ["../outside", "/etc/passwd", ""] {
            assert!(
                matches!(dir.exists(name), Err(GoverError::PathEscape(_))),
                "{name:?} should be rejected"
            );
        }
    }
}
