//! Storage backends behind a small file API.
//!
//! Paths are slash separated and rooted at the storage device, e.g.
//! `/rpg/save1.dat`.

use crate::{DescentError, DescentResult};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// The storage collaborator.
pub trait Storage {
    fn exists(&self, path: &str) -> bool;

    /// Deletes a file. Removing a missing file is not an error.
    fn remove(&mut self, path: &str) -> DescentResult<()>;

    /// Creates a directory and its parents.
    fn mkdir(&mut self, path: &str) -> DescentResult<()>;

    fn read_to_string(&self, path: &str) -> DescentResult<String>;

    /// Creates or truncates a file and writes `contents`.
    fn write(&mut self, path: &str, contents: &str) -> DescentResult<()>;

    /// Moves `from` onto `to`, replacing any file already at `to`.
    fn rename(&mut self, from: &str, to: &str) -> DescentResult<()>;
}

/// Storage on the host filesystem, rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Storage for FsStorage {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn remove(&mut self, path: &str) -> DescentResult<()> {
        match fs::remove_file(self.resolve(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn mkdir(&mut self, path: &str) -> DescentResult<()> {
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn read_to_string(&self, path: &str) -> DescentResult<String> {
        Ok(fs::read_to_string(self.resolve(path))?)
    }

    fn write(&mut self, path: &str, contents: &str) -> DescentResult<()> {
        let target = self.resolve(path);
        debug!("writing {} bytes to {}", contents.len(), target.display());
        fs::write(target, contents)?;
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str) -> DescentResult<()> {
        fs::rename(self.resolve(from), self.resolve(to))?;
        Ok(())
    }
}

/// In-memory storage for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: BTreeMap<String, String>,
    dirs: BTreeSet<String>,
    /// When set, every write fails
    pub read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses every change.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    fn normalize(path: &str) -> String {
        format!("/{}", path.trim_matches('/'))
    }

    fn parent_exists(&self, path: &str) -> bool {
        match path.rsplit_once('/') {
            Some(("", _)) | None => true,
            Some((parent, _)) => self.dirs.contains(parent),
        }
    }

    /// Paths of all stored files.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &str) -> bool {
        let path = Self::normalize(path);
        self.files.contains_key(&path) || self.dirs.contains(&path)
    }

    fn remove(&mut self, path: &str) -> DescentResult<()> {
        if self.read_only {
            return Err(DescentError::Storage("storage is read-only".to_string()));
        }
        self.files.remove(&Self::normalize(path));
        Ok(())
    }

    fn mkdir(&mut self, path: &str) -> DescentResult<()> {
        if self.read_only {
            return Err(DescentError::Storage("storage is read-only".to_string()));
        }
        let path = Self::normalize(path);
        let mut current = String::new();
        for part in path.split('/').filter(|part| !part.is_empty()) {
            current.push('/');
            current.push_str(part);
            self.dirs.insert(current.clone());
        }
        Ok(())
    }

    fn read_to_string(&self, path: &str) -> DescentResult<String> {
        self.files
            .get(&Self::normalize(path))
            .cloned()
            .ok_or_else(|| DescentError::Storage(format!("{} not found", path)))
    }

    fn write(&mut self, path: &str, contents: &str) -> DescentResult<()> {
        if self.read_only {
            return Err(DescentError::Storage("storage is read-only".to_string()));
        }
        let path = Self::normalize(path);
        if !self.parent_exists(&path) {
            return Err(DescentError::Storage(format!("no directory for {}", path)));
        }
        self.files.insert(path, contents.to_string());
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str) -> DescentResult<()> {
        if self.read_only {
            return Err(DescentError::Storage("storage is read-only".to_string()));
        }
        let contents = self
            .files
            .remove(&Self::normalize(from))
            .ok_or_else(|| DescentError::Storage(format!("{} not found", from)))?;
        self.files.insert(Self::normalize(to), contents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_needs_directory() {
        let mut storage = MemoryStorage::new();
        assert!(storage.write("/rpg/a.dat", "x").is_err());
        storage.mkdir("/rpg").unwrap();
        storage.write("/rpg/a.dat", "x").unwrap();
        assert!(storage.exists("/rpg/a.dat"));
        assert_eq!(storage.read_to_string("rpg/a.dat").unwrap(), "x");
        storage.remove("/rpg/a.dat").unwrap();
        storage.remove("/rpg/a.dat").unwrap();
        assert!(!storage.exists("/rpg/a.dat"));
    }

    #[test]
    fn test_rename_replaces_target() {
        let mut storage = MemoryStorage::new();
        storage.mkdir("/rpg").unwrap();
        storage.write("/rpg/save1.dat", "old").unwrap();
        storage.write("/rpg/save1.tmp", "new").unwrap();
        storage.rename("/rpg/save1.tmp", "/rpg/save1.dat").unwrap();
        assert_eq!(storage.read_to_string("/rpg/save1.dat").unwrap(), "new");
        assert!(!storage.exists("/rpg/save1.tmp"));
        assert!(storage.rename("/rpg/missing", "/rpg/x").is_err());
    }

    #[test]
    fn test_read_only_refuses_changes() {
        let mut storage = MemoryStorage::read_only();
        assert!(storage.mkdir("/rpg").is_err());
        assert!(storage.write("/a.dat", "x").is_err());
    }

    #[test]
    fn test_fs_storage_is_rooted() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FsStorage::new(dir.path());
        storage.mkdir("/rpg").unwrap();
        storage.write("/rpg/save1.dat", "[PLAYER]\n").unwrap();
        assert!(dir.path().join("rpg/save1.dat").exists());
        assert!(storage.exists("/rpg/save1.dat"));
        storage.write("/rpg/save1.tmp", "[FLAGS]\n").unwrap();
        storage.rename("/rpg/save1.tmp", "/rpg/save1.dat").unwrap();
        assert_eq!(storage.read_to_string("/rpg/save1.dat").unwrap(), "[FLAGS]\n");
        storage.remove("/rpg/save1.dat").unwrap();
        storage.remove("/rpg/save1.dat").unwrap();
        assert!(!storage.exists("/rpg/save1.dat"));
    }
}
