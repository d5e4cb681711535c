//! In-memory storage backend for testing.

use crate::BlobStorage;
use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Files are stored in a `HashMap` behind a [`RwLock`], so all trait methods
/// can operate on `&self` without external synchronisation.
pub struct MockBackend {
    name: String,
    storage: RwLock<HashMap<PathBuf, Vec<u8>>>,
}
impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation. If test setup is wrong, then test
    /// should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            map.insert(validated, data.into());
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
        }
    }

    /// Number of files currently held.
    pub async fn len(&self) -> usize {
        self.storage.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.storage.read().await.is_empty()
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &[u8]); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl BlobStorage for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.storage.read().await.contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        self.storage.read().await.get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        self.storage.write().await.insert(path, data.to_vec());
        Ok(())
    }

    async fn write_new(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        match self.storage.write().await.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(data.to_vec());
                Ok(())
            },
            Entry::Occupied(entry) => exn::bail!(ErrorKind::AlreadyExists(entry.key().clone())),
        }
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        self.storage.write().await.remove(&path).map(|_| ()).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read() {
        let backend = MockBackend::default();
        backend.write(Path::new("clip.webm"), b"hello").await.unwrap();
        assert_eq!(backend.read(Path::new("clip.webm")).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let backend = MockBackend::default();
        let err = backend.read(Path::new("missing.webm")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_store_picks_free_name() {
        let backend = MockBackend::with_files([("thumbs/clip.png", b"old".to_vec()), ("thumbs/clip_1.png", b"old".to_vec())]);
        let handle = backend.store(b"new", Path::new("thumbs/clip.png")).await.unwrap();
        assert_eq!(handle.path(), Path::new("thumbs/clip_2.png"));
        assert_eq!(backend.len().await, 3);
    }

    #[tokio::test]
    async fn test_write_new_keeps_existing() {
        let backend = MockBackend::with_files([("clip.webm", b"old".to_vec())]);
        let err = backend.write_new(Path::new("clip.webm"), b"new").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(backend.read(Path::new("clip.webm")).await.unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_concurrent_stores_get_distinct_names() {
        let backend = MockBackend::default();
        let destination = Path::new("thumbs/clip.png");
        let (a, b, c) = tokio::join!(
            backend.store(b"a", destination),
            backend.store(b"b", destination),
            backend.store(b"c", destination),
        );
        let handles = [a.unwrap(), b.unwrap(), c.unwrap()];
        for (handle, data) in handles.iter().zip([b"a", b"b", b"c"]) {
            assert_eq!(backend.read(handle.path()).await.unwrap(), data);
        }
        assert_eq!(backend.len().await, 3);
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn test_with_files_panics_on_bad_path() {
        MockBackend::with_files([("../escape", b"bad".to_vec())]);
    }
}
