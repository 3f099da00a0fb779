use std::path::{Path, PathBuf};

use thiserror::Error as ThisError;
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error("Empty upload")]
    Empty,
    #[error("Upload of {size} bytes exceeds the limit of {max}")]
    TooLarge { size: usize, max: usize },
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    #[error("No such object: {0}")]
    NotFound(String),
    #[error("Storage I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Which area of the site an upload belongs to. Determines the
/// path prefix of the stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Members,
    Obituaries,
    Posts,
    Forms,
    Board,
}

impl MediaKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            MediaKind::Members => "members",
            MediaKind::Obituaries => "obituaries",
            MediaKind::Posts => "posts",
            MediaKind::Forms => "forms",
            MediaKind::Board => "board",
        }
    }
}

/// File-backed store for uploaded images and documents. Objects
/// are named `<timestamp>_<original name>` under their kind's
/// prefix; the returned relative path is what gets persisted as
/// the image / file URL.
#[derive(Debug, Clone)]
pub struct MediaStore {
    base_dir: PathBuf,
    max_size: usize,
}

const KINDS: [MediaKind; 5] = [
    MediaKind::Members,
    MediaKind::Obituaries,
    MediaKind::Posts,
    MediaKind::Forms,
    MediaKind::Board,
];

impl MediaStore {
    /// Open the store, creating the base directory and the
    /// per-kind prefixes if needed.
    pub async fn open(base_dir: PathBuf, max_size: usize) -> Result<Self, StorageError> {
        for kind in KINDS {
            fs::create_dir_all(base_dir.join(kind.prefix())).await?;
        }
        Ok(Self { base_dir, max_size })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Store an upload and return its public path.
    pub async fn store(
        &self,
        kind: MediaKind,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, StorageError> {
        if data.is_empty() {
            return Err(StorageError::Empty);
        }
        if data.len() > self.max_size {
            return Err(StorageError::TooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let name = sanitize_name(original_name)?;
        let stamp = chrono::Utc::now().timestamp_millis();
        let public_path = format!("{}/{}_{}", kind.prefix(), stamp, name);
        fs::write(self.base_dir.join(&public_path), data).await?;

        debug!(path = %public_path, size = data.len(), "stored object");
        Ok(public_path)
    }

    /// Read an object back by its public path.
    pub async fn fetch(&self, public_path: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(public_path)?;
        if !path.exists() {
            return Err(StorageError::NotFound(public_path.to_string()));
        }
        Ok(fs::read(&path).await?)
    }

    pub fn exists(&self, public_path: &str) -> bool {
        self.resolve(public_path)
            .map(|p| p.exists())
            .unwrap_or(false)
    }

    /// Delete an object. An already absent object logs a warning
    /// instead of failing, so record deletion never gets stuck on
    /// a missing image.
    pub async fn delete(&self, public_path: &str) -> Result<(), StorageError> {
        let path = self.resolve(public_path)?;
        if !path.exists() {
            warn!(path = %public_path, "object already absent");
            return Ok(());
        }
        fs::remove_file(&path).await?;
        debug!(path = %public_path, "deleted object");
        Ok(())
    }

    // Public paths come back out of the database; refuse anything
    // that would escape the base directory.
    fn resolve(&self, public_path: &str) -> Result<PathBuf, StorageError> {
        let mut parts = public_path.splitn(2, '/');
        let prefix = parts.next().unwrap_or("");
        let name = parts.next().unwrap_or("");
        let valid_prefix = KINDS.iter().any(|k| k.prefix() == prefix);
        if !valid_prefix || name.is_empty() || name.contains('/') || name.contains("..") {
            return Err(StorageError::InvalidName(public_path.to_string()));
        }
        Ok(self.base_dir.join(prefix).join(name))
    }
}

fn sanitize_name(original: &str) -> Result<String, StorageError> {
    let name: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let name = name.trim_start_matches('.').to_string();
    if name.is_empty() {
        return Err(StorageError::InvalidName(original.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (MediaStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::open(dir.path().to_path_buf(), 1024)
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_store_and_fetch() {
        let (store, _dir) = test_store().await;
        let path = store
            .store(MediaKind::Obituaries, "portrait.jpg", b"jpeg-bytes")
            .await
            .unwrap();
        assert!(path.starts_with("obituaries/"));
        assert!(path.ends_with("_portrait.jpg"));

        let data = store.fetch(&path).await.unwrap();
        assert_eq!(data, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let (store, _dir) = test_store().await;
        let path = store
            .store(MediaKind::Forms, "bylaws.pdf", b"pdf")
            .await
            .unwrap();

        store.delete(&path).await.unwrap();
        assert!(!store.exists(&path));
        // Second delete warns but does not fail
        store.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized() {
        let (store, _dir) = test_store().await;
        assert!(store.store(MediaKind::Posts, "x.png", b"").await.is_err());
        let big = vec![0u8; 2048];
        assert!(store.store(MediaKind::Posts, "x.png", &big).await.is_err());
    }

    #[tokio::test]
    async fn test_sanitizes_names() {
        let (store, _dir) = test_store().await;
        let path = store
            .store(MediaKind::Members, "../etc/passwd", b"data")
            .await
            .unwrap();
        assert!(path.starts_with("members/"));
        assert!(!path.contains(".."));
        assert!(!path[8..].contains('/'));
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let (store, _dir) = test_store().await;
        assert!(store.fetch("members/../../etc/passwd").await.is_err());
        assert!(store.fetch("outside/object").await.is_err());
    }
}
