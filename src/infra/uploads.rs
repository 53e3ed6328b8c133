//! Filesystem storage for post images.

use std::path::{Component, Path, PathBuf};

use slug::slugify;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UploadStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error("uploaded file is empty")]
    EmptyPayload,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Stores image payloads under a configured root directory.
///
/// Stored paths are relative (`<uuid-prefix>/<uuid>-<name>.<ext>`) so the
/// root can be relocated without rewriting rows.
#[derive(Debug)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    /// Initialise storage rooted at the provided directory, creating it if
    /// necessary.
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Persist the payload and return its relative stored path.
    pub async fn store(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, UploadStorageError> {
        if bytes.is_empty() {
            return Err(UploadStorageError::EmptyPayload);
        }

        let stored_path = build_stored_path(original_name);
        let absolute = self.resolve(&stored_path)?;

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&absolute, bytes).await?;

        Ok(stored_path)
    }

    /// Resolve a stored relative path against the root, rejecting anything
    /// that would escape it.
    pub fn resolve(&self, stored_path: &str) -> Result<PathBuf, UploadStorageError> {
        let relative = Path::new(stored_path);
        let safe = relative
            .components()
            .all(|part| matches!(part, Component::Normal(_)));
        if !safe || relative.as_os_str().is_empty() {
            return Err(UploadStorageError::InvalidPath);
        }
        Ok(self.root.join(relative))
    }
}

fn build_stored_path(original_name: &str) -> String {
    let id = Uuid::new_v4();
    let path = Path::new(original_name);

    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .map(slugify)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "upload".to_string());

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase());

    let prefix = &id.simple().to_string()[..2];
    match extension {
        Some(ext) => format!("{prefix}/{id}-{stem}.{ext}"),
        None => format!("{prefix}/{id}-{stem}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_payload_under_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");

        let stored = storage
            .store("Holiday Photo.PNG", b"not-really-a-png")
            .await
            .expect("stored");

        assert!(stored.ends_with("-holiday-photo.png"), "{stored}");
        let absolute = storage.resolve(&stored).expect("resolved");
        let written = std::fs::read(absolute).expect("read back");
        assert_eq!(written, b"not-really-a-png");
    }

    #[tokio::test]
    async fn rejects_empty_payload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");

        let err = storage.store("a.png", b"").await.expect_err("empty payload");
        assert!(matches!(err, UploadStorageError::EmptyPayload));
    }

    #[test]
    fn resolve_rejects_traversal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");

        for bad in ["../outside.png", "/etc/passwd", "a/../../b.png", ""] {
            assert!(
                matches!(storage.resolve(bad), Err(UploadStorageError::InvalidPath)),
                "{bad} should be rejected"
            );
        }
    }
}
