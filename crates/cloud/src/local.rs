use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::{public_url, validate_path, ObjectStore, StorageError, StoredObject};

/// [`ObjectStore`] writing under a local directory that some HTTP server
/// exposes at `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalDiskStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        path: &str,
        overwrite: bool,
    ) -> Result<StoredObject, StorageError> {
        validate_path(path)?;
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options.open(&target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                StorageError::AlreadyExists(path.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        tracing::debug!(path, size = bytes.len(), "Stored object on local disk");
        Ok(StoredObject {
            path: path.to_string(),
            public_url: public_url(&self.public_base_url, path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path(), "http://localhost:3000/files");
        let stored = store
            .upload(b"XER".to_vec(), "schedules/1-plan.xer", true)
            .await
            .unwrap();
        assert_eq!(
            stored.public_url,
            "http://localhost:3000/files/schedules/1-plan.xer"
        );
        let written = tokio::fs::read(dir.path().join("schedules/1-plan.xer"))
            .await
            .unwrap();
        assert_eq!(written, b"XER");
    }

    #[tokio::test]
    async fn overwrite_flag_controls_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path(), "http://x");
        store.upload(b"one".to_vec(), "a.pdf", false).await.unwrap();

        let err = store.upload(b"two".to_vec(), "a.pdf", false).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        store.upload(b"three".to_vec(), "a.pdf", true).await.unwrap();
        let written = tokio::fs::read(dir.path().join("a.pdf")).await.unwrap();
        assert_eq!(written, b"three");
    }

    #[tokio::test]
    async fn rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path(), "http://x");
        let err = store.upload(vec![], "../evil", true).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }
}
