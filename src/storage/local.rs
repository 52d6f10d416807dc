// src/storage/local.rs

//! Local filesystem artifact storage.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::storage::ArtifactStore;

/// Writes artifacts into a directory, creating it on demand.
#[derive(Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &PathBuf, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for LocalStore {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let path = self.dir.join(name);
        self.write_bytes(&path, bytes).await?;
        log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path.display().to_string())
    }
}
