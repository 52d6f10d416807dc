// src/storage/mod.rs

//! Artifact storage backends.
//!
//! One run produces one CSV artifact; a backend stores it and reports where
//! it ended up. The S3 backend is feature-gated and falls back to local
//! storage at the pipeline level when the upload fails.

pub mod local;

#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;

pub use local::LocalStore;

#[cfg(feature = "s3")]
pub use s3::S3Store;

/// Destination for the run's CSV artifact.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store the artifact bytes under the given file name; returns a
    /// human-readable locator (path or URI) for the run summary.
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<String>;
}
