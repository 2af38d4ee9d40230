//! Blob storage.
//!
//! [`ObjectStore`] writes named byte blobs into a container. [`S3ObjectStore`]
//! talks to S3 (or any S3-compatible service) and is built from a
//! [`StorageConnection`] string; [`InMemoryObjectStore`] keeps blobs in memory.

mod connection;
mod memory;
mod s3;

pub use connection::{StaticCredentials, StorageConnection};
pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

use crate::error::StoreError;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `content` to `container/name`. With `overwrite == false` an
    /// existing object is left untouched and [`StoreError::AlreadyExists`] is returned.
    async fn upload_blob(
        &self,
        container: &str,
        name: &str,
        content: Bytes,
        overwrite: bool,
    ) -> Result<(), StoreError>;
}
