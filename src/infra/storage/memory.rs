use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::ObjectStore;
use crate::error::StoreError;

/// [`ObjectStore`] that keeps blobs in memory.
///
/// Uploads whose object name starts with a registered failure prefix are
/// rejected with [`StoreError::Upload`] carrying the configured message.
#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    objects: Arc<Mutex<HashMap<(String, String), Bytes>>>,
    upload_order: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<Vec<(String, String)>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(self, name_prefix: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .push((name_prefix.to_string(), message.to_string()));
        self
    }

    pub fn get(&self, container: &str, name: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(&(container.to_string(), name.to_string()))
            .cloned()
    }

    /// Names of successfully written objects, in write order.
    pub fn uploaded_names(&self) -> Vec<String> {
        self.upload_order.lock().unwrap().clone()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload_blob(
        &self,
        container: &str,
        name: &str,
        content: Bytes,
        overwrite: bool,
    ) -> Result<(), StoreError> {
        let failure = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix.as_str()))
            .map(|(_, message)| message.clone());
        if let Some(message) = failure {
            return Err(StoreError::Upload {
                container: container.to_string(),
                name: name.to_string(),
                message,
            });
        }

        let key = (container.to_string(), name.to_string());
        let mut objects = self.objects.lock().unwrap();
        if !overwrite && objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        objects.insert(key, content);
        self.upload_order.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_and_overwrite() {
        let store = InMemoryObjectStore::new();

        store
            .upload_blob("raw", "a.json", Bytes::from_static(b"1"), true)
            .await
            .unwrap();
        store
            .upload_blob("raw", "a.json", Bytes::from_static(b"2"), true)
            .await
            .unwrap();

        assert_eq!(store.get("raw", "a.json").unwrap(), Bytes::from_static(b"2"));
        assert_eq!(store.object_count(), 1);
        assert_eq!(store.uploaded_names(), vec!["a.json", "a.json"]);
    }

    #[tokio::test]
    async fn test_upload_without_overwrite_keeps_existing() {
        let store = InMemoryObjectStore::new();
        store
            .upload_blob("raw", "a.json", Bytes::from_static(b"1"), false)
            .await
            .unwrap();

        let err = store
            .upload_blob("raw", "a.json", Bytes::from_static(b"2"), false)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        assert_eq!(store.get("raw", "a.json").unwrap(), Bytes::from_static(b"1"));
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let store = InMemoryObjectStore::new().with_failure("carts_", "quota exceeded");

        let err = store
            .upload_blob("raw", "carts_2025-01-01_000000.json", Bytes::new(), true)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(store.object_count(), 0);
    }
}
