//! Fetch-and-upload pipeline.
//!
//! Every source in the registry is fetched, re-serialized as pretty JSON and
//! written to the object store under a timestamped name, one after another.
//! A failing source is recorded in the [`RunResult`] and never stops the
//! remaining sources from being processed.

mod naming;
mod result;

pub use naming::object_name;
pub use result::{RunResult, SourceOutcome};

use bytes::Bytes;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info};

use crate::clock::{Clock, SystemClock};
use crate::error::SourceError;
use crate::fetch::{HttpClient, fetch_json};
use crate::infra::storage::ObjectStore;
use crate::registry::{Endpoint, EndpointRegistry};
use naming::StampSequence;

/// The pipeline with all of its collaborators. Built once at startup and
/// shared by every trigger.
pub struct Pipeline {
    registry: EndpointRegistry,
    http: Arc<dyn HttpClient>,
    store: Arc<dyn ObjectStore>,
    container: String,
    clock: Arc<dyn Clock>,
    stamps: StampSequence,
}

impl Pipeline {
    pub fn new(
        registry: EndpointRegistry,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn ObjectStore>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            http,
            store,
            container: container.into(),
            clock: Arc::new(SystemClock),
            stamps: StampSequence::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Processes every source in registry order.
    #[tracing::instrument(skip(self), fields(container = %self.container, sources = self.registry.len()))]
    pub async fn run(&self) -> RunResult {
        info!("Starting fetch and upload");
        let mut result = RunResult::default();

        for endpoint in self.registry.iter() {
            let span = tracing::info_span!("source", source = %endpoint.name, url = %endpoint.url);
            let outcome = self.fetch_and_upload(endpoint).instrument(span).await;
            result.push(endpoint.name.clone(), outcome.into());
        }

        info!(
            ok = result.ok_count(),
            failed = result.error_count(),
            "Fetch and upload finished"
        );
        result
    }

    async fn fetch_and_upload(&self, endpoint: &Endpoint) -> Result<String, SourceError> {
        let outcome = self.try_fetch_and_upload(endpoint).await;
        if let Err(e) = &outcome {
            error!(kind = e.kind(), error = %e, "Source failed");
        }
        outcome
    }

    async fn try_fetch_and_upload(&self, endpoint: &Endpoint) -> Result<String, SourceError> {
        debug!("Fetching source");
        let payload = fetch_json(self.http.as_ref(), &endpoint.url).await?;

        let stamp = self.stamps.next(&endpoint.name, self.clock.now());
        let name = object_name(&endpoint.name, stamp);
        let body = serde_json::to_vec_pretty(&payload)?;
        let bytes = body.len();

        self.store
            .upload_blob(&self.container, &name, Bytes::from(body), true)
            .await?;

        info!(object_name = %name, bytes, "Source uploaded");
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::fetch::MockHttpClient;
    use crate::infra::storage::InMemoryObjectStore;
    use chrono::{NaiveDateTime, TimeZone, Utc};
    use serde_json::{Value, json};

    fn registry() -> EndpointRegistry {
        EndpointRegistry::new([
            ("products", "https://api.test/products"),
            ("carts", "https://api.test/carts"),
            ("users", "https://api.test/users"),
        ])
        .unwrap()
    }

    fn healthy_http() -> MockHttpClient {
        MockHttpClient::new()
            .with_json("https://api.test/products", r#"{"products":[{"id":1,"title":"Phone"}]}"#)
            .with_json("https://api.test/carts", r#"{"carts":[]}"#)
            .with_json("https://api.test/users", r#"{"users":[{"id":7,"firstName":"Åse"}]}"#)
    }

    fn pipeline(http: MockHttpClient, store: InMemoryObjectStore) -> Pipeline {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 10, 15, 0).unwrap());
        Pipeline::new(registry(), Arc::new(http), Arc::new(store), "raw").with_clock(Arc::new(clock))
    }

    fn assert_object_name(source: &str, name: &str) {
        let stamp = name
            .strip_prefix(&format!("{source}_"))
            .and_then(|rest| rest.strip_suffix(".json"))
            .unwrap_or_else(|| panic!("unexpected object name {name}"));
        NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d_%H%M%S").unwrap();
        assert_eq!(stamp.len(), "2025-06-01_101500".len());
    }

    #[tokio::test]
    async fn test_all_sources_uploaded() {
        let store = InMemoryObjectStore::new();
        let result = pipeline(healthy_http(), store.clone()).run().await;

        assert_eq!(result.len(), 3);
        let sources: Vec<_> = result.iter().map(|(name, _)| name).collect();
        assert_eq!(sources, vec!["products", "carts", "users"]);
        for (source, outcome) in result.iter() {
            assert!(outcome.is_ok(), "{source} failed: {:?}", outcome.error());
            assert_object_name(source, outcome.object_name().unwrap());
        }
        assert_eq!(
            result.get("products").unwrap().object_name(),
            Some("products_2025-06-01_101500.json")
        );
        assert_eq!(store.object_count(), 3);
    }

    #[tokio::test]
    async fn test_uploaded_content_matches_fetched_json() {
        let store = InMemoryObjectStore::new();
        let result = pipeline(healthy_http(), store.clone()).run().await;

        let name = result.get("users").unwrap().object_name().unwrap();
        let content = store.get("raw", name).unwrap();
        let text = std::str::from_utf8(&content).unwrap();

        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, json!({"users": [{"id": 7, "firstName": "Åse"}]}));
        // two-space indentation, non-ASCII written as is
        assert!(text.contains("\n  \"users\": ["));
        assert!(text.contains("Åse"));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_isolated() {
        let http = healthy_http().with_response("https://api.test/carts", 500, "oops");
        let store = InMemoryObjectStore::new();
        let result = pipeline(http, store.clone()).run().await;

        assert!(result.get("products").unwrap().is_ok());
        assert!(result.get("users").unwrap().is_ok());
        let carts = result.get("carts").unwrap();
        assert_eq!(carts.error().unwrap().kind(), "fetch");
        assert!(carts.error().unwrap().to_string().contains("500"));
        assert_eq!(store.object_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_upload_is_isolated() {
        let store = InMemoryObjectStore::new().with_failure("products_", "storage quota exceeded");
        let result = pipeline(healthy_http(), store.clone()).run().await;

        let products = result.get("products").unwrap();
        assert_eq!(products.error().unwrap().kind(), "upload");
        assert!(
            products
                .error()
                .unwrap()
                .to_string()
                .contains("storage quota exceeded")
        );
        assert!(result.get("carts").unwrap().is_ok());
        assert!(result.get("users").unwrap().is_ok());
        assert_eq!(result.error_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_reported() {
        let http = healthy_http().with_json("https://api.test/users", "<html>");
        let result = pipeline(http, InMemoryObjectStore::new()).run().await;

        let json: Value = serde_json::from_str(&result.to_json()).unwrap();
        assert_eq!(json["users"]["status"], "error");
        assert!(json["users"]["message"].as_str().unwrap().contains("malformed JSON"));
        assert_eq!(json["products"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_back_to_back_runs_never_reuse_names() {
        let store = InMemoryObjectStore::new();
        let pipeline = pipeline(healthy_http(), store.clone());

        let first = pipeline.run().await;
        let second = pipeline.run().await;

        for (source, outcome) in first.iter() {
            let again = second.get(source).unwrap();
            assert_ne!(outcome.object_name(), again.object_name());
        }
        assert_eq!(store.object_count(), 6);
    }
}
