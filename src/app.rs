//! Startup wiring: turns a validated [`Config`] into a ready [`Pipeline`].

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::fetch::BasicClient;
use crate::infra::keys::SecretStore;
use crate::infra::storage::{ObjectStore, S3ObjectStore};
use crate::pipeline::Pipeline;
use crate::registry::EndpointRegistry;

/// Resolves the storage connection string, connects the object store and
/// assembles the pipeline. Any failure here is fatal for the process.
pub async fn build_pipeline(config: &Config, secrets: &dyn SecretStore) -> Result<Pipeline> {
    let connection_string = secrets
        .get_secret(&config.storage_secret_name)
        .await
        .context("failed to resolve storage connection string")?;
    let store = S3ObjectStore::from_connection_string(&connection_string)
        .await
        .context("failed to build object store client")?;

    build_pipeline_with_store(config, Arc::new(store))
}

/// Same as [`build_pipeline`] with an already constructed object store.
pub fn build_pipeline_with_store(config: &Config, store: Arc<dyn ObjectStore>) -> Result<Pipeline> {
    let registry = match &config.endpoints_file {
        Some(path) => EndpointRegistry::load(path)?,
        None => EndpointRegistry::default(),
    };
    let http = BasicClient::with_timeout(config.http_timeout).context("failed to build HTTP client")?;

    info!(
        container = %config.container_name,
        sources = registry.len(),
        timeout_secs = config.http_timeout.as_secs(),
        "Pipeline ready"
    );
    Ok(Pipeline::new(
        registry,
        Arc::new(http),
        store,
        config.container_name.clone(),
    ))
}
