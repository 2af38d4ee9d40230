use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::debug;

use super::{ObjectStore, StorageConnection};
use crate::error::StoreError;

/// [`ObjectStore`] backed by S3 or an S3-compatible service. Containers map to buckets.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Parses `connection_string` and builds a client from it.
    pub async fn from_connection_string(connection_string: &str) -> Result<Self, StoreError> {
        let connection = StorageConnection::parse(connection_string)?;
        Ok(Self::connect(&connection).await)
    }

    pub async fn connect(connection: &StorageConnection) -> Self {
        debug!(?connection, "Building S3 client");
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(connection.region.clone()));

        if let Some(creds) = &connection.credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                None,
                None,
                "storage-connection-string",
            ));
        }
        if let Some(endpoint) = &connection.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(connection.force_path_style)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(config),
        }
    }
}

fn content_type_for(name: &str) -> &'static str {
    if name.ends_with(".json") {
        "application/json"
    } else {
        "application/octet-stream"
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[tracing::instrument(skip(self, content), fields(bytes = content.len()))]
    async fn upload_blob(
        &self,
        container: &str,
        name: &str,
        content: Bytes,
        overwrite: bool,
    ) -> Result<(), StoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(container)
            .key(name)
            .body(ByteStream::from(content))
            .content_type(content_type_for(name));

        if !overwrite {
            request = request.if_none_match("*");
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let precondition_failed = err
                    .as_service_error()
                    .and_then(|e| e.code())
                    .is_some_and(|code| code == "PreconditionFailed");
                if !overwrite && precondition_failed {
                    return Err(StoreError::AlreadyExists {
                        container: container.to_string(),
                        name: name.to_string(),
                    });
                }
                Err(StoreError::Upload {
                    container: container.to_string(),
                    name: name.to_string(),
                    message: DisplayErrorContext(&err).to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("products_2025-01-01_120000.json"), "application/json");
        assert_eq!(content_type_for("dump.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_from_connection_string_rejects_invalid() {
        let result = S3ObjectStore::from_connection_string("Bogus=1").await;
        assert!(matches!(result, Err(StoreError::InvalidConnectionString(_))));
    }
}
