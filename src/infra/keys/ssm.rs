use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use tracing::debug;

use super::SecretStore;
use crate::error::SecretError;

const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDeniedException",
    "UnrecognizedClientException",
    "ExpiredTokenException",
    "InvalidSignatureException",
];

/// Resolves secrets from AWS SSM Parameter Store.
///
/// Parameters are fetched with decryption enabled, so `SecureString` values
/// work out of the box as long as the process has `ssm:GetParameter` and the
/// corresponding KMS permissions.
pub struct SsmSecretStore {
    client: aws_sdk_ssm::Client,
}

impl SsmSecretStore {
    /// Creates a store from an already loaded AWS configuration. `endpoint`
    /// overrides the service endpoint, which is how a local emulator is reached.
    pub fn new(config: &aws_config::SdkConfig, endpoint: Option<&str>) -> Self {
        let mut builder = aws_sdk_ssm::config::Builder::from(config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: aws_sdk_ssm::Client::from_conf(builder.build()),
        }
    }
}

#[async_trait::async_trait]
impl SecretStore for SsmSecretStore {
    #[tracing::instrument(skip(self))]
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        debug!("Reading secret from SSM");
        let resp = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|err| classify(name, err))?;

        resp.parameter
            .and_then(|p| p.value)
            .ok_or_else(|| SecretError::NotFound(name.to_string()))
    }
}

fn classify(name: &str, err: SdkError<GetParameterError>) -> SecretError {
    err.as_service_error()
        .and_then(|service| classify_service(name, service))
        .unwrap_or_else(|| SecretError::Unavailable {
            name: name.to_string(),
            message: DisplayErrorContext(&err).to_string(),
        })
}

/// Maps the service errors that have a dedicated [`SecretError`] variant.
fn classify_service(name: &str, service: &GetParameterError) -> Option<SecretError> {
    if service.is_parameter_not_found() {
        return Some(SecretError::NotFound(name.to_string()));
    }
    if service.code().is_some_and(|code| AUTH_ERROR_CODES.contains(&code)) {
        return Some(SecretError::Auth {
            name: name.to_string(),
            message: service.message().unwrap_or_default().to_string(),
        });
    }
    None
}
