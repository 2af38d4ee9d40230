//! Secret resolution.
//!
//! [`SecretStore`] is the async trait for resolving a secret name into its plaintext value.
//! [`SsmSecretStore`] implements it with AWS SSM Parameter Store and
//! [`StaticSecretStore`] serves fixed values for tests and local harnesses.

mod ssm;
mod static_store;

pub use ssm::SsmSecretStore;
pub use static_store::StaticSecretStore;

use crate::error::SecretError;

/// Resolves a secret name (e.g. an SSM parameter name) into its plaintext value.
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError>;
}
