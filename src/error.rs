//! Error types for every stage of an ingest run.
//!
//! Startup failures ([`ConfigError`], [`SecretError`],
//! [`StoreError::InvalidConnectionString`]) are fatal. Everything raised while
//! processing a single source is folded into a [`SourceError`] and recorded in
//! the run result instead of aborting the run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read endpoints file {path}: {source}")]
    EndpointsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse endpoints file {path}: {source}")]
    EndpointsParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid endpoint registry: {0}")]
    Registry(String),
}

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret '{0}' not found")]
    NotFound(String),

    #[error("access to secret '{name}' denied: {message}")]
    Auth { name: String, message: String },

    #[error("secret store unavailable while reading '{name}': {message}")]
    Unavailable { name: String, message: String },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {}", describe_request_failure(.source))]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed JSON from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Renders a reqwest error with its whole cause chain; reqwest's own
/// `Display` stops at the outermost layer.
fn describe_request_failure(err: &reqwest::Error) -> String {
    let mut message = if err.is_timeout() {
        format!("timed out ({err})")
    } else {
        err.to_string()
    };
    let mut cause = std::error::Error::source(err);
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid storage connection string: {0}")]
    InvalidConnectionString(String),

    #[error("upload of {container}/{name} failed: {message}")]
    Upload {
        container: String,
        name: String,
        message: String,
    },

    #[error("object {container}/{name} already exists")]
    AlreadyExists { container: String, name: String },
}

/// Failure of one source within a run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Upload(#[from] StoreError),
}

impl SourceError {
    /// Stable short name of the failing stage.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Fetch(_) => "fetch",
            SourceError::Serialize(_) => "serialize",
            SourceError::Upload(_) => "upload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_kind() {
        let fetch = SourceError::from(FetchError::Status {
            url: "http://x".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        });
        assert_eq!(fetch.kind(), "fetch");
        assert_eq!(fetch.to_string(), "http://x responded with status 500 Internal Server Error");

        let upload = SourceError::from(StoreError::Upload {
            container: "raw".to_string(),
            name: "a.json".to_string(),
            message: "quota exceeded".to_string(),
        });
        assert_eq!(upload.kind(), "upload");
        assert!(upload.to_string().contains("quota exceeded"));
    }
}
