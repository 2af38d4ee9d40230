mod basic;
mod client;
pub mod mock;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use mock::MockHttpClient;

use crate::error::FetchError;
use serde_json::Value;

/// Issues a GET for `url` and parses the body as JSON.
///
/// Non-2xx statuses and bodies that are not valid JSON are errors.
pub async fn fetch_json<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Value, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let request_err = |source: reqwest::Error| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let resp = client.execute(req).await.map_err(request_err)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = resp.bytes().await.map_err(request_err)?;
    serde_json::from_slice(&body).map_err(|source| FetchError::Malformed {
        url: url.to_string(),
        source,
    })
}
