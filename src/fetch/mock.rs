use super::client::HttpClient;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory [`HttpClient`] serving canned responses keyed by URL.
///
/// Unknown URLs answer `404`. Every requested URL is recorded in order.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, (u16, String)>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    pub fn with_json(self, url: &str, body: &str) -> Self {
        self.with_response(url, 200, body)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let url = req.url().to_string();
        self.requested.lock().unwrap().push(url.clone());

        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .unwrap_or((404, String::new()));

        let resp = axum::http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        Ok(reqwest::Response::from(resp))
    }
}
