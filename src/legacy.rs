//! Client for the legacy REST backend.
//!
//! The old backend still serves a few endpoints (e.g. `PATCH
//! /statusUpdate/{id}`). Calls are bounded by a fixed timeout and never fail:
//! any error is logged and reported as `None` so that a dead backend cannot
//! take the application down with it.

use crate::errors::Result;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on every legacy call.
pub const LEGACY_TIMEOUT: Duration = Duration::from_secs(5);

/// Best-effort HTTP client for the legacy backend.
#[derive(Debug, Clone)]
pub struct LegacyClient {
    http: Client,
    base_url: String,
}

impl LegacyClient {
    /// Builds a client for `base_url` with [`LEGACY_TIMEOUT`] applied.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(LEGACY_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for `endpoint`.
    #[must_use]
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// Sends a request and returns the JSON body, or `None` on any failure.
    pub async fn call<B: Serialize + Sync>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Option<Value> {
        match self.try_call(method.clone(), endpoint, body).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("API call failed [{} {}]: {}", method, endpoint, e);
                None
            }
        }
    }

    async fn try_call<B: Serialize + Sync>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<Value> {
        let mut request = self.http.request(method, self.url(endpoint));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?.error_for_status()?;
        debug!("Legacy call {} -> {}", endpoint, response.status());
        Ok(response.json().await?)
    }

    /// `GET` helper.
    pub async fn get(&self, endpoint: &str) -> Option<Value> {
        self.call::<Value>(Method::GET, endpoint, None).await
    }

    /// `DELETE` helper.
    pub async fn delete(&self, endpoint: &str) -> Option<Value> {
        self.call::<Value>(Method::DELETE, endpoint, None).await
    }

    /// `PATCH` helper.
    pub async fn patch<B: Serialize + Sync>(&self, endpoint: &str, body: &B) -> Option<Value> {
        self.call(Method::PATCH, endpoint, Some(body)).await
    }

    /// `POST` helper.
    pub async fn post<B: Serialize + Sync>(&self, endpoint: &str, body: &B) -> Option<Value> {
        self.call(Method::POST, endpoint, Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joining() -> Result<()> {
        let client = LegacyClient::new("https://legacy.example.com/")?;
        assert_eq!(
            client.url("/statusUpdate/42"),
            "https://legacy.example.com/statusUpdate/42"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_backend_yields_none() -> Result<()> {
        // nothing listens on the discard port locally
        let client = LegacyClient::new("http://127.0.0.1:9")?;
        assert!(client.get("/services").await.is_none());
        assert!(
            client
                .patch("/statusUpdate/1", &json!({ "status": "Done" }))
                .await
                .is_none()
        );
        Ok(())
    }
}
