// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Transport used to post reports to the collector.
//!
//! The reporter talks to the collector only through [`Transport`], never
//! through an intercepted entry point, so reporting can never observe itself.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::error::ReportError;

/// Header carrying the credential.
pub const API_KEY_HEADER: &str = "API-KEY";

/// One POST to the ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub url: String,
    pub api_key: String,
    /// Serialized JSON payload.
    pub body: String,
}

/// Something that can deliver an ingest request and return the status code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: IngestRequest) -> Result<u16, ReportError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ReportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Use an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: IngestRequest) -> Result<u16, ReportError> {
        let response = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &request.api_key)
            .body(request.body)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new(Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_http_transport_unreachable() {
        let transport = HttpTransport::new(Duration::from_millis(500)).unwrap();
        let request = IngestRequest {
            // Port 9 (discard) on localhost is closed in test environments
            url: "http://127.0.0.1:9/processor/ingest/request/outgoing".to_string(),
            api_key: "key".to_string(),
            body: "{}".to_string(),
        };

        let result = transport.post(request).await;
        assert!(matches!(result, Err(ReportError::Transport(_))));
    }
}
