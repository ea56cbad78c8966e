//! Document service client
//!
//! The harvester talks to the document service through the
//! [`DocumentFetcher`] trait. [`PortalClient`] is the HTTP implementation;
//! tests and alternative backends plug in their own.

use crate::error::FetchError;
use crate::types::{DocumentRequest, FetchedDocument};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default document service endpoint
pub const DEFAULT_ENDPOINT: &str = "https://svc-drcn.developer.huawei.com/community/servlet/consumer/cn/documentPortal/getDocumentById";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of documents for the harvester
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Fetch one document
    async fn fetch(&self, request: &DocumentRequest) -> Result<FetchedDocument, FetchError>;
}

/// Connection settings for [`PortalClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Full URL of the "get document" endpoint
    pub endpoint: String,
    /// User-Agent header value
    pub user_agent: String,
    /// Total timeout per request
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Config for a custom endpoint, other settings default
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

/// Response envelope of the document service
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    value: Option<FetchedDocument>,
}

/// HTTP client for the document service
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl PortalClient {
    /// Build a client from explicit configuration
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| FetchError::RequestError(format!("invalid endpoint: {}", e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(FetchError::RequestError(
                "invalid endpoint: must start with http:// or https://".to_string(),
            ));
        }

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| FetchError::RequestError(format!("invalid user agent: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::ClientBuildError)?;

        Ok(Self { client, endpoint })
    }

    /// Endpoint this client posts to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl DocumentFetcher for PortalClient {
    fn name(&self) -> &'static str {
        "portal"
    }

    async fn fetch(&self, request: &DocumentRequest) -> Result<FetchedDocument, FetchError> {
        debug!(object_id = %request.object_id, catalog = %request.catalog_name, "Requesting document");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;
        let envelope: Envelope = serde_json::from_slice(&body)
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        match (envelope.code, envelope.value) {
            (Some(0), Some(document)) => Ok(document),
            (code, _) => Err(FetchError::Rejected {
                code: code.unwrap_or(-1),
                message: envelope
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "unknown error".to_string()),
            }),
        }
    }
}
