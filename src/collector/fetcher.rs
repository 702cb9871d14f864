//! HTTP transport for page requests
//!
//! The collector never talks to the network directly; it hands a
//! [`PageRequest`] to a [`Transport`] and consumes the body or the failure.
//! [`HttpTransport`] is the production implementation:
//! - Builds the reqwest client with timeouts, compression and redirect following
//! - Caps in-flight requests at one
//! - Classifies failures (timeout, non-success status, other network errors)

use crate::collector::request::PageRequest;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Failure reported by a transport for one request
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },
}

/// Fetches the raw body of a page request
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &PageRequest) -> Result<String, TransportError>;
}

/// Builds the HTTP client used for page requests
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed transport allowing one request in flight at a time
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    in_flight: Semaphore,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            in_flight: Semaphore::new(1),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &PageRequest) -> Result<String, TransportError> {
        let url = request.url.to_string();

        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|e| TransportError::Network {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let mut builder = self.client.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.send().await.map_err(|e| classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(&url, e))
    }
}

fn classify(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else {
        TransportError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
