use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

use super::traits::Session;
use crate::config::PagerConfig;
use crate::endpoint::request::RequestDescriptor;
use crate::endpoint::resource::{Payload, ResourceKind};
use crate::error::FetchError;

/// Live session over HTTP.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Session with the configured transport timeout. A client that cannot be
    /// built is a startup error.
    pub fn from_config(config: &PagerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build http client")?;
        debug!(
            "http session ready, timeout={}s",
            config.request_timeout_secs
        );
        Ok(Self::new(client))
    }

    /// Send `request` and return its body if the status is acceptable.
    async fn fetch_body(&self, request: &RequestDescriptor) -> Result<Bytes, FetchError> {
        let resp = self
            .client
            .request(request.method().clone(), request.base_url().clone())
            .query(request.query())
            .send()
            .await?;

        let status = resp.status().as_u16();
        debug!("http {} status={}", request, status);
        if !request.accepts_status(status) {
            warn!("http request rejected status={} request={}", status, request);
            return Err(FetchError::Status { status });
        }

        let body = resp.bytes().await?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn load(
        &self,
        request: &RequestDescriptor,
        kind: ResourceKind,
    ) -> Result<Payload, FetchError> {
        let body = self.fetch_body(request).await?;
        kind.decode(&body)
    }
}
