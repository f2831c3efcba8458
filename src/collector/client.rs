//! HTTP client for the giteki catalog API.

use crate::error::CollectorError;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{parse_count, parse_page, CollectorSettings, Span};

/// Fixed query selecting the JSON output and the record class.
const BASE_QUERY: &str = "OF=2&REC=02-08-00-00";

/// Thin client over the `num` and `list` endpoints.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(settings: &CollectorSettings) -> Result<Self, CollectorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!("giteki/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the record-count endpoint.
    pub fn num_url(&self, span: &Span) -> String {
        format!("{}/num?{}{}", self.base_url, BASE_QUERY, span.query())
    }

    /// URL of one page of the record-list endpoint. `start` is 1-based.
    pub fn list_url(&self, span: &Span, chunk_index: u8, start: usize) -> String {
        format!(
            "{}/list?{}{}&DC={}&SC={}",
            self.base_url,
            BASE_QUERY,
            span.query(),
            chunk_index,
            start
        )
    }

    /// Number of records matching `span`.
    pub async fn count(&self, span: &Span) -> Result<usize, CollectorError> {
        let body = self.get_json(&self.num_url(span)).await?;
        parse_count(&body)
    }

    /// One page of records starting at the 1-based offset `start`.
    pub async fn page(
        &self,
        span: &Span,
        chunk_index: u8,
        start: usize,
    ) -> Result<Vec<Value>, CollectorError> {
        let body = self.get_json(&self.list_url(span, chunk_index, start)).await?;
        parse_page(body)
    }

    async fn get_json(&self, url: &str) -> Result<Value, CollectorError> {
        debug!("url = {}", url);

        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollectorError::Status { status, body });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("application/json") {
            return Err(CollectorError::UnexpectedContentType(content_type));
        }

        Ok(response.json().await?)
    }
}
