//! Paginated retrieval of certification records.
//!
//! The catalog paginates by offset, so pages are fetched strictly one
//! after another with a pause in between to respect its rate limit.

pub mod client;

pub use client::CatalogClient;

use crate::error::CollectorError;
use crate::extract::parse_date;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Page sizes selectable with the `DC` query parameter.
pub const CHUNK_SIZES: [(u8, usize); 4] = [(4, 50), (5, 100), (6, 500), (7, 1000)];

/// Page size for a `DC` index.
pub fn chunk_size(index: u8) -> Result<usize, CollectorError> {
    CHUNK_SIZES
        .iter()
        .find(|(i, _)| *i == index)
        .map(|(_, size)| *size)
        .ok_or(CollectorError::ChunkIndex(index))
}

/// Configuration for the collector.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub base_url: String,
    /// Pause between pages.
    pub interval_seconds: u64,
    /// `DC` chunk-size index.
    pub chunk_index: u8,
    pub timeout_seconds: u64,
    pub accept_invalid_certs: bool,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self::from(&crate::config::CollectorConfig::default())
    }
}

impl From<&crate::config::CollectorConfig> for CollectorSettings {
    fn from(config: &crate::config::CollectorConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            interval_seconds: config.interval_seconds,
            chunk_index: config.chunk_index,
            timeout_seconds: config.timeout_seconds,
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }
}

/// Certification date span as `YYYYMMDD` query values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Span {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Span {
    /// Build a span from user-supplied dates, normalizing them to `YYYYMMDD`.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, crate::error::RecordError> {
        let normalize = |text: &str| parse_date(text).map(|d| d.format("%Y%m%d").to_string());
        Ok(Self {
            from: from.map(normalize).transpose()?,
            to: to.map(normalize).transpose()?,
        })
    }

    /// Query-string suffix (`&DS=..&DE=..`), empty for an open span.
    pub fn query(&self) -> String {
        let mut query = String::new();
        if let Some(ref from) = self.from {
            query.push_str(&format!("&DS={}", from));
        }
        if let Some(ref to) = self.to {
            query.push_str(&format!("&DE={}", to));
        }
        query
    }
}

/// Extract the record count from a `num` response: `{"giteki":{"count":N}}`.
///
/// The count may be sent as a number or as a numeric string.
pub fn parse_count(body: &Value) -> Result<usize, CollectorError> {
    check_error_payload(body)?;
    let count = body
        .get("giteki")
        .and_then(|g| g.get("count"))
        .ok_or_else(|| CollectorError::Malformed("missing giteki.count".to_string()))?;

    let parsed = match count {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| CollectorError::Malformed(format!("invalid count {}", count)))
}

/// Extract the records from a `list` response: `{"giteki":[...]}`.
pub fn parse_page(body: Value) -> Result<Vec<Value>, CollectorError> {
    check_error_payload(&body)?;
    match body {
        Value::Object(mut map) => match map.shift_remove("giteki") {
            Some(Value::Array(records)) => Ok(records),
            Some(other) => Err(CollectorError::Malformed(format!(
                "giteki is not an array: {}",
                other
            ))),
            None => Err(CollectorError::Malformed("missing giteki".to_string())),
        },
        other => Err(CollectorError::Malformed(format!(
            "response is not an object: {}",
            other
        ))),
    }
}

fn check_error_payload(body: &Value) -> Result<(), CollectorError> {
    match body.get("errs") {
        Some(_) => Err(CollectorError::ErrorPayload(body.clone())),
        None => Ok(()),
    }
}

/// 1-based start offsets of every page for `count` records.
pub fn page_starts(count: usize, chunk: usize) -> impl Iterator<Item = usize> {
    (0..count).step_by(chunk.max(1)).map(|i| i + 1)
}

/// Fetch every page for `span`, pausing `interval_seconds` between pages.
pub async fn collect_all(
    client: &CatalogClient,
    settings: &CollectorSettings,
    span: &Span,
    count: usize,
    show_progress: bool,
) -> Result<Vec<Value>, CollectorError> {
    let chunk = chunk_size(settings.chunk_index)?;
    let starts: Vec<usize> = page_starts(count, chunk).collect();
    info!(
        "Retrieving {} records in {} pages of {}",
        count,
        starts.len(),
        chunk
    );

    let progress = if show_progress {
        let pb = ProgressBar::new(count as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let mut records = Vec::with_capacity(count);
    for (page, start) in starts.into_iter().enumerate() {
        if page > 0 && settings.interval_seconds > 0 {
            debug!("Waiting {}s before the next page", settings.interval_seconds);
            tokio::time::sleep(Duration::from_secs(settings.interval_seconds)).await;
        }

        let batch = client.page(span, settings.chunk_index, start).await?;
        debug!("Page starting at {} returned {} records", start, batch.len());
        records.extend(batch);

        if let Some(ref pb) = progress {
            pb.set_position(records.len() as u64);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("Retrieval complete");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_chunk_size_table() {
        assert_eq!(chunk_size(4).unwrap(), 50);
        assert_eq!(chunk_size(6).unwrap(), 500);
        assert_eq!(chunk_size(7).unwrap(), 1000);
        assert!(matches!(chunk_size(3), Err(CollectorError::ChunkIndex(3))));
    }

    #[test]
    fn test_default_settings_follow_config_defaults() {
        let settings = CollectorSettings::default();
        assert_eq!(settings.base_url, "https://www.tele.soumu.go.jp/giteki");
        assert_eq!(settings.interval_seconds, 60);
        assert_eq!(settings.chunk_index, 6);
        assert!(!settings.accept_invalid_certs);
    }

    #[test]
    fn test_span_query() {
        assert_eq!(Span::default().query(), "");
        let span = Span::parse(Some("2012-01-01"), None).unwrap();
        assert_eq!(span.query(), "&DS=20120101");
        let span = Span::parse(Some("20120101"), Some("2014/1/1")).unwrap();
        assert_eq!(span.query(), "&DS=20120101&DE=20140101");
        assert!(Span::parse(Some("yesterday"), None).is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&json!({"giteki": {"count": "1234"}})).unwrap(), 1234);
        assert_eq!(parse_count(&json!({"giteki": {"count": 7}})).unwrap(), 7);
        assert!(matches!(
            parse_count(&json!({"giteki": {}})),
            Err(CollectorError::Malformed(_))
        ));
        assert!(matches!(
            parse_count(&json!({"errs": [{"errCd": "1"}]})),
            Err(CollectorError::ErrorPayload(_))
        ));
    }

    #[test]
    fn test_parse_page() {
        let records = parse_page(json!({"giteki": [{"a": 1}, {"b": 2}]})).unwrap();
        assert_eq!(records.len(), 2);
        assert!(matches!(
            parse_page(json!({"giteki": [], "errs": []})),
            Err(CollectorError::ErrorPayload(_))
        ));
        assert!(parse_page(json!([1])).is_err());
    }

    #[test]
    fn test_page_starts() {
        assert_eq!(page_starts(1200, 500).collect::<Vec<_>>(), vec![1, 501, 1001]);
        assert_eq!(page_starts(500, 500).collect::<Vec<_>>(), vec![1]);
        assert_eq!(page_starts(0, 500).count(), 0);
    }

    /// Serve canned JSON responses keyed by request-path prefix.
    async fn serve(routes: Vec<(&'static str, &'static str, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buffer = vec![0u8; 8192];
                let mut read = 0;
                while !buffer[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buffer[read..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => read += n,
                    }
                }
                let request = String::from_utf8_lossy(&buffer[..read]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("").to_string();

                let (content_type, body) = routes
                    .iter()
                    .find(|(prefix, _, _)| path.contains(prefix))
                    .map(|(_, ct, body)| (*ct, body.clone()))
                    .unwrap_or(("application/json", "{}".to_string()));

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    content_type,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/giteki", addr)
    }

    fn local_settings(base_url: String) -> CollectorSettings {
        CollectorSettings {
            base_url,
            interval_seconds: 0,
            chunk_index: 4,
            ..CollectorSettings::default()
        }
    }

    #[tokio::test]
    async fn test_collect_all_pages() {
        let page = |id: usize| json!({ "giteki": [{ "gitekiInfo": { "no": id } }] }).to_string();
        let base = serve(vec![
            ("/num?", "application/json; charset=utf-8", json!({"giteki": {"count": "60"}}).to_string()),
            ("SC=51", "application/json", page(2)),
            ("SC=1", "application/json", page(1)),
        ])
        .await;

        let settings = local_settings(base);
        let client = CatalogClient::new(&settings).unwrap();
        let span = Span::default();

        let count = client.count(&span).await.unwrap();
        assert_eq!(count, 60);

        let records = collect_all(&client, &settings, &span, count, false).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["gitekiInfo"]["no"], json!(1));
        assert_eq!(records[1]["gitekiInfo"]["no"], json!(2));
    }

    #[tokio::test]
    async fn test_non_json_content_type_aborts() {
        let base = serve(vec![("/num?", "text/html", "<html></html>".to_string())]).await;
        let client = CatalogClient::new(&local_settings(base)).unwrap();

        let err = client.count(&Span::default()).await.unwrap_err();
        assert!(matches!(err, CollectorError::UnexpectedContentType(ct) if ct == "text/html"));
    }
}
