//! Error types for record handling and catalog retrieval.

use thiserror::Error;

/// Errors raised while reading a single certification record.
///
/// Any of these aborts the run: the reader does not try to recover
/// partially formed records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no `{0}` object")]
    MissingInfo(&'static str),
    #[error("record is missing field `{field}`")]
    MissingField { field: String },
    #[error("field `{field}` is not a string")]
    NotAString { field: String },
    #[error("cannot parse date '{0}'")]
    InvalidDate(String),
}

/// Errors raised by the catalog collector.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("HTTP response was not OK: {status}\n{body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("content type is not JSON: {0}")]
    UnexpectedContentType(String),
    #[error("catalog returned an error payload: {0}")]
    ErrorPayload(serde_json::Value),
    #[error("malformed catalog response: {0}")]
    Malformed(String),
    #[error("unsupported chunk size index {0} (expected one of 4, 5, 6, 7)")]
    ChunkIndex(u8),
}
