use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("group {group} returned HTTP {status}")]
    Status { group: String, status: u16 },
    #[error("payload parse error: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("payload is not a JSON array")]
    NotAnArray,
    #[error("invalid record {norad_id:?}: {reason}")]
    InvalidRecord {
        norad_id: Option<u64>,
        reason: String,
    },
}
