use thiserror::Error;

/// Why a source line was rejected as a record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("line is not a JSON object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `host` must be a non-empty string")]
    InvalidHost,
    #[error("port {0} is not a number in 0-65535")]
    InvalidPort(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
