use thiserror::Error;

/// Errors produced by the extraction and synchronization engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("page is showing the Time Grid view; switch to List of Classes")]
    WrongView,

    #[error("calendar API error ({status}): {message}")]
    Calendar { status: u16, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
