//! Error type shared by every fetcher, sensor and the LLM client.
//!
//! None of these errors escape the collection pipeline: fetchers and sensors
//! convert them into an empty contribution plus a log line. They exist so the
//! inner code can use `?` and so the collector can report *why* a task
//! produced nothing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid url: {0:?}")]
    InvalidUrl(String),

    #[error("llm error: {0}")]
    Llm(String),

    #[error("task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

impl From<quick_xml::DeError> for FetchError {
    fn from(err: quick_xml::DeError) -> Self {
        FetchError::Parse(err.to_string())
    }
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            FetchError::Task(format!("panicked: {err}"))
        } else {
            FetchError::Task(err.to_string())
        }
    }
}
