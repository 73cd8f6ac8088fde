use reqwest::StatusCode;
use thiserror::Error;

/// Message shown when a search fails and the backend gave no reason.
pub const SEARCH_FAILED_MESSAGE: &str = "검색중 오류가 생겼습니다.";

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to send search request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Search request failed with status {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Failed to parse search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid search endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SearchError {
    /// The inline error string a UI displays for this failure.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => SEARCH_FAILED_MESSAGE.to_string(),
        }
    }
}
