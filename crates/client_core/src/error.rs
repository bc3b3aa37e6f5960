use std::time::Duration;

use shared::error::ApiException;
use thiserror::Error;

pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch counter value";
pub const INCREMENT_ERROR_MESSAGE: &str = "Failed to increment counter";
pub const SAVE_ERROR_MESSAGE: &str = "Failed to save values";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("value store unreachable: {0}")]
    Unreachable(String),
    #[error("value store transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("value store rejected request: {0}")]
    Api(#[from] ApiException),
    #[error("invalid value store response: {0}")]
    InvalidResponse(String),
    #[error("invalid value store url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("value store request timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("Failed to fetch counter value")]
    Fetch {
        #[source]
        source: StoreError,
    },
    #[error("Failed to increment counter")]
    Increment {
        #[source]
        source: StoreError,
    },
    #[error("counter request already in flight")]
    Busy,
}

impl CounterError {
    /// Generic message safe to show to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => FETCH_ERROR_MESSAGE,
            Self::Increment { .. } => INCREMENT_ERROR_MESSAGE,
            Self::Busy => "Please wait for the current request to finish",
        }
    }
}
