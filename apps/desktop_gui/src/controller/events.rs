//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{LoadReport, SaveOutcome};

#[derive(Debug)]
pub enum UiEvent {
    CounterUpdated(i64),
    CounterFailed(UiError),
    SlidersLoaded(LoadReport),
    SaveFinished {
        outcome: SaveOutcome,
        failed_keys: Vec<String>,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Counter,
    Sliders,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
            || message_lower.contains("invalid api key")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("timed out")
            || message_lower.contains("timeout")
            || message_lower.contains("unreachable")
            || message_lower.contains("connection")
            || message_lower.contains("transport")
            || message_lower.contains("disconnected")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("invalid")
            || message_lower.contains("malformed")
            || message_lower.contains("unknown slider")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Shows `message` but classifies by `detail`.
    pub fn with_detail(context: UiErrorContext, message: impl Into<String>, detail: &str) -> Self {
        Self {
            message: message.into(),
            ..Self::from_message(context, detail)
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
