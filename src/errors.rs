// src/errors.rs

use thiserror::Error;

pub type AuraResult<T> = Result<T, AuraError>;

#[derive(Debug, Error)]
pub enum AuraError {
    /// Rejected before any network call (bad extension, oversized file,
    /// malformed PDF signature).
    #[error("{0}")]
    Validation(String),

    /// Every transport variant failed against the backend.
    #[error("backend request failed: {detail}")]
    Transport {
        detail: String,
        /// True when the failure looks like the backend was unreachable
        /// (connection refused, timeout, cross-origin rejection).
        connect_failure: bool,
    },

    /// The backend answered but the body was not what we expected.
    #[error("couldn't process the backend response: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuraError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AuraError::Validation(msg.into())
    }

    pub fn transport(detail: impl Into<String>, connect_failure: bool) -> Self {
        AuraError::Transport {
            detail: detail.into(),
            connect_failure,
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        AuraError::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AuraError::Config(msg.into())
    }

    /// Human-readable detail line for the transcript error bubble.
    pub fn user_details(&self) -> String {
        match self {
            AuraError::Transport {
                detail,
                connect_failure: true,
            } => format!(
                "{detail}. The analysis backend could not be reached. Check that it is \
                 running and that requests from this origin are allowed."
            ),
            other => other.to_string(),
        }
    }
}
