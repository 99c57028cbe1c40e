use reqwest::StatusCode;
use thiserror::Error;

/// Client-side errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a failure status
    #[error("Request rejected with status {status}")]
    Rejected {
        status: StatusCode,
        /// `message` field of the response body, when there was one
        message: Option<String>,
    },

    /// The request never produced a response (connection, timeout, decoding)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    /// Message to show the user, falling back to `default` when the server gave none
    pub fn user_message(&self, default: &str) -> String {
        match self {
            ClientError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            _ => default.to_string(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected { .. })
    }
}
