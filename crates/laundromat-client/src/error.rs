//! Error types for the client layer.
//!
//! [`ClientError`] classifies every way a round trip to the simulation
//! server can fail. The store never hands these to view consumers
//! directly: it flattens them into a single user-facing string through
//! [`ClientError::user_message`].

/// Errors produced by the transport adapter and configuration loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request never reached the server or no response came back.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success HTTP status.
    #[error("request failed with status {status}: {detail}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// The server's `detail` message, or the status reason text.
        detail: String,
    },

    /// The response body was not the JSON shape the client expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    /// Text suitable for a toast notification.
    ///
    /// Server rejections surface their `detail` verbatim; every other
    /// kind keeps its category prefix so the player can tell a dropped
    /// connection from a refused command.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the failure came from the server rejecting the request.
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Request { .. })
    }
}
