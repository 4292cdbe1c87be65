//! Error types for the Watson services client.

use thiserror::Error;

/// HTTP status codes the services use with a specific meaning.
pub mod status_code {
    /// Bad request, usually an invalid parameter.
    pub const BAD_REQUEST: u16 = 400;
    /// Missing or invalid credentials.
    pub const UNAUTHORIZED: u16 = 401;
    /// Credentials are valid but not allowed to access the resource.
    pub const FORBIDDEN: u16 = 403;
    /// Resource (model, voice, workspace) does not exist.
    pub const NOT_FOUND: u16 = 404;
    /// Request was rejected because of its media type.
    pub const UNSUPPORTED_MEDIA_TYPE: u16 = 415;
    /// Too many requests.
    pub const TOO_MANY_REQUESTS: u16 = 429;
}

/// Result type alias for Watson operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Watson service operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error response returned by a service.
    #[error("watson: {message} (status={status}, transaction_id={transaction_id})")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
        transaction_id: String,
    },

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection could not be established.
    #[error("connection error: {0}")]
    Connection(String),

    /// Error message sent by the service over an open stream.
    #[error("protocol error: {message}")]
    Protocol { message: String, code: Option<i64> },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Session is already closed.
    #[error("session closed")]
    SessionClosed,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a new API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: message.into(),
            code: None,
            transaction_id: String::new(),
        }
    }

    /// Creates a new protocol error from a stream error message.
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol {
            message: message.into(),
            code: None,
        }
    }

    /// Returns the HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.status(),
            Some(status_code::UNAUTHORIZED) | Some(status_code::FORBIDDEN)
        )
    }

    /// Returns true if the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(status_code::NOT_FOUND)
    }

    /// Returns true if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        self.status() == Some(status_code::TOO_MANY_REQUESTS)
    }

    /// Returns true if this is an invalid parameter error.
    pub fn is_invalid_param(&self) -> bool {
        self.status() == Some(status_code::BAD_REQUEST)
    }

    /// Returns true if this is a server-side error.
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s >= 500)
    }
}
