//! Client layer for the link backend API
//!
//! # Architecture
//!
//! ```text
//! Services / Session → ApiGateway ──→ HttpTransport ──→ ReqwestTransport (real API)
//!                         │                          └→ MockBackend (in-memory)
//!                         └→ TokenStore (bearer, refresh)
//! ```
//!
//! # Refresh Policy
//!
//! - 401 on a request that was not replayed → refresh once, replay once
//! - 401 on a replayed request → returned as-is
//! - refresh failure → tokens cleared, navigate to login, `RefreshFailed`
//! - anonymous requests (credential endpoints) → never refreshed

pub mod envelope;
pub mod gateway;
pub mod mock;
pub mod transport;

pub use envelope::ApiResponse;
pub use gateway::ApiGateway;
pub use mock::MockBackend;
pub use transport::{ApiReply, ApiRequest, HttpTransport, ReqwestTransport};

use std::fmt;

// ============ ClientError ============

/// Errors from the HTTP client layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Connection, timeout or TLS failure
    Network(String),
    /// Backend answered with an error status or `success: false`
    Api { status: u16, message: String },
    /// Response body did not match the expected shape
    Decode(String),
    /// The 401 could not be recovered by a token refresh
    RefreshFailed(String),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::RefreshFailed(_)) || self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Api { status, message } => write!(f, "HTTP {}: {}", status, message),
            ClientError::Decode(msg) => write!(f, "Invalid response: {}", msg),
            ClientError::RefreshFailed(msg) => write!(f, "Session expired: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
