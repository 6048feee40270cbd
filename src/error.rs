//! Error types for the NAS array client
//!
//! Provides structured error types for the transport, session and
//! resource layers. Transport and HTTP failures are normally folded into
//! failure envelopes by the transport; they only surface as [`Error`]
//! values once a caller asserts success on such an envelope.

use crate::envelope::Envelope;
use thiserror::Error;

/// Unified error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Transport error: {message} (code {code}: {description})")]
    Transport {
        message: String,
        code: i64,
        description: String,
    },

    #[error("HTTP error {status}: {message} ({description})")]
    Protocol {
        message: String,
        status: u16,
        description: String,
    },

    // =========================================================================
    // Array Errors
    // =========================================================================
    #[error("{message} (code {code}: {description})")]
    Array {
        message: String,
        code: i64,
        description: String,
        envelope: Box<Envelope>,
    },

    #[error("{message}: \"data\" was not in result")]
    MissingData {
        message: String,
        envelope: Box<Envelope>,
    },

    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("All url login fail ({attempted} candidate urls tried)")]
    LoginExhausted { attempted: usize },

    #[error("Password has expired or initial, please change the password (account state {account_state})")]
    PasswordExpired { account_state: i64 },

    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Array result code carried by this error, if any
    pub fn array_code(&self) -> Option<i64> {
        match self {
            Error::Transport { code, .. } | Error::Array { code, .. } => Some(*code),
            Error::Protocol { status, .. } => Some(i64::from(*status)),
            _ => None,
        }
    }

    /// Raw envelope the error was raised from, if any
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            Error::Array { envelope, .. } | Error::MissingData { envelope, .. } => Some(envelope.as_ref()),
            _ => None,
        }
    }

    /// Check if this error comes from the login sequence
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Error::LoginExhausted { .. } | Error::PasswordExpired { .. }
        )
    }

    /// Check if this error is transient
    ///
    /// Transient errors may succeed when the whole operation is retried by
    /// the caller. The client itself never retries beyond the single
    /// re-login performed by the session manager.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport { .. } | Error::LoginExhausted { .. } => true,
            Error::Protocol { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, Error>;
