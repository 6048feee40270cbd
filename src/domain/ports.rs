//! Domain Ports - Transport boundary of the client
//!
//! The session manager talks to the array only through [`Transport`].
//! The production adapter is [`crate::client::HttpTransport`]; tests plug
//! in a scripted transport.

use crate::envelope::Envelope;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Request Types
// =============================================================================

/// HTTP verbs accepted by the array management API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request/response exchange with the array
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRequest {
    /// Effective base URL of the established session, if any
    pub base_url: Option<String>,
    /// Resource path, or a full URL when no session exists
    pub path: String,
    pub method: HttpMethod,
    /// JSON body, sent for every verb when present
    pub body: Option<Value>,
    pub timeout: Duration,
    /// Session token sent as the `iBaseToken` header
    pub token: Option<String>,
}

impl ArrayRequest {
    pub fn new(path: impl Into<String>, method: HttpMethod, timeout: Duration) -> Self {
        Self {
            base_url: None,
            path: path.into(),
            method,
            body: None,
            timeout,
            token: None,
        }
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_session(mut self, base_url: Option<String>, token: Option<String>) -> Self {
        self.base_url = base_url;
        self.token = token;
        self
    }

    /// Full request URL
    pub fn url(&self) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base, self.path),
            None => self.path.clone(),
        }
    }
}

// =============================================================================
// Transport Port
// =============================================================================

/// Performs single exchanges with the array
///
/// Implementations never fail: connection errors, HTTP error statuses and
/// undecodable bodies are all returned as failure envelopes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request and normalize the response
    async fn execute(&self, request: ArrayRequest) -> Envelope;

    /// Drop the persistent HTTP session and start a fresh one
    fn reset(&self);
}

pub type TransportRef = Arc<dyn Transport>;
