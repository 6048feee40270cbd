//! Array Client
//!
//! [`ArrayClient`] bundles the session manager with the result-contract
//! helpers every resource operation is built on. The resource operations
//! themselves live in [`crate::resources`] as further `impl ArrayClient`
//! blocks.

pub mod pagination;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use session::{Session, SessionManager, SessionState};
pub use transport::HttpTransport;

use crate::config::ArrayConfig;
use crate::domain::ports::{HttpMethod, TransportRef};
use crate::envelope::Envelope;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

/// Client for one array's management API
///
/// Share one instance between tasks with `Arc<ArrayClient>`; the session
/// manager serializes session-sensitive calls internally.
pub struct ArrayClient {
    sessions: SessionManager,
}

impl ArrayClient {
    /// Create a client talking HTTPS to the configured array
    pub fn new(config: ArrayConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: ArrayConfig, transport: TransportRef) -> Self {
        Self {
            sessions: SessionManager::new(config, transport),
        }
    }

    pub fn config(&self) -> &ArrayConfig {
        self.sessions.config()
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub async fn login(&self) -> Result<String> {
        self.sessions.login().await
    }

    pub async fn logout(&self) -> Result<()> {
        self.sessions.logout().await
    }

    /// Raw authenticated call; the envelope is returned unchecked
    pub async fn call(
        &self,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
    ) -> Result<Envelope> {
        self.sessions.call(path, body, method).await
    }

    /// Call and assert success
    pub(crate) async fn call_checked(
        &self,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
        context: &str,
    ) -> Result<Envelope> {
        self.call(path, body, method).await?.assert_success(context)
    }

    /// Call, assert success and data, and deserialize the data
    pub(crate) async fn call_data<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
        context: &str,
    ) -> Result<T> {
        self.call(path, body, method).await?.into_data(context)
    }

    /// Call, assert success, and deserialize a list; missing data is empty
    pub(crate) async fn call_list<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
        context: &str,
    ) -> Result<Vec<T>> {
        self.call(path, body, method).await?.into_list(context)
    }
}

/// Body scoping a request to a vstore
pub(crate) fn vstore_body(vstore_id: Option<&str>) -> Option<Value> {
    vstore_id
        .filter(|id| !id.is_empty())
        .map(|id| json!({ "vstoreId": id }))
}

/// Attach the vstore scope to an existing body
pub(crate) fn with_vstore(mut body: Value, vstore_id: Option<&str>) -> Value {
    if let (Some(id), Some(map)) = (vstore_id.filter(|id| !id.is_empty()), body.as_object_mut()) {
        map.insert("vstoreId".to_string(), Value::String(id.to_string()));
    }
    body
}

/// ID of a record the array returned for a create call
pub(crate) fn record_id(data: &Value, context: &str) -> Result<String> {
    crate::envelope::field_str(data, "ID")
        .map(str::to_string)
        .ok_or_else(|| crate::error::Error::Internal(format!("{}: response carries no ID", context)))
}
