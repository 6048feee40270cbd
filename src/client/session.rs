//! Session Manager
//!
//! Owns the single array session of a client: failover login across the
//! configured candidate URLs, logout, and the authenticated `call` that
//! re-logs-in and retries once when the session is gone.
//!
//! # Critical section
//!
//! The session lives inside one async mutex. [`SessionManager::call`] holds
//! it for the whole "execute, detect session failure, login, retry"
//! sequence, so concurrent callers serialize and at most one login is ever
//! in flight per client.

use crate::config::ArrayConfig;
use crate::constants::{
    ERROR_CONNECT_TO_SERVER, ERROR_UNAUTHORIZED_TO_SERVER, PWD_EXPIRED_OR_INITIAL, SESSION_PATH,
};
use crate::domain::ports::{ArrayRequest, HttpMethod, TransportRef};
use crate::envelope::{field_i64, field_str, Envelope, Outcome};
use crate::error::{Error, Result};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

// =============================================================================
// Session
// =============================================================================

/// Established array session
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// `<candidate-url><device-id>`
    pub base_url: String,
    pub device_id: String,
    token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    Authenticated,
}

// =============================================================================
// Session Manager
// =============================================================================

pub struct SessionManager {
    config: ArrayConfig,
    transport: TransportRef,
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(config: ArrayConfig, transport: TransportRef) -> Self {
        Self {
            config,
            transport,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ArrayConfig {
        &self.config
    }

    pub async fn state(&self) -> SessionState {
        match *self.session.lock().await {
            Some(_) => SessionState::Authenticated,
            None => SessionState::NoSession,
        }
    }

    pub async fn device_id(&self) -> Option<String> {
        self.session.lock().await.as_ref().map(|s| s.device_id.clone())
    }

    pub async fn base_url(&self) -> Option<String> {
        self.session.lock().await.as_ref().map(|s| s.base_url.clone())
    }

    /// Log in to the first candidate URL that accepts the credentials
    ///
    /// Returns the array device ID.
    pub async fn login(&self) -> Result<String> {
        let mut slot = self.session.lock().await;
        self.login_locked(&mut slot).await
    }

    /// Log out of the current session, if any
    pub async fn logout(&self) -> Result<()> {
        let mut slot = self.session.lock().await;
        self.logout_locked(&mut slot).await
    }

    /// Execute a request, re-logging-in and retrying once on session loss
    pub async fn call(
        &self,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
    ) -> Result<Envelope> {
        let mut slot = self.session.lock().await;

        let envelope = self.execute(&slot, path, body.clone(), method).await;
        if !matches!(
            envelope.code(),
            ERROR_CONNECT_TO_SERVER | ERROR_UNAUTHORIZED_TO_SERVER
        ) {
            return Ok(envelope);
        }

        error!("Can't open the recent url, re-login.");
        let old_url = slot.as_ref().map(|s| s.base_url.clone());
        self.login_locked(&mut slot).await?;
        debug!(
            "Replace URL: \nOld URL: {:?}\nNew URL: {:?}\n",
            old_url,
            slot.as_ref().map(|s| s.base_url.as_str())
        );

        Ok(self.execute(&slot, path, body, method).await)
    }

    async fn execute(
        &self,
        session: &Option<Session>,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
    ) -> Envelope {
        let request = ArrayRequest::new(path, method, self.config.call_timeout())
            .with_body(body)
            .with_session(
                session.as_ref().map(|s| s.base_url.clone()),
                session.as_ref().map(|s| s.token.clone()),
            );
        self.transport.execute(request).await
    }

    async fn login_locked(&self, slot: &mut Option<Session>) -> Result<String> {
        let candidates = self.config.candidate_urls();
        let credentials = json!({
            "username": self.config.username,
            "password": self.config.password,
            "scope": "0",
        });

        for url in &candidates {
            *slot = None;
            self.transport.reset();

            let request = ArrayRequest::new(
                format!("{}{}", url, SESSION_PATH),
                HttpMethod::Post,
                self.config.login_timeout(),
            )
            .with_body(Some(credentials.clone()));
            let envelope = self.transport.execute(request).await;

            let Some(session) = accept_login(url, &envelope) else {
                error!("Login to {} failed, try another.", url);
                continue;
            };

            debug!("Login success: {}", url);
            let device_id = session.device_id.clone();
            let account_state = envelope
                .data
                .as_ref()
                .and_then(|data| field_i64(data, "accountstate"));
            *slot = Some(session);

            if let Some(state) = account_state.filter(|s| PWD_EXPIRED_OR_INITIAL.contains(s)) {
                if let Err(e) = self.logout_locked(slot).await {
                    warn!("Logout after password check failed: {}", e);
                }
                error!("Password has expired or initial, please change the password.");
                return Err(Error::PasswordExpired {
                    account_state: state,
                });
            }

            info!("Logged in to array {} via {}", device_id, url);
            return Ok(device_id);
        }

        *slot = None;
        error!("All url login fail.");
        Err(Error::LoginExhausted {
            attempted: candidates.len(),
        })
    }

    async fn logout_locked(&self, slot: &mut Option<Session>) -> Result<()> {
        let Some(session) = slot.take() else {
            return Ok(());
        };

        let request = ArrayRequest::new("/sessions", HttpMethod::Delete, self.config.call_timeout())
            .with_session(Some(session.base_url.clone()), Some(session.token.clone()));
        let envelope = self.transport.execute(request).await;

        match envelope.code() {
            0 => {
                info!("Logged out of array {}", session.device_id);
                Ok(())
            }
            ERROR_CONNECT_TO_SERVER | ERROR_UNAUTHORIZED_TO_SERVER => {
                warn!(
                    "Session on {} was already gone (code {})",
                    session.base_url,
                    envelope.code()
                );
                Ok(())
            }
            _ => envelope.assert_success("Logout session error.").map(|_| ()),
        }
    }
}

/// Build a session from a login response the array accepted
fn accept_login(url: &str, envelope: &Envelope) -> Option<Session> {
    let Outcome::Success { data: Some(data) } = envelope.outcome() else {
        return None;
    };
    let device_id = field_str(data, "deviceid")?;
    Some(Session {
        base_url: format!("{}{}", url, device_id),
        device_id: device_id.to_string(),
        token: field_str(data, "iBaseToken").unwrap_or_default().to_string(),
    })
}
