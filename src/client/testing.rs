//! Scripted in-process transport for unit tests

use crate::client::ArrayClient;
use crate::config::ArrayConfig;
use crate::constants::{ERROR_CONNECT_TO_SERVER, ERROR_UNAUTHORIZED_TO_SERVER, SESSION_PATH};
use crate::domain::ports::{ArrayRequest, HttpMethod, Transport};
use crate::envelope::Envelope;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const URL_A: &str = "https://10.0.0.1:8088/deviceManager/rest/";
pub const URL_B: &str = "https://10.0.0.2:8088/deviceManager/rest/";
pub const URL_C: &str = "https://10.0.0.3:8088/deviceManager/rest/";

pub fn ok(data: Value) -> Envelope {
    Envelope::success(Some(data))
}

pub fn ok_empty() -> Envelope {
    Envelope::success(None)
}

pub fn fail(code: i64) -> Envelope {
    Envelope::failure(code, format!("array error {}", code))
}

pub fn login_ok(device_id: &str, account_state: i64) -> Envelope {
    ok(json!({
        "deviceid": device_id,
        "iBaseToken": format!("token-{}", device_id),
        "accountstate": account_state,
    }))
}

pub fn count(n: usize) -> Envelope {
    ok(json!({"COUNT": n.to_string()}))
}

struct Route {
    method: HttpMethod,
    pattern: String,
    responses: VecDeque<Envelope>,
}

/// Transport answering from registered routes
///
/// The route with the longest pattern contained in the request URL wins.
/// A route replays its responses in order and repeats the last one.
/// Unmatched requests get a connect-failure envelope.
///
/// With rotating tokens, every successful login issues a fresh token and
/// revokes the previous one; requests carrying any other token get the
/// unauthorized envelope before routes are consulted.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ArrayRequest>>,
    delay: Option<Duration>,
    resets: AtomicUsize,
    logins_in_flight: AtomicUsize,
    max_logins_in_flight: AtomicUsize,
    rotate_tokens: bool,
    issued_tokens: AtomicUsize,
    live_token: Mutex<Option<String>>,
}

pub struct ScriptedTransportBuilder(ScriptedTransport);

impl ScriptedTransport {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> ScriptedTransportBuilder {
        ScriptedTransportBuilder(ScriptedTransport::default())
    }

    pub fn requests(&self) -> Vec<ArrayRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, pattern: &str) -> Vec<ArrayRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.url().contains(pattern))
            .cloned()
            .collect()
    }

    pub fn count(&self, method: HttpMethod, pattern: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url().contains(pattern))
            .count()
    }

    /// Bodies of the requests matching `method` and `pattern`
    pub fn bodies(&self, method: HttpMethod, pattern: &str) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url().contains(pattern))
            .map(|r| r.body.clone().unwrap_or(Value::Null))
            .collect()
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_logins(&self) -> usize {
        self.max_logins_in_flight.load(Ordering::SeqCst)
    }

    pub fn issued_tokens(&self) -> usize {
        self.issued_tokens.load(Ordering::SeqCst)
    }

    fn issue_token(&self, envelope: &mut Envelope) {
        let Some(Value::Object(data)) = envelope.data.as_mut() else {
            return;
        };
        let n = self.issued_tokens.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("token-{}", n);
        data.insert("iBaseToken".to_string(), Value::String(token.clone()));
        *self.live_token.lock() = Some(token);
    }

    fn respond(&self, request: &ArrayRequest) -> Envelope {
        let url = request.url();
        let mut routes = self.routes.lock();
        let route = routes
            .iter_mut()
            .filter(|route| route.method == request.method && url.contains(&route.pattern))
            .max_by_key(|route| route.pattern.len());

        match route {
            Some(route) if route.responses.len() > 1 => {
                route.responses.pop_front().unwrap_or_else(ok_empty)
            }
            Some(route) => route.responses.front().cloned().unwrap_or_else(ok_empty),
            None => Envelope::failure(ERROR_CONNECT_TO_SERVER, "Connect server error"),
        }
    }
}

impl ScriptedTransportBuilder {
    pub fn on(self, method: HttpMethod, pattern: &str, response: Envelope) -> Self {
        self.on_sequence(method, pattern, vec![response])
    }

    pub fn on_sequence(self, method: HttpMethod, pattern: &str, responses: Vec<Envelope>) -> Self {
        self.0.routes.lock().push(Route {
            method,
            pattern: pattern.to_string(),
            responses: responses.into(),
        });
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.0.delay = Some(delay);
        self
    }

    /// Issue a new token on each login and reject every other token
    pub fn with_rotating_tokens(mut self) -> Self {
        self.0.rotate_tokens = true;
        self
    }

    pub fn build(self) -> Arc<ScriptedTransport> {
        Arc::new(self.0)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ArrayRequest) -> Envelope {
        self.requests.lock().push(request.clone());

        let is_login = request.url().contains(SESSION_PATH);
        if is_login {
            let in_flight = self.logins_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_logins_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let revoked = self.rotate_tokens
            && !is_login
            && (request.token.is_none() || request.token != *self.live_token.lock());
        let mut envelope = if revoked {
            Envelope::failure(ERROR_UNAUTHORIZED_TO_SERVER, "Unauthorized")
        } else {
            self.respond(&request)
        };
        if is_login {
            if self.rotate_tokens && envelope.code() == 0 {
                self.issue_token(&mut envelope);
            }
            self.logins_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        envelope
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// Client logged in to device `dev` through `URL_A`
pub async fn logged_in_client(builder: ScriptedTransportBuilder) -> (ArrayClient, Arc<ScriptedTransport>) {
    let transport = builder
        .on(HttpMethod::Post, SESSION_PATH, login_ok("dev", 1))
        .build();
    let mut config = ArrayConfig::new(URL_A, "admin", "secret");
    config.logical_ips = vec!["192.168.10.5".to_string()];
    let client = ArrayClient::with_transport(config, transport.clone());
    client.login().await.expect("login");
    (client, transport)
}
