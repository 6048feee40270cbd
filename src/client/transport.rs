//! HTTP Transport
//!
//! Owns the persistent HTTP session used to talk to the array and folds
//! every failure into an [`Envelope`].

use crate::constants::{ERROR_CONNECT_TO_SERVER, ERROR_MALFORMED_RESPONSE, SESSION_PATH};
use crate::domain::ports::{ArrayRequest, HttpMethod, Transport};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, CONTENT_TYPE};
use tracing::{debug, error, warn};

/// Header carrying the session token
pub const AUTH_TOKEN_HEADER: &str = "iBaseToken";

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// reqwest-backed transport
///
/// Certificate verification is disabled: arrays ship self-signed
/// certificates.
pub struct HttpTransport {
    client: RwLock<reqwest::Client>,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        warn!("Suppressing TLS certificate verification for array connections");
        Ok(Self {
            client: RwLock::new(Self::build_client()?),
        })
    }

    fn build_client() -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ArrayRequest) -> Envelope {
        let url = request.url();
        if !url.contains(SESSION_PATH) {
            debug!(
                "Request URL: {}\nCall Method: {}\nRequest Data: {:?}",
                url, request.method, request.body
            );
        }

        // reqwest::Client is a cheap handle; never hold the lock across await
        let client = self.client.read().clone();
        let mut builder = client
            .request(request.method.into(), url.as_str())
            .timeout(request.timeout);
        if let Some(token) = &request.token {
            builder = builder.header(AUTH_TOKEN_HEADER, token.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                error!("Bad response from server: {}. Error: {}", url, err);
                return Envelope::failure(ERROR_CONNECT_TO_SERVER, "Connect server error");
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(err) => {
                let status = err.status().map(|s| s.as_u16()).unwrap_or_default();
                return Envelope::failure(i64::from(status), err.to_string());
            }
        };

        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                error!("Bad response from server: {}. Error: {}", url, err);
                return Envelope::failure(ERROR_CONNECT_TO_SERVER, "Connect server error");
            }
        };

        match serde_json::from_str::<Envelope>(&text) {
            Ok(envelope) => {
                debug!("Response Data: {}", text);
                envelope
            }
            Err(err) => {
                error!("Undecodable response from {}: {}", url, err);
                Envelope::failure(
                    ERROR_MALFORMED_RESPONSE,
                    format!("Invalid response body: {}", err),
                )
            }
        }
    }

    fn reset(&self) {
        match Self::build_client() {
            Ok(client) => *self.client.write() = client,
            Err(e) => warn!("Keeping previous HTTP session: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(server: &MockServer, path: &str, method: HttpMethod) -> ArrayRequest {
        ArrayRequest::new(path, method, Duration::from_secs(5)).with_session(
            Some(format!("{}/deviceManager/rest/2102351", server.uri())),
            Some("tok-1".into()),
        )
    }

    #[tokio::test]
    async fn test_success_returns_envelope_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/deviceManager/rest/2102351/filesystem/7"))
            .and(header("iBaseToken", "tok-1"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"CAPACITY": 2097152})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": 0, "description": "0"},
                "data": {"ID": "7"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let envelope = transport
            .execute(
                request(&server, "/filesystem/7", HttpMethod::Put)
                    .with_body(Some(json!({"CAPACITY": 2097152}))),
            )
            .await;

        assert!(envelope.is_success());
        assert_eq!(envelope.data.unwrap()["ID"], "7");
    }

    #[tokio::test]
    async fn test_http_error_maps_status_into_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let envelope = transport
            .execute(request(&server, "/storagepool", HttpMethod::Get))
            .await;

        assert_eq!(envelope.code(), 503);
        assert!(!envelope.error.description.is_empty());
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_sentinel() {
        let transport = HttpTransport::new().unwrap();
        let envelope = transport
            .execute(ArrayRequest::new(
                "http://127.0.0.1:1/deviceManager/rest/xx/sessions",
                HttpMethod::Post,
                Duration::from_secs(2),
            ))
            .await;

        assert_eq!(envelope.code(), ERROR_CONNECT_TO_SERVER);
        assert_eq!(envelope.error.description, "Connect server error");
    }

    #[tokio::test]
    async fn test_relative_path_without_session_is_a_connect_failure() {
        let transport = HttpTransport::new().unwrap();
        let envelope = transport
            .execute(ArrayRequest::new("/filesystem", HttpMethod::Get, Duration::from_secs(2)))
            .await;

        assert_eq!(envelope.code(), ERROR_CONNECT_TO_SERVER);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        transport.reset();
        let envelope = transport
            .execute(request(&server, "/system/", HttpMethod::Get))
            .await;

        assert_eq!(envelope.code(), ERROR_MALFORMED_RESPONSE);
    }
}
