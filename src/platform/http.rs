//! `reqwest` transport carrying the platform session cookie.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, ClientBuilder, Proxy, Response};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::user_agent;

use super::{Endpoints, PlatformTransport, TransportError};

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default whole-request timeout.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Name of the platform's authentication cookie.
const SESSION_COOKIE: &str = "CAUTH";

/// HTTP implementation of [`PlatformTransport`].
///
/// The `CAUTH` cookie, when given, is registered for both the API host and the
/// notebook hub host so every request made through this client is authenticated.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport with the default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the client cannot be built or
    /// an endpoint base is not a valid URL.
    pub fn new(endpoints: &Endpoints, cauth: Option<&str>) -> Result<Self, TransportError> {
        Self::with_timeouts(
            endpoints,
            cauth,
            DEFAULT_CONNECT_TIMEOUT_SECS,
            DEFAULT_READ_TIMEOUT_SECS,
        )
    }

    /// Builds a transport with explicit timeouts in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the client cannot be built or
    /// an endpoint base is not a valid URL.
    pub fn with_timeouts(
        endpoints: &Endpoints,
        cauth: Option<&str>,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        if let Some(cauth) = cauth.map(str::trim).filter(|value| !value.is_empty()) {
            for base in [endpoints.api_base(), endpoints.notebook_base()] {
                let url = Url::parse(base).map_err(|e| TransportError::Request {
                    url: base.to_string(),
                    message: format!("invalid base URL: {e}"),
                })?;
                jar.add_cookie_str(&format!("{SESSION_COOKIE}={cauth}; Path=/"), &url);
            }
        } else {
            debug!("No session cookie configured; requests are anonymous");
        }

        let timeouts = Timeouts {
            connect: Duration::from_secs(connect_timeout_secs),
            read: Duration::from_secs(read_timeout_secs),
        };
        let client = build_client(timeouts, &jar).map_err(|message| TransportError::Request {
            url: endpoints.api_base().to_string(),
            message,
        })?;
        Ok(Self { client })
    }

    async fn decode(url: &str, response: Response) -> Result<Value, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::status(url, status.as_u16()));
        }
        let body = response.text().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PlatformTransport for HttpTransport {
    #[instrument(skip(self))]
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Self::decode(url, response).await
    }

    #[instrument(skip(self, body))]
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Self::decode(url, response).await
    }
}

#[derive(Debug, Clone, Copy)]
struct Timeouts {
    connect: Duration,
    read: Duration,
}

/// Builds the client; if reading the system proxy settings panics (seen in
/// restricted sandboxes) retries once with proxies taken from the environment.
fn build_client(timeouts: Timeouts, jar: &Arc<Jar>) -> Result<Client, String> {
    let attempt = |env_proxies_only: bool| {
        let jar = Arc::clone(jar);
        catch_unwind(AssertUnwindSafe(move || {
            let builder = Client::builder()
                .connect_timeout(timeouts.connect)
                .timeout(timeouts.read)
                .user_agent(user_agent::default_api_user_agent())
                .gzip(true)
                .cookie_provider(jar);
            let builder = if env_proxies_only {
                with_env_proxies(builder.no_proxy())
            } else {
                builder
            };
            builder.build()
        }))
    };

    let built = attempt(false).or_else(|_| {
        warn!("System proxy lookup panicked; building HTTP client with environment proxies");
        attempt(true)
    });
    match built {
        Ok(Ok(client)) => Ok(client),
        Ok(Err(error)) => Err(format!("HTTP client construction failed: {error}")),
        Err(_) => Err("HTTP client construction panicked".to_string()),
    }
}

fn with_env_proxies(mut builder: ClientBuilder) -> ClientBuilder {
    let https = env_proxy(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]);
    if let Some(proxy) = https.and_then(|url| Proxy::https(url).ok()) {
        builder = builder.proxy(proxy);
    }
    let http = env_proxy(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]);
    if let Some(proxy) = http.and_then(|url| Proxy::http(url).ok()) {
        builder = builder.proxy(proxy);
    }
    builder
}

fn env_proxy(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn transport_for(server: &MockServer, cauth: Option<&str>) -> HttpTransport {
        let endpoints = Endpoints::new(server.uri(), server.uri());
        HttpTransport::new(&endpoints, cauth).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_sends_session_cookie_and_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/adminUserPermissions.v1"))
            .and(header("cookie", "CAUTH=secret-token"))
            .and(header_regex("user-agent", "^coursedl/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": [{"id": 42}]})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server, Some("secret-token")).await;
        let url = format!("{}/api/adminUserPermissions.v1?q=my", server.uri());
        let value = transport.get_json(&url).await.unwrap();

        assert_eq!(value["elements"][0]["id"], 42);
    }

    #[tokio::test]
    async fn test_get_json_maps_status_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let transport = transport_for(&server, None).await;
        let err = transport
            .get_json(&format!("{}/api/anything", server.uri()))
            .await
            .unwrap_err();

        assert_eq!(err.http_status(), Some(403));
    }

    #[tokio::test]
    async fn test_get_json_rejects_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let transport = transport_for(&server, None).await;
        let err = transport
            .get_json(&format!("{}/page", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_post_json_sends_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/onDemandExamSessions.v1/"))
            .and(body_json(json!({"courseId": "c1", "itemId": "e1"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"elements": [{"id": "s1"}]})))
            .mount(&server)
            .await;

        let transport = transport_for(&server, None).await;
        let value = transport
            .post_json(
                &format!("{}/api/onDemandExamSessions.v1/", server.uri()),
                &json!({"courseId": "c1", "itemId": "e1"}),
            )
            .await
            .unwrap();

        assert_eq!(value["elements"][0]["id"], "s1");
    }

    #[test]
    fn test_new_rejects_invalid_base_with_cookie() {
        let endpoints = Endpoints::new("not a url", "also not");
        let err = HttpTransport::new(&endpoints, Some("x")).unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
    }
}
