//! The network seam under the gateway.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::REFRESH_PATH;
use crate::api::error::ClientError;
use crate::config::ApiConfig;

/// Descriptor of one API call, before authentication is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Send the cookie jar along (refresh-token cookie)
    pub with_credentials: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            with_credentials: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        let value =
            serde_json::to_value(body).map_err(|e| ClientError::decode("request body", e))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn with_credentials(mut self) -> Self {
        self.with_credentials = true;
        self
    }
}

/// Percent-encode a caller-supplied id so it stays a single path segment.
///
/// `.` and `..` would be collapsed by URL parsing and are refused.
pub fn path_segment(value: &str) -> Result<String, ClientError> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(ClientError::Validation {
            message: format!("'{}' is not a valid identifier", value),
        });
    }

    let mut scratch = Url::parse("http://segment.invalid/")
        .map_err(|e| ClientError::Config(format!("segment encoder: {}", e)))?;
    scratch
        .path_segments_mut()
        .map_err(|_| ClientError::Config("segment encoder has no path".to_string()))?
        .clear()
        .push(value);
    Ok(scratch.path().trim_start_matches('/').to_string())
}

/// Status and raw body of a completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self {
            status,
            body: Bytes::from(value.to_string()),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request, attaching `bearer` as the Authorization token.
    ///
    /// Only transport failures are errors; every HTTP status is a response.
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, ClientError>;

    /// `Cookie` header currently held for the API, for persistence.
    fn cookie_header(&self) -> Option<String> {
        None
    }

    /// Forget all cookies.
    fn clear_cookies(&self) {}
}

/// reqwest-backed transport with a cookie jar scoped to the API origin.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    base_path: String,
    jar: RwLock<Arc<Jar>>,
}

impl HttpTransport {
    /// Build a transport; `cookies` is a previously persisted `Cookie` header.
    pub fn new(config: &ApiConfig, cookies: Option<&str>) -> Result<Self, ClientError> {
        let base_url = config.base_url().trim_end_matches('/').to_string();
        let base_path = Url::parse(&base_url)
            .map_err(|e| {
                ClientError::Config(format!("invalid API base URL '{}': {}", base_url, e))
            })?
            .path()
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        let transport = Self {
            client,
            base_url,
            base_path,
            jar: RwLock::new(Arc::new(Jar::default())),
        };

        if let Some(cookies) = cookies {
            transport.seed_cookies(cookies)?;
        }

        Ok(transport)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an API path under the base URL. The result never leaves the
    /// base path and carries no query or fragment of its own.
    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let url = Url::parse(&joined)
            .map_err(|e| ClientError::Config(format!("invalid request URL '{}': {}", joined, e)))?;

        let base_path = self.base_path.trim_end_matches('/');
        let inside_base = url
            .path()
            .strip_prefix(base_path)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
        if !inside_base || url.query().is_some() || url.fragment().is_some() {
            return Err(ClientError::Validation {
                message: format!("request path '{}' is not a plain API path", path),
            });
        }
        Ok(url)
    }

    fn seed_cookies(&self, header: &str) -> Result<(), ClientError> {
        let url = self.url_for(REFRESH_PATH)?;
        let jar = self.jar.read().clone();
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            jar.add_cookie_str(&format!("{}; Path=/", pair), &url);
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, ClientError> {
        let url = self.url_for(&request.path)?;
        let jar = self.jar.read().clone();

        let mut builder = self.client.request(request.method.clone(), url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if request.with_credentials {
            if let Some(cookies) = jar.cookies(&url) {
                builder = builder.header(COOKIE, cookies);
            }
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        jar.set_cookies(&mut response.headers().get_all(SET_COOKIE).iter(), &url);

        let body = response.bytes().await?;
        tracing::trace!(status = %status, bytes = body.len(), "Response received");

        Ok(HttpResponse { status, body })
    }

    fn cookie_header(&self) -> Option<String> {
        let url = self.url_for(REFRESH_PATH).ok()?;
        let jar = self.jar.read().clone();
        jar.cookies(&url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    fn clear_cookies(&self) {
        *self.jar.write() = Arc::new(Jar::default());
    }
}
