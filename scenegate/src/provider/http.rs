//! HTTP client abstraction for testability

use std::fmt;
use std::io::Read;

use super::types::UpstreamError;

/// HTTP method of an upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An authenticated request to the provider.
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Basic-auth username; the password is always empty.
    pub username: String,
    /// JSON request body, sent with `Content-Type: application/json`.
    pub json_body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            username: username.into(),
            json_body: None,
        }
    }

    /// Creates a POST request carrying a JSON body.
    pub fn post_json(url: impl Into<String>, username: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            username: username.into(),
            json_body: Some(body),
        }
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("username", &"<redacted>")
            .field("json_body", &self.json_body.as_ref().map(|b| b.len()))
            .finish()
    }
}

/// Status and unread body of an upstream response.
///
/// The body is read lazily. Dropping the response releases the underlying
/// connection, whether or not the body was consumed.
pub struct HttpResponse {
    status: u16,
    body: Box<dyn Read + Send>,
}

impl HttpResponse {
    /// Wraps a status code and a body reader.
    pub fn new(status: u16, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Takes ownership of the body reader.
    pub fn into_body(self) -> Box<dyn Read + Send> {
        self.body
    }

    /// Reads the whole body into memory.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, UpstreamError> {
        let mut buf = Vec::new();
        self.body
            .read_to_end(&mut buf)
            .map_err(|e| UpstreamError::Transport(format!("Failed to read response: {}", e)))?;
        Ok(buf)
    }

    /// Reads at most `limit` bytes of the body as lossy UTF-8, for logging.
    pub fn excerpt(mut self, limit: usize) -> String {
        let mut buf = Vec::new();
        // Best effort; a broken body is already an error path
        let _ = (&mut self.body).take(limit as u64).read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns the response, whatever its status.
    ///
    /// Only failures to complete the exchange are errors; interpreting the
    /// status code is left to the caller.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, UpstreamError>;
}

/// Real HTTP client implementation using reqwest.
///
/// Uses reqwest's default timeouts. The underlying connection pool is shared
/// by every request made through one instance.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, UpstreamError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("scenegate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                UpstreamError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Builds the reqwest request without sending it.
    fn build_request(&self, request: HttpRequest) -> reqwest::Result<reqwest::blocking::Request> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .basic_auth(&request.username, Some(""));

        if let Some(body) = request.json_body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        builder.build()
    }
}

impl HttpClient for ReqwestClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, UpstreamError> {
        let request = self
            .build_request(request)
            .map_err(|e| UpstreamError::Transport(format!("Invalid request: {}", e)))?;

        let response = self
            .client
            .execute(request)
            .map_err(|e| UpstreamError::Transport(format!("Request failed: {}", e)))?;

        Ok(HttpResponse::new(response.status().as_u16(), response))
    }
}
