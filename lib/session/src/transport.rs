//! Outbound request transport.
//!
//! The transport executes one request against the remote API and hands
//! back the raw response. It knows nothing about sessions; the store is
//! responsible for decorating requests with the `Authorization` header
//! before they reach this layer. Keeping the transport behind a trait
//! lets tests script the identity endpoint without a network.

use crate::error::TransportError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::instrument;

pub use reqwest::{Method, StatusCode};

/// Caller-supplied options for an authorized request.
///
/// Defaults to a bare GET. Any `Authorization` header set here is
/// discarded: the store's credential always wins.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Additional headers, applied in order.
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<JsonValue>,
}

impl RequestOptions {
    /// Creates options for a GET request.
    #[must_use]
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates options for a POST request.
    #[must_use]
    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::get()
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// A fully assembled outbound request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL (e.g. `/auth/login`).
    pub path: String,
    /// Headers, applied in order.
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<JsonValue>,
}

impl ApiRequest {
    /// Assembles a request from a path and caller options.
    #[must_use]
    pub fn from_options(path: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            method: options.method,
            path: path.into(),
            headers: options.headers,
            body: options.body,
        }
    }

    /// Returns the value of a header, if present (name compared
    /// case-insensitively, last occurrence wins).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The raw response to an [`ApiRequest`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Creates a response from a status and body.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decodes the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::Decode {
            details: e.to_string(),
        })
    }
}

/// Executes requests against the remote API.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Sends the request and returns the raw response.
    ///
    /// An `Err` means no response was obtained at all (connection
    /// failure, timeout); rejection statuses come back as `Ok`.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport against a fixed API base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for the given base URL.
    ///
    /// Trailing slashes on the base URL are trimmed so request paths can
    /// always be written with a leading slash.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::ClientBuild {
                details: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method, url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| TransportError::Request {
            details: e.to_string(),
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body {
                details: e.to_string(),
            })?
            .to_vec();

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_bare_get() {
        let options = RequestOptions::default();
        assert_eq!(options.method, Method::GET);
        assert!(options.headers.is_empty());
        assert!(options.body.is_none());
    }

    #[test]
    fn request_header_lookup_is_case_insensitive() {
        let request = ApiRequest::from_options(
            "/projects",
            RequestOptions::get().with_header("X-Custom", "1"),
        );
        assert_eq!(request.header("x-custom"), Some("1"));
        assert_eq!(request.header("missing"), None);
    }

    #[test]
    fn response_json_decodes_body() {
        let response = ApiResponse::new(StatusCode::OK, r#"{"msg":"ok"}"#);
        let value: serde_json::Value = response.json().expect("decode");
        assert_eq!(value["msg"], "ok");
    }

    #[test]
    fn response_json_reports_decode_failure() {
        let response = ApiResponse::new(StatusCode::OK, "not json");
        let result: Result<serde_json::Value, _> = response.json();
        assert!(matches!(result, Err(TransportError::Decode { .. })));
    }

    #[test]
    fn transport_trims_trailing_slash() {
        let transport = HttpTransport::new("https://api.example.com/").expect("build");
        assert_eq!(transport.base_url(), "https://api.example.com");
    }
}
