//! Misskey REST API Client
//!
//! Misskey and its forks expose every API call as `POST {base}/api/{endpoint}` with a
//! JSON body, including read-only introspection calls. Admin endpoints additionally
//! need a bearer token.
//!
//! # Architecture
//!
//! - [`Transport`] is the seam the collectors are written against, so the whole
//!   collection pass can run against a scripted double in tests.
//! - [`ApiClient`] is the production implementation on top of `reqwest`.
//! - [`fetch`] collapses any transport error into the uniform [`ApiResponse`]
//!   envelope the collectors consume; richer error kinds stay available to callers
//!   of [`Transport::request`] (the endpoint validation tool).
//!
//! # Example
//!
//! ```no_run
//! use fedi_exporter::config::ApiConfig;
//! use fedi_exporter::fedi::{ApiClient, RequestOptions, Transport};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ApiClient::new(&ApiConfig::default())?;
//! let meta = client.request("meta", &RequestOptions::public()).await?;
//! println!("{}", meta["version"]);
//! # Ok(())
//! # }
//! ```

use crate::config::ApiConfig;
use crate::error::{ExporterError, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-call options
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Fail before any I/O if no token is configured
    pub requires_auth: bool,
    /// JSON body; `{}` is sent when `None` and the method is POST
    pub body: Option<Value>,
    pub method: Method,
}

impl RequestOptions {
    /// Anonymous POST with an empty body
    pub fn public() -> Self {
        Self {
            requires_auth: false,
            body: None,
            method: Method::POST,
        }
    }

    /// Token-authenticated POST with an empty body
    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            ..Self::public()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::public()
    }
}

/// Uniform result envelope: `success` is false for any failure, whatever the cause
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn failed() -> Self {
        Self::default()
    }
}

/// Something that can call an API endpoint and return its decoded JSON body
pub trait Transport: Send + Sync {
    fn request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Call `endpoint`, logging and collapsing any failure to `success: false`.
///
/// A JSON `null` body counts as a successful call without data.
pub async fn fetch<T: Transport>(
    transport: &T,
    endpoint: &str,
    options: &RequestOptions,
) -> ApiResponse {
    match transport.request(endpoint, options).await {
        Ok(Value::Null) => ApiResponse {
            success: true,
            data: None,
        },
        Ok(data) => ApiResponse {
            success: true,
            data: Some(data),
        },
        Err(e) => {
            warn!("Error fetching {}: {}", endpoint, e);
            ApiResponse::failed()
        }
    }
}

/// Strip one leading slash so `"/meta"` and `"meta"` address the same endpoint
pub fn normalize_endpoint(endpoint: &str) -> &str {
    endpoint.strip_prefix('/').unwrap_or(endpoint)
}

/// Whether the path lives in the admin namespace, which always needs the token
pub fn is_admin_endpoint(endpoint: &str) -> bool {
    let endpoint = normalize_endpoint(endpoint);
    endpoint.starts_with("admin/") || endpoint.contains("/admin/")
}

/// HTTP client for a Misskey-compatible instance
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("fedi-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Full URL for an endpoint
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, normalize_endpoint(endpoint))
    }

    /// Bearer value for a call, or an auth error if one is needed and missing
    fn bearer(&self, endpoint: &str, options: &RequestOptions) -> Result<Option<String>> {
        if !(options.requires_auth || is_admin_endpoint(endpoint)) {
            return Ok(None);
        }
        match &self.token {
            Some(token) => Ok(Some(format!("Bearer {}", token.expose_secret().trim()))),
            None => Err(ExporterError::Auth(format!(
                "API token is required for {} but not configured",
                normalize_endpoint(endpoint)
            ))),
        }
    }

    async fn execute(&self, endpoint: &str, options: &RequestOptions) -> Result<Value> {
        let bearer = self.bearer(endpoint, options)?;
        let url = self.endpoint_url(endpoint);

        let mut request = self
            .http
            .request(options.method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(bearer) = bearer {
            request = request.header(AUTHORIZATION, bearer);
        }
        if options.method != Method::GET {
            let body = options
                .body
                .clone()
                .unwrap_or_else(|| Value::Object(Default::default()));
            request = request.body(serde_json::to_vec(&body)?);
        }

        debug!("Fetching {} {}", options.method, url);
        let response = request.send().await?;
        let status = response.status();
        debug!("{} responded with {}", url, status);

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ExporterError::HttpStatus {
                endpoint: normalize_endpoint(endpoint).to_string(),
                status: status.as_u16(),
                code: error_code(&text),
            });
        }

        // An empty body fails to decode; only a literal `null` is a call without data
        Ok(serde_json::from_str(&text)?)
    }
}

impl Transport for ApiClient {
    fn request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Value>> + Send {
        self.execute(endpoint, options)
    }
}

/// Extract `error.code` from a Misskey error body
fn error_code(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("code")?
        .as_str()
        .map(str::to_string)
}
