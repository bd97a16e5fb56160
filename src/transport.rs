use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn, Instrument};
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One backend call, relative to the configured base url.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::Get, segments)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// `/api/events/42` style path, used for logs and error messages.
    pub fn path(&self) -> String {
        let mut out = String::new();
        for s in &self.segments {
            out.push('/');
            out.push_str(s);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolves to `Ok` only for 2xx responses.
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::ClientSetup(e.to_string()))?;
        Ok(Self::from_parts(client, config.base_url.clone()))
    }

    pub fn from_parts(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    pub fn url_for(&self, req: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(req.segments.iter().map(String::as_str));
        if !req.query.is_empty() {
            url.query_pairs_mut().extend_pairs(req.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, ApiError> {
        let path = req.path();
        let url = self.url_for(&req)?;
        let span = tracing::info_span!("backend_call", method = %req.method, path = %path);

        async move {
            let mut builder = self.client.request(req.method.into(), url);
            if let Some(body) = &req.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| {
                warn!(error = %e, "request failed");
                ApiError::Transport {
                    path: path.clone(),
                    message: e.to_string(),
                }
            })?;

            let status = response.status();
            let text = response.text().await.map_err(|e| ApiError::Transport {
                path: path.clone(),
                message: e.to_string(),
            })?;

            if status == reqwest::StatusCode::NOT_FOUND {
                debug!("not found");
                return Err(ApiError::NotFound { path });
            }
            if !status.is_success() {
                warn!(%status, "backend rejected request");
                return Err(ApiError::Status {
                    path,
                    status: status.as_u16(),
                });
            }

            debug!(%status, "response");
            Ok(ApiResponse {
                status: status.as_u16(),
                body: parse_body(&text),
            })
        }
        .instrument(span)
        .await
    }
}

/// Empty bodies become `null`; plain-text bodies are kept as a JSON string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
