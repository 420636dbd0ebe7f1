//! HTTP transport to the remote simulation server.
//!
//! [`Transport`] turns one command into exactly one HTTP request and
//! returns either the decoded JSON body or a typed [`ClientError`]. It
//! does not retry, does not queue and holds no game state; preventing
//! overlapping requests from corrupting the cache is the store's job.

use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Error body returned by the simulation server on rejection.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

/// `detail` is a string for domain rejections and a list of field errors
/// for request validation failures.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, serde::Deserialize)]
struct FieldError {
    msg: String,
}

/// Thin JSON-over-HTTP client bound to one server.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: Url,
}

impl Transport {
    /// Create a transport for the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL does not parse or
    /// the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.server_url)
            .map_err(|e| ClientError::Config(format!("invalid server URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "server URL cannot carry paths: {}",
                config.server_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// The server's base URL.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET` a resource.
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        self.send(Method::GET, segments, query, None::<&()>).await
    }

    /// `POST` a JSON body.
    pub async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, segments, &[], Some(body)).await
    }

    /// `POST` without a body.
    pub async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        self.send(Method::POST, segments, &[], None::<&()>).await
    }

    /// `PUT` a JSON body.
    pub async fn put<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, segments, &[], Some(body)).await
    }

    /// `DELETE` a resource.
    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        self.send(Method::DELETE, segments, &[], None::<&()>).await
    }

    /// Resolve path segments against the base URL, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Config("server URL cannot carry paths".to_owned()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let path = url.path().to_owned();

        let mut request = self.client.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("{method} {path} failed: {e}")))?;

        let status = response.status();
        debug!(method = %method, path = %path, status = status.as_u16(), "simulation request completed");

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let reason = status.canonical_reason().unwrap_or("request failed");
            return Err(ClientError::Request {
                status: status.as_u16(),
                detail: extract_detail(&error_body).unwrap_or_else(|| reason.to_owned()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(format!("{method} {path} body read failed: {e}")))?;

        decode_body(&bytes).map_err(|e| ClientError::Decode(format!("{method} {path}: {e}")))
    }
}

/// Decode a success body. An empty body is read as `{}` so fire-and-forget
/// endpoints that return nothing still decode into defaulted structs.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(b"{}")
    } else {
        serde_json::from_slice(bytes)
    }
}

/// Pull the human-readable message out of a `{detail: ...}` error body.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let detail = match parsed.detail {
        ErrorDetail::Message(message) => message,
        ErrorDetail::Fields(fields) => fields
            .into_iter()
            .map(|f| f.msg)
            .collect::<Vec<_>>()
            .join("; "),
    };
    if detail.trim().is_empty() {
        None
    } else {
        Some(detail)
    }
}
