//! Low-level HTTP wrapper.
//!
//! One request, one response: every call goes to the configured base URL with a JSON
//! content-type header and, when the session holds one, a bearer token. There is no retry,
//! timeout or cache. Non-success statuses become [`ApiError::Status`] carrying the body text.
//! Successful responses are negotiated on their content type: anything containing
//! `application/json` is parsed, everything else is handed back as bytes.

use crate::error::{ApiError, ApiResult, BodyKind};
use crate::session::Session;
use pharm_core::ClientConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A non-JSON response body, e.g. a CSV export or a PDF.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decoded response body.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiBody {
    Json(serde_json::Value),
    Binary(Download),
}

impl ApiBody {
    pub fn kind(&self) -> BodyKind {
        match self {
            ApiBody::Json(_) => BodyKind::Json,
            ApiBody::Binary(_) => BodyKind::Binary,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl HttpClient {
    pub fn new(config: &ClientConfig, session: Session) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self {
            http,
            base_url: config.api_base().to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sends one request and negotiates the response body.
    pub async fn request<B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<ApiBody>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, path, "api request");

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(ApiError::Encode)?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(|source| {
            tracing::warn!(%method, path, "api transport failure: {}", source);
            ApiError::Transport {
                path: path.to_string(),
                source,
            }
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            tracing::warn!(%method, path, status = status.as_u16(), "api error response");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        negotiate(path, content_type, bytes.to_vec())
    }

    pub async fn get(&self, path: &str) -> ApiResult<ApiBody> {
        self.request::<()>(Method::GET, path, None).await
    }

    /// Sends a request and decodes a JSON response into `T`.
    pub async fn json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        match self.request(method, path, body).await? {
            ApiBody::Json(value) => serde_json::from_value(value).map_err(|source| {
                ApiError::Decode {
                    path: path.to_string(),
                    source,
                }
            }),
            ApiBody::Binary(_) => Err(ApiError::UnexpectedBody {
                path: path.to_string(),
                expected: BodyKind::Json,
            }),
        }
    }

    /// Sends a request whose response body is not needed beyond success.
    pub async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.request(method, path, body).await.map(|_| ())
    }

    /// Fetches a binary download.
    pub async fn download(&self, path: &str) -> ApiResult<Download> {
        match self.get(path).await? {
            ApiBody::Binary(download) => Ok(download),
            ApiBody::Json(_) => Err(ApiError::UnexpectedBody {
                path: path.to_string(),
                expected: BodyKind::Binary,
            }),
        }
    }
}

fn negotiate(path: &str, content_type: Option<String>, bytes: Vec<u8>) -> ApiResult<ApiBody> {
    let is_json = content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("application/json"));

    if !is_json {
        return Ok(ApiBody::Binary(Download {
            content_type,
            bytes,
        }));
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiBody::Json(serde_json::Value::Null));
    }

    serde_json::from_slice(&bytes)
        .map(ApiBody::Json)
        .map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
}
