use std::fmt;

/// What kind of body a call expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Binary,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyKind::Json => f.write_str("JSON"),
            BodyKind::Binary => f.write_str("binary"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{status} {body}")]
    Status { status: u16, body: String },
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("expected a {expected} response from {path}")]
    UnexpectedBody { path: String, expected: BodyKind },
}

impl ApiError {
    /// HTTP status for non-success responses.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to read session file: {0}")]
    FileRead(#[source] std::io::Error),
    #[error("failed to write session file: {0}")]
    FileWrite(#[source] std::io::Error),
    #[error("failed to remove session file: {0}")]
    FileRemove(#[source] std::io::Error),
    #[error("failed to create session directory: {0}")]
    DirCreation(#[source] std::io::Error),
    #[error("failed to serialize session: {0}")]
    Serialization(#[source] serde_json::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
pub type SessionResult<T> = std::result::Result<T, SessionError>;
