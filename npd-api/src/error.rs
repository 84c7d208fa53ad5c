use npd_auth::AuthError;
use reqwest::StatusCode;
use reqwest::header::InvalidHeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NpdApiError {
    /// Not enough information to authenticate: no account id, or no stored
    /// access/refresh token for it.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The tax service rejected a login or refresh attempt.
    #[error("Authentication failed (HTTP {status}): {detail}")]
    Authentication {
        status: StatusCode,
        detail: ErrorDetail,
    },

    /// A business endpoint answered with a non-2xx status.
    #[error("API error (HTTP {status}): {detail}")]
    Api {
        status: StatusCode,
        detail: ErrorDetail,
    },

    #[error("Token error: {0}")]
    Token(#[from] AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NpdApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

/// Error body reported by the server: `{code, message}` when it parses as
/// JSON, the raw text otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    Server(ServerError),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    pub code: String,
    pub message: String,
}

impl ErrorDetail {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str::<ServerError>(body)
            .map(Self::Server)
            .unwrap_or_else(|_| Self::Raw(body.to_string()))
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Server(error) => Some(&error.code),
            Self::Raw(_) => None,
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server(error) => write!(f, "#{}: {}", error.code, error.message),
            Self::Raw(body) => f.write_str(body),
        }
    }
}
