pub mod client;
pub mod dto;
pub mod http;

pub use client::HostelApi;
pub use http::HttpBackend;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 from an expired token, 422 from a malformed one.
    pub fn is_session_expired(&self) -> bool {
        matches!(self.status(), Some(401) | Some(422))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message the server put in the error body, if any.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            token: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// Whatever came back, success or not. Bodies that are not JSON are dropped.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `error`, `message` or `msg`, in that order, as the backend uses all three.
    pub fn error_message(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        ["error", "message", "msg"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    }

    pub fn into_result(self) -> Result<Option<Value>, ApiError> {
        if self.is_success() {
            return Ok(self.body);
        }
        let message = self
            .error_message()
            .unwrap_or_else(|| format!("request failed with status {}", self.status));
        Err(ApiError::Status {
            status: self.status,
            message,
        })
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let body = self.into_result()?.unwrap_or(Value::Null);
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Decodes a JSON array one row at a time. Rows that do not fit `T` are
    /// logged and skipped so one bad record cannot empty the collection.
    pub fn decode_rows<T: DeserializeOwned>(self) -> Result<Vec<T>, ApiError> {
        let rows: Vec<Value> = self.decode()?;
        let total = rows.len();
        let decoded: Vec<T> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("skipping undecodable row: {}", e);
                    None
                }
            })
            .collect();
        if decoded.len() < total {
            warn!("decoded {} of {} rows", decoded.len(), total);
        }
        Ok(decoded)
    }
}

/// Transport seam between the client services and the hostel backend.
///
/// Implementations never fail on non-2xx statuses: those come back as an
/// `ApiResponse` so callers can look at the status. Only a missing response
/// is an error.
#[async_trait]
pub trait HostelBackend: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}
