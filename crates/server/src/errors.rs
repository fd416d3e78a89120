use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use service::errors::ServiceError;
use service::storage::StoreError;
use thiserror::Error;
use tracing::error;

/// RPC status carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    InvalidArgument,
    NotFound,
    Unavailable,
    DeadlineExceeded,
    Internal,
}

impl Code {
    pub fn http_status(self) -> StatusCode {
        match self {
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct RpcError {
    pub code: Code,
    pub message: String,
}

impl RpcError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }
}

impl From<ServiceError> for RpcError {
    fn from(e: ServiceError) -> Self {
        let code = match &e {
            ServiceError::Validation(_) | ServiceError::Conflict(_) => Code::InvalidArgument,
            ServiceError::NotFound(_) => Code::NotFound,
            ServiceError::Store(StoreError::Backend(_)) => Code::Unavailable,
            ServiceError::Store(StoreError::Timeout(_)) => Code::DeadlineExceeded,
            ServiceError::Model(_) => Code::Internal,
        };
        let message = match &e {
            ServiceError::Validation(m) | ServiceError::Conflict(m) | ServiceError::NotFound(m) => m.clone(),
            other => other.to_string(),
        };
        if !matches!(code, Code::InvalidArgument | Code::NotFound) {
            error!(code = e.code(), error = %e, "rpc failed");
        }
        Self { code, message }
    }
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_argument(rejection.body_text())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        (status, Json(serde_json::json!({"code": self.code, "message": self.message}))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
