//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid schema name: {0}")]
    InvalidSchema(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequestFormat(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{message}")]
    MissingField {
        message: String,
        object: Option<Value>,
    },
    #[error("{0}")]
    EmptyInput(String),
    #[error("Invalid capacity")]
    InvalidCapacity(Value),
    #[error("Invalid unit, should be string with letters only")]
    InvalidUnit(Value),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    pub fn missing_field(message: impl Into<String>) -> Self {
        AppError::MissingField {
            message: message.into(),
            object: None,
        }
    }

    /// Short machine-readable code used in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequestFormat(_) => "invalid_request_format",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::MissingField { .. } => "missing_field",
            AppError::EmptyInput(_) => "empty_input",
            AppError::InvalidCapacity(_) => "invalid_capacity",
            AppError::InvalidUnit(_) => "invalid_unit",
            AppError::NotFound(_) => "not_found",
            AppError::Db(_) => "database_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequestFormat(_)
            | AppError::MissingField { .. }
            | AppError::EmptyInput(_)
            | AppError::InvalidCapacity(_)
            | AppError::InvalidUnit(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The candidate object that failed validation, if any.
    pub fn invalid_object(&self) -> Option<&Value> {
        match self {
            AppError::MissingField { object, .. } => object.as_ref(),
            AppError::InvalidCapacity(v) | AppError::InvalidUnit(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                details: self.invalid_object().cloned(),
            },
        };
        (status, Json(body)).into_response()
    }
}
