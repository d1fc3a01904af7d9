use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

fn public_message(log_message: &str, public: &str) -> String {
    if is_production() {
        public.to_string()
    } else {
        log_message.to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let log_message = self.to_string();

        let (status, code, client_message) = match &self {
            AppError::Template(TemplateError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                "TEMPLATE_NOT_FOUND",
                public_message(&log_message, "Page not found"),
            ),
            AppError::Template(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                template_error_code(err),
                public_message(&log_message, "Internal server error"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                public_message(&log_message, "Internal server error"),
            ),
        };

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %log_message,
            "Request failed"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

fn template_error_code(err: &TemplateError) -> &'static str {
    match err {
        TemplateError::SourceNotFound(_) => "TEMPLATE_SOURCE_NOT_FOUND",
        TemplateError::Syntax { .. } => "TEMPLATE_SYNTAX_ERROR",
        TemplateError::NotFound(_) => "TEMPLATE_NOT_FOUND",
        TemplateError::Execution { .. } => "TEMPLATE_EXECUTION_ERROR",
        TemplateError::Write(_) => "TEMPLATE_WRITE_ERROR",
        TemplateError::Io { .. } => "TEMPLATE_IO_ERROR",
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
