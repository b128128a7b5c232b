use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use validator::ValidationErrors;

use crate::db::store::StoreError;
use crate::qr::RenderError;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Bad or missing input, rejected before any render or persistence work.
    Validation(String),
    /// Unknown or deactivated short id. Both look the same from outside.
    NotFound(String),
    Encoding(String),
    Render(String),
    Persistence(String),
}

impl AppError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn persistence<T: Into<String>>(msg: T) -> Self {
        AppError::Persistence(msg.into())
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation Error",
            AppError::NotFound(_) => "Not Found",
            AppError::Encoding(_) => "Encoding Error",
            AppError::Render(_) => "Render Error",
            AppError::Persistence(_) => "Persistence Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Encoding(msg)
            | AppError::Render(msg)
            | AppError::Persistence(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Encoding(_) | AppError::Render(_) | AppError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(serde_json::json!({ "error": self.message() }))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Encoding(msg) => AppError::Encoding(msg),
            RenderError::Render(msg) => AppError::Render(msg),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .map(|e| match &e.message {
                Some(msg) => msg.to_string(),
                None => e.code.to_string(),
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::Render(format!("Render task failed: {}", err))
    }
}
