use rocket::http::Status;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;

/// Crate-wide error taxonomy. Every HTTP handler returns `Result<_, AppError>`; the
/// `Responder` impl below turns a variant into the `{code, message}` body the chat
/// front-end expects.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("overloaded")]
    Overloaded,

    #[error("transient error: {0}")]
    Transient(String),

    #[error("internal error")]
    Internal(anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    fn status(&self) -> Status {
        match self {
            AppError::Validation(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::Conflict(_) => Status::Conflict,
            AppError::Forbidden(_) => Status::Forbidden,
            AppError::Overloaded => Status::ServiceUnavailable,
            AppError::Transient(_) => Status::ServiceUnavailable,
            AppError::Internal(_) => Status::InternalServerError,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Forbidden(_) => "forbidden",
            AppError::Overloaded => "overloaded",
            AppError::Transient(_) => "transient",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        if matches!(self, AppError::Internal(_)) {
            tracing::error!(error = %self, "internal error handling request");
        } else {
            tracing::warn!(error = %self, "request failed");
        }
        let body = ErrorBody {
            code: self.code(),
            message: self.message(),
        };
        Response::build_from(Json(body).respond_to(request)?)
            .status(self.status())
            .ok()
    }
}

/// Maps sqlx errors onto the taxonomy: missing rows become `NotFound`, unique-constraint
/// violations become `Conflict`, everything else is `Internal`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if msg.contains("UNIQUE constraint failed") {
                    AppError::Conflict(msg.to_string())
                } else {
                    AppError::Internal(anyhow::anyhow!(err.to_string()))
                }
            }
            _ => AppError::Internal(anyhow::anyhow!(err.to_string())),
        }
    }
}

/// `db::*` helpers return `anyhow::Result` (their `.context(...)` calls wrap the underlying
/// `sqlx::Error`), so a unique-constraint violation reaches here still recoverable by
/// downcasting rather than as a bare `sqlx::Error`. Without this, every db-layer conflict
/// would flatten to a 500.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
            if db_err.message().contains("UNIQUE constraint failed") {
                return AppError::Conflict(db_err.message().to_string());
            }
        }
        AppError::Internal(err)
    }
}
