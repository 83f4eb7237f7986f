//! Error values crossing the storage and HTTP boundaries.
//!
//! Storage functions return [`StorageError`]; handlers turn it into an
//! [`ApiError`], which is the only place an HTTP status is chosen. Database
//! details are logged here and never echoed to callers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use super::validation::FieldError;

const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
const SQLSTATE_INTEGRITY_CLASS: &str = "23";

pub(crate) const INTEGRITY_MESSAGE: &str = "An error occurred while inserting data into the database.";
pub(crate) const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// Body of every non-validation error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Body of `422` responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationDetail {
    pub detail: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unique constraint {} violated", .constraint.as_deref().unwrap_or("<unknown>"))]
    UniqueViolation { constraint: Option<String> },
    #[error("{0}")]
    MissingReference(String),
    #[error("integrity constraint violated: {0}")]
    Integrity(sqlx::Error),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        let code = match &err {
            sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
            _ => None,
        };

        match code.as_deref() {
            Some(SQLSTATE_UNIQUE_VIOLATION) => {
                let constraint = match &err {
                    sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
                    _ => None,
                };
                Self::UniqueViolation { constraint }
            }
            Some(code) if code.starts_with(SQLSTATE_INTEGRITY_CLASS) => Self::Integrity(err),
            _ => Self::Database(err),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<FieldError>),
    BadRequest(String),
    NotFound(String),
    Conflict { status: StatusCode, message: String },
    Integrity,
    Internal,
}

impl From<StorageError> for ApiError {
    /// Maps storage failures that handlers did not treat specially.
    /// Unique violations reaching this point are unexpected and reported like other integrity errors.
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MissingReference(message) => Self::BadRequest(message),
            StorageError::UniqueViolation { .. } | StorageError::Integrity(_) => {
                error!("Integrity error: {err}");
                Self::Integrity
            }
            StorageError::Database(_) => {
                error!("Database error: {err}");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationDetail { detail: errors }),
            )
                .into_response(),
            Self::BadRequest(message) => detail(StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => detail(StatusCode::NOT_FOUND, message),
            Self::Conflict { status, message } => detail(status, message),
            Self::Integrity => detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                INTEGRITY_MESSAGE.to_string(),
            ),
            Self::Internal => detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_MESSAGE.to_string(),
            ),
        }
    }
}

fn detail(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorDetail { detail: message })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Result<Value> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[tokio::test]
    async fn not_found_renders_detail() -> Result<()> {
        let response = ApiError::NotFound("missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await?;
        assert_eq!(body["detail"], "missing");
        Ok(())
    }

    #[tokio::test]
    async fn conflict_uses_carried_status() -> Result<()> {
        let response = ApiError::Conflict {
            status: StatusCode::SEE_OTHER,
            message: "duplicate".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let body = body_json(response).await?;
        assert_eq!(body["detail"], "duplicate");
        Ok(())
    }

    #[tokio::test]
    async fn validation_renders_field_list() -> Result<()> {
        let response = ApiError::Validation(vec![FieldError::new(
            vec!["body".to_string(), "nome".to_string()],
            "nome is required",
            "missing",
        )])
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await?;
        assert_eq!(body["detail"][0]["loc"][1], "nome");
        assert_eq!(body["detail"][0]["type"], "missing");
        Ok(())
    }

    #[tokio::test]
    async fn database_errors_do_not_leak_details() -> Result<()> {
        let err = StorageError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StorageError::Database(_)));

        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await?;
        assert_eq!(body["detail"], INTERNAL_MESSAGE);
        Ok(())
    }

    #[tokio::test]
    async fn integrity_renders_generic_message() -> Result<()> {
        let response = ApiError::Integrity.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await?;
        assert_eq!(body["detail"], INTEGRITY_MESSAGE);
        Ok(())
    }

    #[tokio::test]
    async fn missing_reference_is_bad_request() -> Result<()> {
        let response =
            ApiError::from(StorageError::MissingReference("no such row".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await?;
        assert_eq!(body["detail"], "no such row");
        Ok(())
    }

    #[test]
    fn unique_violation_display_names_constraint() {
        let err = StorageError::UniqueViolation {
            constraint: Some("categorias_nome_key".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "unique constraint categorias_nome_key violated"
        );
    }
}
