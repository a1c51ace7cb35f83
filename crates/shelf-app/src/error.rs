use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::error;

pub type Error = anyhow::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of error responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::StorageUnavailable(_) => "storage_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::Validation(m)
            | ApiError::Conflict(m)
            | ApiError::NotFound(m)
            | ApiError::StorageUnavailable(m)
            | ApiError::Internal(m) => m,
        }
    }
}

impl From<shelf_dal::Error> for ApiError {
    fn from(value: shelf_dal::Error) -> Self {
        use shelf_dal::Error as DalError;
        match value {
            DalError::InvalidRating(_) => ApiError::Validation(value.to_string()),
            DalError::Conflict(msg) => ApiError::Conflict(msg),
            DalError::RecordNotFound(msg) => ApiError::NotFound(msg),
            DalError::StorageUnavailable(_) => {
                ApiError::StorageUnavailable(value.to_string())
            }
            DalError::DatabaseError(_) | DalError::MigrationError(_) => {
                ApiError::Internal(value.to_string())
            }
        }
    }
}

impl From<garde::Report> for ApiError {
    fn from(value: garde::Report) -> Self {
        ApiError::Validation(value.to_string().trim().to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal(_) | ApiError::StorageUnavailable(_) => {
                error!("Request failed: {self}")
            }
            _ => tracing::debug!("Request rejected: {self}"),
        }
        let body = ErrorBody {
            error: self.kind().to_string(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dal_error_mapping() {
        let e: ApiError = shelf_dal::Error::RecordNotFound("Book 1".into()).into();
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        let e: ApiError = shelf_dal::Error::Conflict("ISBN A1 already exists".into()).into();
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
        let e: ApiError = shelf_dal::Error::InvalidRating(6).into();
        assert_eq!(e.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let e: ApiError = shelf_dal::Error::StorageUnavailable(shelf_dal::SqlxError::PoolTimedOut).into();
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let e: ApiError = shelf_dal::Error::DatabaseError(shelf_dal::SqlxError::RowNotFound).into();
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ApiError::NotFound("Book 7".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "not_found");
        assert_eq!(body.message, "Book 7");
    }
}
