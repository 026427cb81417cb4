use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Map, Value};
use tracing::{error, warn};

use crate::request::FieldError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Restaurant not found")]
    RestaurantNotFound,
    #[error("Not found")]
    NotFound,
    #[error("{field}: {message}")]
    Field {
        field: &'static str,
        message: &'static str,
    },
    #[error("validation errors")]
    Validation,
    #[error("Invalid pizza_id or restaurant_id")]
    InvalidReference,
    #[error("Service unavailable")]
    Unavailable,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Maps a failed association write. Anything the database rejected is
    /// reported as a validation error; only an unreachable database differs.
    pub fn from_write(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(_) | StoreError::Query(_) => {
                warn!(error = %err, "restaurant pizza write rejected");
                ApiError::Validation
            }
            other => other.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => {
                warn!(error = %err, "database unavailable");
                ApiError::Unavailable
            }
            _ => {
                error!(error = %err, "store failure");
                ApiError::Internal
            }
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        ApiError::Field {
            field: err.field,
            message: err.message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::RestaurantNotFound | ApiError::NotFound => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            ApiError::Field { field, message } => {
                let mut fields = Map::new();
                fields.insert(field.to_string(), Value::from(*message));
                (StatusCode::BAD_REQUEST, json!({ "message": fields }))
            }
            ApiError::Validation | ApiError::InvalidReference => {
                (StatusCode::BAD_REQUEST, json!({ "errors": [self.to_string()] }))
            }
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": self.to_string() }),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_bodies() {
        assert_eq!(
            render(ApiError::RestaurantNotFound).await,
            (
                StatusCode::NOT_FOUND,
                json!({"error": "Restaurant not found"})
            )
        );
        assert_eq!(
            render(ApiError::Validation).await,
            (
                StatusCode::BAD_REQUEST,
                json!({"errors": ["validation errors"]})
            )
        );
        assert_eq!(
            render(ApiError::InvalidReference).await,
            (
                StatusCode::BAD_REQUEST,
                json!({"errors": ["Invalid pizza_id or restaurant_id"]})
            )
        );
        assert_eq!(
            render(ApiError::Field {
                field: "price",
                message: "Price cannot be blank and must be an integer",
            })
            .await,
            (
                StatusCode::BAD_REQUEST,
                json!({"message": {"price": "Price cannot be blank and must be an integer"}})
            )
        );
    }

    #[test]
    fn test_write_failures() {
        assert!(matches!(
            ApiError::from_write(StoreError::Constraint("CHECK constraint failed".into())),
            ApiError::Validation
        ));
        assert!(matches!(
            ApiError::from_write(StoreError::Unavailable("pool timed out".into())),
            ApiError::Unavailable
        ));
        assert!(matches!(
            ApiError::from_write(StoreError::Task("panicked".into())),
            ApiError::Internal
        ));
    }
}
