use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("could not geocode address: {0}")]
    GeocodeFailure(String),

    #[error("no warehouses configured")]
    NoWarehouseAvailable,

    #[error("could not calculate route: {0}")]
    RoutingService(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::InvalidCoordinates(_) => "invalid_coordinates",
            AppError::GeocodeFailure(_) => "geocode_failure",
            AppError::NoWarehouseAvailable => "no_warehouse",
            AppError::RoutingService(_) => "routing_error",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_)
            | AppError::InvalidCoordinates(_)
            | AppError::GeocodeFailure(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoWarehouseAvailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::RoutingService(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}
