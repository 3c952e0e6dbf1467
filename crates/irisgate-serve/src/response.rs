//! Maps every pipeline outcome onto a JSON response.
//!
//! | Outcome          | Status | Body                                   |
//! |------------------|--------|----------------------------------------|
//! | prediction       | 200    | `{"predicted_species": "<label>"}`     |
//! | validation error | 400    | `{"error": "<what is wrong>"}`         |
//! | quota exceeded   | 429    | `{"error": "Rate limit exceeded. ..."}` + `Retry-After` |
//! | internal error   | 500    | `{"error": "<fixed message>"}`         |

use std::any::Any;
use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use irisgate_ai::InferenceError;
use irisgate_core::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const INTERNAL_MESSAGE: &str = "Prediction failed due to an internal error.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_species: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A request that ends without a prediction.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited { retry_after: Duration },

    /// The cause is logged, never sent to the client.
    #[error("{}", INTERNAL_MESSAGE)]
    Internal(#[from] InferenceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            error!(error = %cause, "inference failed");
        }

        let status = self.status();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        let mut response = (status, body).into_response();

        if let Self::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs(retry_after)));
        }
        response
    }
}

/// Whole seconds to wait, rounded up, never zero.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

/// Response for a handler that panicked. Keeps the process serving and the
/// panic payload out of the body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    error!(panic = %detail, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: INTERNAL_MESSAGE.to_string(),
        }),
    )
        .into_response()
}
