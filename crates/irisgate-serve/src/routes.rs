//! HTTP surface: `GET /` and `POST /predict`, each behind its quota rules.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::AppState;
use crate::admission::{Admission, AdmissionController};
use crate::quota::QuotaRule;
use crate::response::{ApiError, PredictionResponse, panic_response, retry_after_secs};

/// Client identifier used when the peer address is not known.
pub const UNKNOWN_CLIENT: &str = "unknown";

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Admission state for one route.
#[derive(Clone)]
struct QuotaGuard {
    admission: Arc<AdmissionController>,
    rules: Arc<[QuotaRule]>,
}

/// Build the application router.
///
/// Quota checks run as route layers, so a rejected request never reaches
/// body parsing or inference.
pub fn build_router(state: AppState) -> Router {
    let index_guard = QuotaGuard {
        admission: Arc::clone(&state.admission),
        rules: Arc::clone(&state.index_rules),
    };
    let predict_guard = QuotaGuard {
        admission: Arc::clone(&state.admission),
        rules: Arc::clone(&state.predict_rules),
    };

    Router::new()
        .route(
            "/",
            get(index).route_layer(middleware::from_fn_with_state(index_guard, enforce_quota)),
        )
        .route(
            "/predict",
            post(predict).route_layer(middleware::from_fn_with_state(predict_guard, enforce_quota)),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn enforce_quota(State(guard): State<QuotaGuard>, request: Request, next: Next) -> Response {
    let client = client_id(&request);
    match guard.admission.admit(&client, &guard.rules) {
        Admission::Admitted => next.run(request).await,
        Admission::Rejected { scope, retry_after } => {
            warn!(
                client = %client,
                scope = %scope,
                retry_after_secs = retry_after_secs(retry_after),
                "rate limit exceeded"
            );
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}

/// The peer IP, with IPv4-mapped IPv6 addresses folded back to IPv4 so an
/// exemption for `127.0.0.1` also holds on dual-stack listeners.
fn client_id(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_canonical().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ApiError> {
    let vector = state.schema.build_slice(&body)?;
    let label = state.engine.predict(&vector)?;
    debug!(label, "prediction served");

    Ok(Json(PredictionResponse {
        predicted_species: label.to_string(),
    }))
}
