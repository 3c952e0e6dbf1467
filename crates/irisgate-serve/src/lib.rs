//! HTTP prediction service with per-client quotas.
//!
//! A request flows through three stages:
//!
//! 1. **Admission** ([`AdmissionController`]) charges the route's quota rules
//!    for the calling client, or rejects with a retry hint.
//! 2. **Validation** ([`irisgate_core::FeatureSchema`]) turns the JSON body
//!    into a feature vector in schema order.
//! 3. **Inference** ([`irisgate_ai::InferenceEngine`]) scales the vector and
//!    classifies it.
//!
//! Every outcome becomes a JSON body; see [`response`].

pub mod admission;
pub mod config;
pub mod quota;
pub mod response;
pub mod routes;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use irisgate_ai::{InferenceEngine, ModelArtifact};
use irisgate_core::FeatureSchema;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub use admission::{Admission, AdmissionController, Clock, SystemClock};
pub use config::{ConfigError, ServeConfig};
pub use quota::QuotaRule;
pub use response::{ApiError, PredictionResponse};
pub use routes::build_router;

/// Shared state behind every request. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    schema: FeatureSchema,
    engine: InferenceEngine,
    admission: Arc<AdmissionController>,
    index_rules: Arc<[QuotaRule]>,
    predict_rules: Arc<[QuotaRule]>,
}

impl AppState {
    pub fn new(artifact: Arc<ModelArtifact>, config: &ServeConfig) -> Self {
        let admission = Arc::new(AdmissionController::new(config.exempt.iter().cloned()));
        Self::with_admission(artifact, config, admission)
    }

    /// Build state around an existing admission controller, e.g. one with a
    /// custom clock.
    pub fn with_admission(
        artifact: Arc<ModelArtifact>,
        config: &ServeConfig,
        admission: Arc<AdmissionController>,
    ) -> Self {
        Self {
            schema: artifact.schema(),
            engine: InferenceEngine::new(artifact),
            admission,
            index_rules: config.index_rules().into(),
            predict_rules: config.predict_rules().into(),
        }
    }

    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.admission
    }
}

/// Serve on `listener` until `shutdown` resolves.
///
/// Expired quota buckets are swept every `purge_interval` for as long as the
/// server runs. The interval is raised to one second if shorter.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    purge_interval: Duration,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let purge_interval = purge_interval.max(Duration::from_secs(1));
    let sweeper = spawn_quota_sweeper(Arc::clone(&state.admission), purge_interval);
    let app = build_router(state);

    info!(addr = %listener.local_addr()?, "serving predictions");
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await;

    sweeper.abort();
    info!("server stopped");
    result
}

fn spawn_quota_sweeper(admission: Arc<AdmissionController>, every: Duration) -> JoinHandle<()> {
    let mut ticker = tokio::time::interval(every);
    tokio::spawn(async move {
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = admission.purge_expired();
            if removed > 0 {
                debug!(removed, remaining = admission.tracked_buckets(), "purged quota buckets");
            }
        }
    })
}
