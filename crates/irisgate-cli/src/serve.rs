//! `irisgate serve` -- load the artifact, bind, and serve until Ctrl+C.
//!
//! The artifact is loaded and validated before the listener is bound, so a
//! bad model never accepts a connection.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use irisgate_ai::ModelArtifact;
use irisgate_core::IRIS;
use irisgate_serve::{AppState, ServeConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Model artifact (JSON document with scaler and classifier).
    #[arg(long, env = "IRISGATE_MODEL", default_value = "models/iris_model.json")]
    pub model: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "IRISGATE_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Quota charged on every route, per client.
    #[arg(long, env = "IRISGATE_GLOBAL_LIMIT", default_value = "100 per hour")]
    pub global_limit: String,

    /// Quota for `GET /`, per client.
    #[arg(long, env = "IRISGATE_INDEX_LIMIT", default_value = "30 per minute")]
    pub index_limit: String,

    /// Quota for `POST /predict`, per client.
    #[arg(long, env = "IRISGATE_PREDICT_LIMIT", default_value = "20 per minute")]
    pub predict_limit: String,

    /// Client addresses that bypass every quota. Comma-separated; an empty
    /// value disables exemptions.
    #[arg(
        long,
        env = "IRISGATE_EXEMPT",
        value_delimiter = ',',
        default_value = "127.0.0.1"
    )]
    pub exempt: Vec<String>,

    /// Seconds between sweeps of expired quota buckets.
    #[arg(long, env = "IRISGATE_PURGE_INTERVAL", default_value_t = 300)]
    pub purge_interval: u64,
}

impl ServeArgs {
    pub fn to_config(&self) -> anyhow::Result<ServeConfig> {
        let exempt = self
            .exempt
            .iter()
            .filter(|id| !id.trim().is_empty())
            .cloned()
            .collect();

        let mut config = ServeConfig::default()
            .with_limits(&self.global_limit, &self.index_limit, &self.predict_limit)?
            .with_exempt(exempt)?;
        config.bind = self.bind;
        config.purge_interval = Duration::from_secs(self.purge_interval);
        Ok(config)
    }
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.to_config().context("invalid server configuration")?;

    let artifact = ModelArtifact::load(&args.model, IRIS)
        .with_context(|| format!("loading model artifact {}", args.model.display()))?;

    info!(
        global = %config.global_limit,
        index = %config.index_limit,
        predict = %config.predict_limit,
        exempt = ?config.exempt,
        "quotas configured"
    );

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;

    let state = AppState::new(Arc::new(artifact), &config);
    irisgate_serve::serve(listener, state, config.purge_interval, shutdown_signal())
        .await
        .context("server terminated")?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl+C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
