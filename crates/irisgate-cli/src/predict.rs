//! `irisgate predict` -- one offline prediction through the same validation
//! and inference path the server uses.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use irisgate_ai::{InferenceEngine, ModelArtifact};
use irisgate_core::IRIS;
use irisgate_serve::PredictionResponse;

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Model artifact (JSON document with scaler and classifier).
    #[arg(long, env = "IRISGATE_MODEL", default_value = "models/iris_model.json")]
    pub model: PathBuf,

    /// Feature payload as a JSON object, or `-` to read it from stdin.
    pub payload: String,
}

pub fn run(args: PredictArgs) -> anyhow::Result<()> {
    let payload = if args.payload == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading payload from stdin")?;
        buf
    } else {
        args.payload
    };

    println!("{}", predict_json(&args.model, &payload)?);
    Ok(())
}

fn predict_json(model: &Path, payload: &str) -> anyhow::Result<String> {
    let artifact = ModelArtifact::load(model, IRIS)
        .with_context(|| format!("loading model artifact {}", model.display()))?;
    let engine = InferenceEngine::new(Arc::new(artifact));

    let vector = IRIS.build_slice(payload.as_bytes())?;
    let label = engine.predict(&vector).context("prediction failed")?;

    let response = PredictionResponse {
        predicted_species: label.to_string(),
    };
    Ok(serde_json::to_string(&response)?)
}
