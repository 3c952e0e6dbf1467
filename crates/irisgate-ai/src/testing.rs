//! Shared fixtures for unit tests.

use irisgate_core::IRIS;
use serde_json::{Value, json};

/// Standardised-iris logistic regression, same weights as `models/iris_model.json`.
pub(crate) fn iris_document() -> Value {
    json!({
        "feature_names": IRIS.names(),
        "scaler": {
            "mean": [5.843333, 3.057333, 3.758, 1.199333],
            "scale": [0.825301, 0.434411, 1.759404, 0.759693]
        },
        "classifier": {
            "kind": "linear",
            "classes": ["setosa", "versicolor", "virginica"],
            "coef": [
                [-1.0744, 1.1602, -1.9306, -1.8112],
                [0.5878, -0.3612, -0.3631, -0.8270],
                [0.4866, -0.7990, 2.2937, 2.6382]
            ],
            "intercept": [-0.206, 2.013, -1.807]
        }
    })
}
