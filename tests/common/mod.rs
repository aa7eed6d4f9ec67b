#![allow(dead_code)]

use gridguardian::artifact::TrainedArtifact;
use gridguardian::model::{Fitted, LinearModel, LinearParams};
use gridguardian::preprocessing::{FittedStandardScaler, FittedTransformer, StandardScalerParams};
use ndarray::Array1;
use serde_json::{json, Value};

pub const FEATURE_NAMES: [&str; 15] = [
    "Household Size",
    "Appliance Type_Air Conditioning",
    "Appliance Type_Computer",
    "Appliance Type_Dishwasher",
    "Appliance Type_Fridge",
    "Appliance Type_Heater",
    "Appliance Type_Lights",
    "Appliance Type_Microwave",
    "Appliance Type_Oven",
    "Appliance Type_TV",
    "Appliance Type_Washing Machine",
    "Season_Fall",
    "Season_Spring",
    "Season_Summer",
    "Season_Winter",
];

pub const WEIGHTS: [f64; 15] = [
    0.5, 0.30, 0.40, 0.25, 0.75, 1.10, 0.05, 0.20, 0.90, 0.15, 0.60, 0.10, 0.20, 0.35, 0.45,
];

/// A linear artifact with a hand-picked scaler: household size is centred on 4 with scale
/// 2, every indicator passes through unchanged.
pub fn fixture_artifact() -> TrainedArtifact {
    artifact_with(
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        WEIGHTS.to_vec(),
    )
}

pub fn artifact_with(feature_names: Vec<String>, weights: Vec<f64>) -> TrainedArtifact {
    let n = feature_names.len();
    let mut mean = vec![0.0; n];
    let mut std = vec![1.0; n];
    mean[0] = 4.0;
    std[0] = 2.0;
    let scaler = FittedStandardScaler::from_params(StandardScalerParams {
        mean,
        std,
        n_features: n,
    })
    .unwrap();
    let model = LinearModel::<Fitted>::new(LinearParams {
        weights: Array1::from(weights),
        bias: 1.0,
    });
    TrainedArtifact::new(model.into(), scaler, feature_names).unwrap()
}

pub fn example_request() -> Value {
    json!({
        "Household_Size": 4,
        "Appliance_Type_Dishwasher": 1,
        "Appliance_Type_Microwave": 0,
        "Appliance_Type_Washing_Machine": 0,
        "Appliance_Type_Fridge": 1,
        "Appliance_Type_TV": 1,
        "Appliance_Type_Computer": 0,
        "Appliance_Type_Oven": 0,
        "Appliance_Type_Heater": 0,
        "Appliance_Type_Lights": 1,
        "Appliance_Type_Air Conditioning": 0,
        "Season_Fall": 0,
        "Season_Spring": 1,
        "Season_Summer": 0,
        "Season_Winter": 0
    })
}
