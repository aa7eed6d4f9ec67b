use crate::service::error::ApiError;
use crate::service::predictor::Predictor;
use crate::service::request::PredictionRequest;
use actix_web::{web, Responder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_energy_consumption_kwh: f64,
}

/// `POST /predict`: validates the body, assembles the feature vector and runs the model.
pub async fn predict(
    predictor: web::Data<Predictor>,
    body: web::Json<serde_json::Value>,
) -> Result<impl Responder, ApiError> {
    let request = PredictionRequest::from_json(&body)?;
    let prediction = predictor.predict(&request)?;
    log::debug!("Predicted {prediction} kWh");

    Ok(web::Json(PredictionResponse {
        predicted_energy_consumption_kwh: prediction,
    }))
}
