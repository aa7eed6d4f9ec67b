//! HTTP prediction service.
//!
//! The artifact is loaded once, wrapped in [`web::Data`] and shared read-only by every
//! worker. One route is exposed: `POST /predict`.

pub mod error;
pub mod handlers;
pub mod predictor;
pub mod request;

pub use error::ApiError;
pub use predictor::{PredictError, Predictor};
pub use request::{PredictionRequest, ValidationErrors};

use crate::config::ServerConfig;
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

/// Registers the prediction route and its shared state.
pub fn configure(cfg: &mut web::ServiceConfig, predictor: web::Data<Predictor>) {
    cfg.app_data(predictor)
        .app_data(json_config())
        .route("/predict", web::post().to(handlers::predict));
}

/// Bodies that fail to parse as JSON are schema violations, not generic bad requests.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

/// Any origin, method and header.
pub fn cors() -> Cors {
    Cors::permissive()
}

pub async fn serve(predictor: Predictor, config: &ServerConfig) -> std::io::Result<()> {
    let data = web::Data::new(predictor);
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .wrap(middleware::Logger::default())
            .configure(|cfg| configure(cfg, data.clone()))
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    log::info!("Listening on {}:{}", config.host, config.port);
    server.bind((config.host.as_str(), config.port))?.run().await
}
