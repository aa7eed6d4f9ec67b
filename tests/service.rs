mod common;

use actix_web::http::header::{self, ContentType};
use actix_web::http::{Method, StatusCode};
use actix_web::{test, web, App};
use gridguardian::artifact::TrainedArtifact;
use gridguardian::service::{configure, cors, Predictor};
use serde_json::{json, Value};

use common::{artifact_with, example_request, fixture_artifact, FEATURE_NAMES, WEIGHTS};

async fn post(artifact: TrainedArtifact, body: Value) -> (StatusCode, Value) {
    let predictor = web::Data::new(Predictor::new(artifact));
    let app = test::init_service(
        App::new()
            .wrap(cors())
            .configure(|cfg| configure(cfg, predictor.clone())),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

fn detail(body: &Value) -> &str {
    body["detail"].as_str().unwrap_or_default()
}

#[actix_web::test]
async fn test_example_request_predicts_pinned_value() {
    let (status, body) = post(fixture_artifact(), example_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"predicted_energy_consumption_kwh": 2.4}));
}

#[actix_web::test]
async fn test_household_size_is_scaled() {
    let mut request = example_request();
    request["Household_Size"] = json!(6);
    let (status, body) = post(fixture_artifact(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_energy_consumption_kwh"], json!(2.9));
}

#[actix_web::test]
async fn test_identical_requests_give_identical_predictions() {
    let (_, first) = post(fixture_artifact(), example_request()).await;
    let (_, second) = post(fixture_artifact(), example_request()).await;
    assert_eq!(first, second);
}

#[actix_web::test]
async fn test_household_size_out_of_range_is_422() {
    for value in [0, 21] {
        let mut request = example_request();
        request["Household_Size"] = json!(value);
        let (status, body) = post(fixture_artifact(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "Household_Size = {value}");
        assert!(detail(&body).starts_with("Validation Error: "));
        assert!(detail(&body).contains("Household_Size"));
    }
}

#[actix_web::test]
async fn test_flag_out_of_range_is_422() {
    for value in [2, -1] {
        let mut request = example_request();
        request["Season_Winter"] = json!(value);
        let (status, body) = post(fixture_artifact(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(detail(&body).contains("Season_Winter"));
    }
}

#[actix_web::test]
async fn test_missing_and_mistyped_fields_are_422() {
    let mut request = example_request();
    request.as_object_mut().unwrap().remove("Appliance_Type_Oven");
    request["Season_Fall"] = json!("0");
    let (status, body) = post(fixture_artifact(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(detail(&body).contains("Appliance_Type_Oven"));
    assert!(detail(&body).contains("Season_Fall"));
}

#[actix_web::test]
async fn test_malformed_json_is_422() {
    let predictor = web::Data::new(Predictor::new(fixture_artifact()));
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, predictor.clone()))).await;
    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(ContentType::json())
        .set_payload("{\"Household_Size\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(detail(&body).starts_with("Validation Error: "));
}

#[actix_web::test]
async fn test_unmapped_feature_name_is_400() {
    let mut names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
    names[6] = "Appliance Type_Kettle".to_string();
    let (status, body) = post(artifact_with(names, WEIGHTS.to_vec()), example_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(detail(&body).starts_with("Input Error: "));
    assert!(detail(&body).contains("Appliance Type_Kettle"));
}

#[actix_web::test]
async fn test_non_finite_prediction_is_500() {
    let mut weights = WEIGHTS.to_vec();
    weights[0] = f64::MAX;
    let names = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
    let mut request = example_request();
    request["Household_Size"] = json!(20);
    let (status, body) = post(artifact_with(names, weights), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(detail(&body).starts_with("Internal Server Error: "));
}

#[actix_web::test]
async fn test_huge_finite_prediction_is_a_number() {
    let mut weights = WEIGHTS.to_vec();
    weights[0] = 1e307;
    let names = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
    let mut request = example_request();
    request["Household_Size"] = json!(6);
    let (status, body) = post(artifact_with(names, weights), request).await;
    assert_eq!(status, StatusCode::OK);
    let value = body["predicted_energy_consumption_kwh"].as_f64().unwrap();
    assert!(value.is_finite() && value > 1e306);
}

#[actix_web::test]
async fn test_get_is_not_routed() {
    let predictor = web::Data::new(Predictor::new(fixture_artifact()));
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, predictor.clone()))).await;
    let req = test::TestRequest::get().uri("/predict").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_web::test]
async fn test_cors_preflight_allows_any_origin() {
    let predictor = web::Data::new(Predictor::new(fixture_artifact()));
    let app = test::init_service(
        App::new()
            .wrap(cors())
            .configure(|cfg| configure(cfg, predictor.clone())),
    )
    .await;
    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/predict")
        .insert_header((header::ORIGIN, "http://dashboard.example"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[actix_web::test]
async fn test_predictor_rejects_short_vector() {
    let predictor = Predictor::new(fixture_artifact());
    let short = ndarray::Array1::<f64>::zeros(14);
    let err = predictor.predict_vector(short.view()).unwrap_err();
    assert!(err.is_input_error());
}
