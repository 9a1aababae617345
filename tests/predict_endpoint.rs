//! End-to-end tests driving the HTTP surface over a real listener.

use std::thread;

use serde_json::json;

use burnwatch::ml::forest::{TrainOptions, train_forest};
use burnwatch::predictor::Predictor;
use burnwatch::server;
use burnwatch::synth::generate_dataset;

/// Train a small forest, serve it on an ephemeral port, and return the base
/// URL. The serving thread lives for the rest of the test process.
fn spawn_service() -> String {
    let dataset = generate_dataset(400, 42);
    let options = TrainOptions {
        trees: 12,
        max_depth: 8,
        ..TrainOptions::default()
    };
    let model = train_forest(&dataset, &options).expect("training must succeed");
    let predictor = Predictor::new(model);

    let listener = server::bind("127.0.0.1:0").expect("bind must succeed");
    let addr = listener
        .server_addr()
        .to_ip()
        .expect("listener must have an IP address");
    thread::spawn(move || server::serve(&listener, &predictor));
    format!("http://{addr}")
}

fn valid_body() -> serde_json::Value {
    json!({
        "Age": 30,
        "Gender": 1,
        "WorkingHours": 10,
        "SleepHours": 5,
        "StressLevel": 8,
        "WorkPressure": 7,
        "MeetingsPerDay": 4,
        "ExperienceYears": 5,
        "Remote": 0,
    })
}

fn expect_status(result: Result<ureq::Response, ureq::Error>, expected: u16) -> serde_json::Value {
    match result {
        Err(ureq::Error::Status(code, response)) => {
            assert_eq!(code, expected);
            response.into_json().expect("error body must be JSON")
        }
        Ok(response) => panic!("expected HTTP {expected}, got {}", response.status()),
        Err(err) => panic!("transport error: {err}"),
    }
}

#[test]
fn liveness_route_responds_with_text() {
    let base = spawn_service();
    let response = ureq::get(&base).call().unwrap();
    assert_eq!(response.status(), 200);
    let text = response.into_string().unwrap();
    assert!(text.contains("running"), "unexpected liveness body: {text}");
}

#[test]
fn predict_returns_a_known_risk_and_bounded_score() {
    let base = spawn_service();
    let response = ureq::post(&format!("{base}/predict"))
        .send_json(valid_body())
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some("*"),
        "CORS header missing"
    );
    let body: serde_json::Value = response.into_json().unwrap();
    let risk = body["risk"].as_str().unwrap();
    assert!(["Low", "Medium", "High"].contains(&risk), "risk {risk}");
    let score = body["score"].as_i64().unwrap();
    assert!((0..=100).contains(&score), "score {score}");
}

#[test]
fn missing_field_yields_400_with_the_field_name() {
    let base = spawn_service();
    let mut body = valid_body();
    body.as_object_mut().unwrap().remove("SleepHours");
    let error = expect_status(
        ureq::post(&format!("{base}/predict")).send_json(body),
        400,
    );
    assert!(
        error["error"].as_str().unwrap().contains("SleepHours"),
        "unexpected error body: {error}"
    );
}

#[test]
fn non_numeric_field_yields_400() {
    let base = spawn_service();
    let mut body = valid_body();
    body["WorkingHours"] = json!("lots");
    let error = expect_status(
        ureq::post(&format!("{base}/predict")).send_json(body),
        400,
    );
    assert!(error["error"].as_str().unwrap().contains("WorkingHours"));
}

#[test]
fn malformed_json_yields_400() {
    let base = spawn_service();
    let error = expect_status(
        ureq::post(&format!("{base}/predict"))
            .set("Content-Type", "application/json")
            .send_string("{not json"),
        400,
    );
    assert!(error["error"].as_str().unwrap().contains("JSON"));
}

#[test]
fn unknown_route_yields_404() {
    let base = spawn_service();
    expect_status(ureq::get(&format!("{base}/nope")).call(), 404);
}

#[test]
fn preflight_is_accepted() {
    let base = spawn_service();
    let response = ureq::request("OPTIONS", &format!("{base}/predict"))
        .call()
        .unwrap();
    assert_eq!(response.status(), 204);
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
}
