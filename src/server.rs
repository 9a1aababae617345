//! HTTP surface for the prediction service.
//!
//! Routing glue over `tiny_http`: a liveness route, the predict route, and
//! CORS preflight for browser clients. All request handling is synchronous;
//! the model behind the predictor is read-only.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, warn};

use crate::features::{FeatureRecord, InputError};
use crate::predictor::{Classifier, Predictor};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

const LIVENESS_TEXT: &str = "Burnout prediction service is running";

/// Successful prediction payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub risk: String,
    pub score: u32,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client sent a field that failed coercion, or omitted one.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Client sent a body that is not valid JSON.
    #[error("Invalid JSON body: {0}")]
    MalformedJson(String),
    /// Client sent more body than the service accepts.
    #[error("Request body exceeds {MAX_BODY_BYTES} bytes")]
    BodyTooLarge,
    /// No handler for the requested path.
    #[error("No such route")]
    NotFound,
    /// Path exists but does not support the method.
    #[error("Method not allowed")]
    MethodNotAllowed,
    /// Failure on our side of the connection.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for the error class.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Input(_) | ApiError::MalformedJson(_) | ApiError::BodyTooLarge => 400,
            ApiError::NotFound => 404,
            ApiError::MethodNotAllowed => 405,
            ApiError::Internal(_) => 500,
        }
    }
}

/// Bind an HTTP listener on `addr`.
pub fn bind(addr: &str) -> Result<Server, String> {
    Server::http(addr).map_err(|err| err.to_string())
}

/// Serve requests until the listener shuts down.
pub fn serve<C: Classifier>(server: &Server, predictor: &Predictor<C>) {
    for request in server.incoming_requests() {
        handle_connection(request, predictor);
    }
}

enum Reply {
    Text(String),
    Json(u16, String),
    NoContent,
}

fn handle_connection<C: Classifier>(mut request: Request, predictor: &Predictor<C>) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let reply = route(&method, &url, &mut request, predictor);
    respond(request, reply);
}

fn route<C: Classifier>(
    method: &Method,
    url: &str,
    request: &mut Request,
    predictor: &Predictor<C>,
) -> Reply {
    match (method, url) {
        (Method::Options, _) => Reply::NoContent,
        (Method::Get, "/") => Reply::Text(LIVENESS_TEXT.to_string()),
        (Method::Post, "/predict") => match read_body(request)
            .and_then(|body| handle_predict(predictor, &body))
        {
            Ok(response) => json_reply(200, &response),
            Err(err) => {
                debug!("Rejected predict request: {err}");
                error_reply(&err)
            }
        },
        (_, "/") | (_, "/predict") => error_reply(&ApiError::MethodNotAllowed),
        _ => error_reply(&ApiError::NotFound),
    }
}

/// Core of `POST /predict`, separated from the transport for tests.
pub fn handle_predict<C: Classifier>(
    predictor: &Predictor<C>,
    body: &str,
) -> Result<PredictResponse, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|err| ApiError::MalformedJson(err.to_string()))?;
    let record = FeatureRecord::from_json(&value)?;
    let prediction = predictor.predict(&record);
    Ok(PredictResponse {
        risk: prediction.risk.to_string(),
        score: prediction.score,
    })
}

fn read_body(request: &mut Request) -> Result<String, ApiError> {
    let mut body = String::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES as u64 + 1)
        .read_to_string(&mut body)
        .map_err(|err| ApiError::Internal(format!("Failed to read request body: {err}")))?;
    if body.len() > MAX_BODY_BYTES {
        return Err(ApiError::BodyTooLarge);
    }
    Ok(body)
}

fn json_reply(status: u16, payload: &impl Serialize) -> Reply {
    match serde_json::to_string(payload) {
        Ok(body) => Reply::Json(status, body),
        Err(err) => error_reply(&ApiError::Internal(format!(
            "Failed to encode response: {err}"
        ))),
    }
}

fn error_reply(err: &ApiError) -> Reply {
    let body = serde_json::json!({ "error": err.to_string() }).to_string();
    Reply::Json(err.status_code(), body)
}

fn respond(request: Request, reply: Reply) {
    let result = match reply {
        Reply::Text(text) => request.respond(with_cors(Response::from_string(text))),
        Reply::Json(status, body) => request.respond(with_cors(
            Response::from_string(body)
                .with_status_code(status)
                .with_header(header("Content-Type", "application/json")),
        )),
        Reply::NoContent => request.respond(with_cors(Response::empty(204))),
    };
    if let Err(err) = result {
        warn!("Failed to write response: {err}");
    }
}

/// Browser clients reach the service cross-origin, so every response carries
/// the permissive CORS headers.
fn with_cors<R: Read>(response: Response<R>) -> Response<R> {
    response
        .with_header(header("Access-Control-Allow-Origin", "*"))
        .with_header(header("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .with_header(header("Access-Control-Allow-Headers", "Content-Type"))
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header must parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;

    impl Classifier for Stub {
        fn predict_class_index(&self, _features: &[f32]) -> usize {
            1
        }

        fn class_probabilities(&self, _features: &[f32]) -> Option<Vec<f32>> {
            Some(vec![0.2, 0.7, 0.1])
        }
    }

    fn full_body() -> String {
        serde_json::json!({
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
        .to_string()
    }

    #[test]
    fn predict_returns_risk_and_score() {
        let predictor = Predictor::new(Stub);
        let response = handle_predict(&predictor, &full_body()).unwrap();
        assert_eq!(response.risk, "Medium");
        assert_eq!(response.score, 70);
    }

    #[test]
    fn missing_field_maps_to_400_with_field_name() {
        let predictor = Predictor::new(Stub);
        let mut body: serde_json::Value = serde_json::from_str(&full_body()).unwrap();
        body.as_object_mut().unwrap().remove("SleepHours");
        let err = handle_predict(&predictor, &body.to_string()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("SleepHours"));
    }

    #[test]
    fn malformed_json_maps_to_400() {
        let predictor = Predictor::new(Stub);
        let err = handle_predict(&predictor, "{not json").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(matches!(err, ApiError::MalformedJson(_)));
    }

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        assert_eq!(ApiError::NotFound.status_code(), 404);
        assert_eq!(ApiError::MethodNotAllowed.status_code(), 405);
        assert_eq!(ApiError::BodyTooLarge.status_code(), 400);
        assert_eq!(ApiError::Internal("boom".into()).status_code(), 500);
    }
}
