//! Feature schema shared by the trainer and the prediction service.
//!
//! The model has no field names internally, only positional slots, so the
//! field order here is the wire contract between training and inference.

use serde_json::{Map, Value};

/// Number of `f32` values per feature vector.
pub const FEATURE_LEN: usize = 9;
/// Feature vector version stamped into model artifacts.
pub const FEATURE_VERSION: i64 = 1;

/// Ordered class names for the risk label.
pub const RISK_CLASSES: [&str; 3] = ["Low", "Medium", "High"];

/// Map a class index to its risk name. Out-of-table indices render as
/// "Unknown" rather than failing.
pub fn risk_name(class_index: usize) -> &'static str {
    RISK_CLASSES.get(class_index).copied().unwrap_or("Unknown")
}

/// Errors produced while coercing a request body into a feature record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The body was valid JSON but not an object.
    #[error("Request body must be a JSON object")]
    NotObject,
    /// A required field was absent.
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    /// A field was present but could not be coerced to a number.
    #[error("Field {field} is not numeric: {value}")]
    NotNumeric {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value, rendered for the error response.
        value: String,
    },
}

/// One prediction input, with every field already coerced to its declared
/// type.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub age: i64,
    /// 0 = Female, 1 = Male.
    pub gender: i64,
    pub working_hours: f64,
    pub sleep_hours: f64,
    pub stress_level: i64,
    pub work_pressure: i64,
    pub meetings_per_day: i64,
    pub experience_years: f64,
    /// 0 = No, 1 = Yes.
    pub remote: i64,
}

impl FeatureRecord {
    /// Coerce a JSON object into a record. Every field is required; integer
    /// fields truncate fractional values toward zero, and numeric strings are
    /// accepted for both kinds.
    pub fn from_json(value: &Value) -> Result<Self, InputError> {
        let map = value.as_object().ok_or(InputError::NotObject)?;
        Ok(Self {
            age: integer_field(map, "Age")?,
            gender: integer_field(map, "Gender")?,
            working_hours: real_field(map, "WorkingHours")?,
            sleep_hours: real_field(map, "SleepHours")?,
            stress_level: integer_field(map, "StressLevel")?,
            work_pressure: integer_field(map, "WorkPressure")?,
            meetings_per_day: integer_field(map, "MeetingsPerDay")?,
            experience_years: real_field(map, "ExperienceYears")?,
            remote: integer_field(map, "Remote")?,
        })
    }

    /// The record as a feature vector in the fixed schema order.
    pub fn to_vector(&self) -> Vec<f32> {
        vec![
            self.age as f32,
            self.gender as f32,
            self.working_hours as f32,
            self.sleep_hours as f32,
            self.stress_level as f32,
            self.work_pressure as f32,
            self.meetings_per_day as f32,
            self.experience_years as f32,
            self.remote as f32,
        ]
    }
}

fn integer_field(map: &Map<String, Value>, field: &'static str) -> Result<i64, InputError> {
    let value = map.get(field).ok_or(InputError::MissingField(field))?;
    match value {
        Value::Number(number) => {
            if let Some(v) = number.as_i64() {
                return Ok(v);
            }
            if let Some(v) = number.as_f64() {
                return Ok(v.trunc() as i64);
            }
            Err(not_numeric(field, value))
        }
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| not_numeric(field, value)),
        _ => Err(not_numeric(field, value)),
    }
}

fn real_field(map: &Map<String, Value>, field: &'static str) -> Result<f64, InputError> {
    let value = map.get(field).ok_or(InputError::MissingField(field))?;
    match value {
        Value::Number(number) => number
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| not_numeric(field, value)),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| not_numeric(field, value)),
        _ => Err(not_numeric(field, value)),
    }
}

fn not_numeric(field: &'static str, value: &Value) -> InputError {
    InputError::NotNumeric {
        field,
        value: value.to_string(),
    }
}
