//! Prediction service wrapping a loaded classifier.

use crate::features::{FeatureRecord, risk_name};
use crate::ml::forest::ForestModel;

/// What the prediction service requires of a model. Substitute
/// implementations keep the service testable without a fitted forest.
pub trait Classifier {
    /// Predicted class index for a feature vector.
    fn predict_class_index(&self, features: &[f32]) -> usize;
    /// Class probabilities for a feature vector, if the model provides them.
    fn class_probabilities(&self, features: &[f32]) -> Option<Vec<f32>>;
}

impl Classifier for ForestModel {
    fn predict_class_index(&self, features: &[f32]) -> usize {
        ForestModel::predict_class_index(self, features)
    }

    fn class_probabilities(&self, features: &[f32]) -> Option<Vec<f32>> {
        Some(self.predict_proba(features))
    }
}

/// One prediction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    /// Risk name for the predicted class, "Unknown" for an unmapped index.
    pub risk: &'static str,
    /// Confidence indicator in [0, 100].
    pub score: u32,
}

/// Immutable-after-init service holding the loaded model. Prediction is a
/// pure synchronous computation; nothing is mutated per request.
pub struct Predictor<C> {
    model: C,
}

impl<C: Classifier> Predictor<C> {
    pub fn new(model: C) -> Self {
        Self { model }
    }

    /// Classify one record.
    ///
    /// With probability output the score is `round(max(p) * 100)`. Without,
    /// it falls back to `(class_index + 1) * 30` — a crude scaling for
    /// models that give no confidence signal.
    pub fn predict(&self, record: &FeatureRecord) -> Prediction {
        let features = record.to_vector();
        let class_index = self.model.predict_class_index(&features);
        let score = match self.model.class_probabilities(&features) {
            Some(probabilities) => {
                let max = probabilities.iter().copied().fold(0.0f32, f32::max);
                (max.clamp(0.0, 1.0) * 100.0).round() as u32
            }
            None => (class_index as u32 + 1) * 30,
        };
        Prediction {
            risk: risk_name(class_index),
            score,
        }
    }
}
