use serde::{Deserialize, Serialize};
use std::path::Path;

/// One node of a fitted decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// Binary split routing `feature <= threshold` to the left child.
    Split {
        /// Feature index used for the split.
        feature_index: u16,
        /// Threshold in feature units.
        threshold: f32,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Terminal node holding the training class counts that reached it.
    Leaf {
        /// One count per class, in model class order.
        class_counts: Vec<u32>,
    },
}

impl Node {
    /// Walk to the leaf reached by a feature vector and return its counts.
    pub fn leaf_counts(&self, features: &[f32]) -> &[u32] {
        match self {
            Node::Leaf { class_counts } => class_counts,
            Node::Split {
                feature_index,
                threshold,
                left,
                right,
            } => {
                let value = features
                    .get(*feature_index as usize)
                    .copied()
                    .unwrap_or(0.0);
                if value <= *threshold {
                    left.leaf_counts(features)
                } else {
                    right.leaf_counts(features)
                }
            }
        }
    }
}

/// A single fitted decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub root: Node,
}

impl DecisionTree {
    /// Class distribution at the leaf reached by a feature vector.
    pub fn class_distribution(&self, features: &[f32], n_classes: usize) -> Vec<f32> {
        let counts = self.root.leaf_counts(features);
        let total: u32 = counts.iter().sum();
        if total == 0 {
            return vec![1.0 / n_classes.max(1) as f32; n_classes];
        }
        counts
            .iter()
            .map(|&count| count as f32 / total as f32)
            .collect()
    }
}

/// Random forest model for multi-class classification.
///
/// Probabilities are the per-tree leaf class distributions averaged across
/// the ensemble; the predicted class is their argmax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    /// Model format version.
    pub model_version: i64,
    /// Feature vector version expected by this model.
    pub feat_version: i64,
    /// Number of `f32` values per feature vector.
    pub feature_len_f32: usize,
    /// Ordered list of class names.
    pub classes: Vec<String>,
    /// Fitted trees.
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err("Model must contain at least 2 classes".to_string());
        }
        if self.feature_len_f32 == 0 {
            return Err("Model feature length must be non-zero".to_string());
        }
        if self.trees.is_empty() {
            return Err("Model must contain at least one tree".to_string());
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            validate_node(&tree.root, self.classes.len(), self.feature_len_f32)
                .map_err(|err| format!("Tree {tree_idx}: {err}"))?;
        }
        Ok(())
    }

    /// Load a model from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
        let model: Self = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
        model.validate()?;
        Ok(model)
    }

    /// Write the model to a JSON file, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| err.to_string())?;
        }
        let bytes = serde_json::to_vec_pretty(self).map_err(|err| err.to_string())?;
        std::fs::write(path, bytes).map_err(|err| err.to_string())
    }

    /// Predict class probabilities for a feature vector.
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        let n_classes = self.classes.len();
        let mut acc = vec![0.0f32; n_classes];
        if self.trees.is_empty() {
            return acc;
        }
        for tree in &self.trees {
            let dist = tree.class_distribution(features, n_classes);
            for (slot, value) in acc.iter_mut().zip(dist) {
                *slot += value;
            }
        }
        let scale = 1.0 / self.trees.len() as f32;
        for value in &mut acc {
            *value *= scale;
        }
        acc
    }

    /// Predict the best class index for a feature vector.
    pub fn predict_class_index(&self, features: &[f32]) -> usize {
        argmax(&self.predict_proba(features))
    }
}

fn validate_node(node: &Node, n_classes: usize, feature_len: usize) -> Result<(), String> {
    match node {
        Node::Leaf { class_counts } => {
            if class_counts.len() != n_classes {
                return Err(format!(
                    "Leaf has {} counts but expected {}",
                    class_counts.len(),
                    n_classes
                ));
            }
            Ok(())
        }
        Node::Split {
            feature_index,
            left,
            right,
            ..
        } => {
            if *feature_index as usize >= feature_len {
                return Err(format!(
                    "Split on feature {feature_index} but feature length is {feature_len}"
                ));
            }
            validate_node(left, n_classes, feature_len)?;
            validate_node(right, n_classes, feature_len)
        }
    }
}

pub(crate) fn argmax(values: &[f32]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &value) in values.iter().enumerate() {
        if value > best_val {
            best_val = value;
            best_idx = idx;
        }
    }
    best_idx
}
