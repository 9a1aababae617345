use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::model::{DecisionTree, ForestModel, Node};

/// Training hyperparameters for the forest.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Number of trees in the ensemble.
    pub trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum number of samples required to attempt a split.
    pub min_split: usize,
    /// Number of candidate features examined per split.
    pub max_features: usize,
    /// Number of bins used for split search.
    pub bins: usize,
    /// Seed driving bootstrap sampling and feature selection.
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 12,
            min_split: 2,
            max_features: 3,
            bins: 32,
            seed: 42,
        }
    }
}

/// In-memory dataset used for training and evaluation.
#[derive(Debug, Clone)]
pub struct TrainDataset {
    /// Number of `f32` values in each feature vector.
    pub feature_len_f32: usize,
    /// Feature vector version.
    pub feat_version: i64,
    /// Ordered list of class names.
    pub classes: Vec<String>,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f32>>,
    /// Class indices aligned with `x`.
    pub y: Vec<usize>,
}

/// Train a random forest with seeded bootstrap sampling per tree.
pub fn train_forest(
    dataset: &TrainDataset,
    options: &TrainOptions,
) -> Result<ForestModel, String> {
    if dataset.x.len() != dataset.y.len() {
        return Err("Mismatched X/Y lengths".to_string());
    }
    if dataset.x.is_empty() {
        return Err("Empty dataset".to_string());
    }
    let n_classes = dataset.classes.len();
    if n_classes < 2 {
        return Err("Need at least 2 classes".to_string());
    }
    if dataset.y.iter().any(|&label| label >= n_classes) {
        return Err("Class index out of range".to_string());
    }
    if options.trees == 0 {
        return Err("Need at least one tree".to_string());
    }

    let n = dataset.x.len();
    let mut trees = Vec::with_capacity(options.trees);
    for tree_idx in 0..options.trees {
        let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(tree_idx as u64));
        let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
        let root = grow_node(dataset, &sample, n_classes, 0, options, &mut rng);
        trees.push(DecisionTree { root });
    }

    Ok(ForestModel {
        model_version: 1,
        feat_version: dataset.feat_version,
        feature_len_f32: dataset.feature_len_f32,
        classes: dataset.classes.clone(),
        trees,
    })
}

fn grow_node(
    dataset: &TrainDataset,
    indices: &[usize],
    n_classes: usize,
    depth: usize,
    options: &TrainOptions,
    rng: &mut StdRng,
) -> Node {
    let counts = class_counts(&dataset.y, indices, n_classes);
    if depth >= options.max_depth || indices.len() < options.min_split || is_pure(&counts) {
        return Node::Leaf {
            class_counts: counts,
        };
    }
    let Some(split) = best_split(dataset, indices, n_classes, options, rng) else {
        return Node::Leaf {
            class_counts: counts,
        };
    };
    let (left_indices, right_indices) =
        partition(dataset, indices, split.feature_index, split.threshold);
    if left_indices.is_empty() || right_indices.is_empty() {
        return Node::Leaf {
            class_counts: counts,
        };
    }
    Node::Split {
        feature_index: split.feature_index as u16,
        threshold: split.threshold,
        left: Box::new(grow_node(
            dataset,
            &left_indices,
            n_classes,
            depth + 1,
            options,
            rng,
        )),
        right: Box::new(grow_node(
            dataset,
            &right_indices,
            n_classes,
            depth + 1,
            options,
            rng,
        )),
    }
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    score: f64,
    feature_index: usize,
    threshold: f32,
}

fn best_split(
    dataset: &TrainDataset,
    indices: &[usize],
    n_classes: usize,
    options: &TrainOptions,
    rng: &mut StdRng,
) -> Option<SplitCandidate> {
    let n_features = dataset.feature_len_f32;
    let n_pick = options.max_features.clamp(1, n_features);
    let chosen = rand::seq::index::sample(rng, n_features, n_pick);

    let mut best: Option<SplitCandidate> = None;
    for feature_idx in chosen {
        let Some(candidate) =
            best_split_for_feature(dataset, indices, feature_idx, n_classes, options.bins)
        else {
            continue;
        };
        if best
            .as_ref()
            .is_none_or(|current| candidate.score < current.score)
        {
            best = Some(candidate);
        }
    }
    best
}

/// Weighted-gini split search over binned feature histograms.
fn best_split_for_feature(
    dataset: &TrainDataset,
    indices: &[usize],
    feature_idx: usize,
    n_classes: usize,
    bins: usize,
) -> Option<SplitCandidate> {
    let bins = bins.clamp(2, 256);
    let (min, max) = feature_min_max(dataset, indices, feature_idx)?;
    if max <= min {
        return None;
    }

    let mut bin_class_counts = vec![0u32; bins * n_classes];
    let mut bin_totals = vec![0u32; bins];
    for &i in indices {
        let value = dataset.x[i].get(feature_idx).copied().unwrap_or(0.0);
        let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
        let bin = (t * (bins - 1) as f32).round() as usize;
        bin_class_counts[bin * n_classes + dataset.y[i]] += 1;
        bin_totals[bin] += 1;
    }

    let total = indices.len() as u32;
    let class_totals = class_counts(&dataset.y, indices, n_classes);

    let mut left_class = vec![0u32; n_classes];
    let mut left_total = 0u32;
    let mut best_score = f64::INFINITY;
    let mut best_bin: Option<usize> = None;
    for split_bin in 0..(bins - 1) {
        for class_idx in 0..n_classes {
            left_class[class_idx] += bin_class_counts[split_bin * n_classes + class_idx];
        }
        left_total += bin_totals[split_bin];
        let right_total = total - left_total;
        if left_total == 0 || right_total == 0 {
            continue;
        }
        let right_gini = {
            let right_class: Vec<u32> = class_totals
                .iter()
                .zip(&left_class)
                .map(|(&all, &left)| all - left)
                .collect();
            gini(&right_class, right_total)
        };
        let score = (left_total as f64 * gini(&left_class, left_total)
            + right_total as f64 * right_gini)
            / total as f64;
        if score < best_score {
            best_score = score;
            best_bin = Some(split_bin);
        }
    }

    let split_bin = best_bin?;
    Some(SplitCandidate {
        score: best_score,
        feature_index: feature_idx,
        threshold: threshold_for_bin(min, max, split_bin, bins),
    })
}

fn feature_min_max(
    dataset: &TrainDataset,
    indices: &[usize],
    feature_idx: usize,
) -> Option<(f32, f32)> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &i in indices {
        let value = dataset.x[i].get(feature_idx).copied().unwrap_or(0.0);
        if value.is_finite() {
            min = min.min(value);
            max = max.max(value);
        }
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

fn threshold_for_bin(min: f32, max: f32, split_bin: usize, bins: usize) -> f32 {
    min + ((split_bin + 1) as f32 / bins as f32) * (max - min)
}

fn gini(class_counts: &[u32], total: u32) -> f64 {
    let total = total as f64;
    1.0 - class_counts
        .iter()
        .map(|&count| {
            let p = count as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn partition(
    dataset: &TrainDataset,
    indices: &[usize],
    feature_idx: usize,
    threshold: f32,
) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for &i in indices {
        let value = dataset.x[i].get(feature_idx).copied().unwrap_or(0.0);
        if value <= threshold {
            left.push(i);
        } else {
            right.push(i);
        }
    }
    (left, right)
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<u32> {
    let mut counts = vec![0u32; n_classes];
    for &i in indices {
        if y[i] < n_classes {
            counts[y[i]] += 1;
        }
    }
    counts
}

fn is_pure(counts: &[u32]) -> bool {
    counts.iter().filter(|&&count| count > 0).count() <= 1
}
