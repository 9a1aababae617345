//! Synthetic burnout dataset generation.
//!
//! Records are sampled independently per field from fixed uniform integer
//! ranges, then labeled by a closed-form burnout score. Everything is driven
//! by a single seeded generator so a given seed reproduces the dataset
//! exactly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::features::{FEATURE_LEN, FEATURE_VERSION, RISK_CLASSES};
use crate::ml::forest::TrainDataset;

const W_WORKING_HOURS: f32 = 0.4;
const W_STRESS_LEVEL: f32 = 0.8;
const W_WORK_PRESSURE: f32 = 0.7;
const W_SLEEP_HOURS: f32 = 0.6;
const W_MEETINGS_PER_DAY: f32 = 0.3;

/// Scores below this threshold label as Low, at or above as Medium.
const MEDIUM_FROM: f32 = 10.0;
/// Scores at or above this threshold label as High.
const HIGH_FROM: f32 = 18.0;

/// Continuous burnout score for one record.
pub fn burnout_score(
    working_hours: f32,
    sleep_hours: f32,
    stress_level: f32,
    work_pressure: f32,
    meetings_per_day: f32,
) -> f32 {
    working_hours * W_WORKING_HOURS + stress_level * W_STRESS_LEVEL
        + work_pressure * W_WORK_PRESSURE
        - sleep_hours * W_SLEEP_HOURS
        + meetings_per_day * W_MEETINGS_PER_DAY
}

/// Discretize a burnout score into a class index (0 Low, 1 Medium, 2 High).
pub fn risk_class_for_score(score: f32) -> usize {
    if score < MEDIUM_FROM {
        0
    } else if score < HIGH_FROM {
        1
    } else {
        2
    }
}

/// Sample `samples` labeled records. Ranges are half-open, matching the
/// documented per-field bounds.
pub fn generate_dataset(samples: usize, seed: u64) -> TrainDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x = Vec::with_capacity(samples);
    let mut y = Vec::with_capacity(samples);
    for _ in 0..samples {
        let age = rng.random_range(21..60) as f32;
        let gender = rng.random_range(0..2) as f32;
        let working_hours = rng.random_range(4..14) as f32;
        let sleep_hours = rng.random_range(3..9) as f32;
        let stress_level = rng.random_range(1..11) as f32;
        let work_pressure = rng.random_range(1..11) as f32;
        let meetings_per_day = rng.random_range(0..8) as f32;
        let experience_years = rng.random_range(0..35) as f32;
        let remote = rng.random_range(0..2) as f32;

        let score = burnout_score(
            working_hours,
            sleep_hours,
            stress_level,
            work_pressure,
            meetings_per_day,
        );
        x.push(vec![
            age,
            gender,
            working_hours,
            sleep_hours,
            stress_level,
            work_pressure,
            meetings_per_day,
            experience_years,
            remote,
        ]);
        y.push(risk_class_for_score(score));
    }
    TrainDataset {
        feature_len_f32: FEATURE_LEN,
        feat_version: FEATURE_VERSION,
        classes: RISK_CLASSES.iter().map(|name| name.to_string()).collect(),
        x,
        y,
    }
}

/// Split a dataset into (train, test) with a seeded shuffle.
pub fn split_train_test(
    dataset: &TrainDataset,
    test_fraction: f64,
    seed: u64,
) -> (TrainDataset, TrainDataset) {
    let mut indices: Vec<usize> = (0..dataset.x.len()).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let test_len = ((dataset.x.len() as f64) * test_fraction).round() as usize;
    let test_len = test_len.min(indices.len());
    let (test_indices, train_indices) = indices.split_at(test_len);
    (
        subset(dataset, train_indices),
        subset(dataset, test_indices),
    )
}

fn subset(dataset: &TrainDataset, indices: &[usize]) -> TrainDataset {
    TrainDataset {
        feature_len_f32: dataset.feature_len_f32,
        feat_version: dataset.feat_version,
        classes: dataset.classes.clone(),
        x: indices.iter().map(|&i| dataset.x[i].clone()).collect(),
        y: indices.iter().map(|&i| dataset.y[i]).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_matches_hand_computed_example() {
        // 10*0.4 + 8*0.8 + 7*0.7 - 5*0.6 + 4*0.3 = 13.5
        let score = burnout_score(10.0, 5.0, 8.0, 7.0, 4.0);
        assert!((score - 13.5).abs() < 1e-4);
        assert_eq!(risk_class_for_score(score), 1);
    }

    #[test]
    fn thresholds_bound_each_class() {
        assert_eq!(risk_class_for_score(9.99), 0);
        assert_eq!(risk_class_for_score(10.0), 1);
        assert_eq!(risk_class_for_score(17.99), 1);
        assert_eq!(risk_class_for_score(18.0), 2);
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = generate_dataset(64, 42);
        let b = generate_dataset(64, 42);
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
        let c = generate_dataset(64, 43);
        assert_ne!(a.x, c.x);
    }

    #[test]
    fn sampled_fields_stay_in_range() {
        let dataset = generate_dataset(256, 7);
        for row in &dataset.x {
            assert_eq!(row.len(), FEATURE_LEN);
            assert!((21.0..60.0).contains(&row[0]), "age {}", row[0]);
            assert!((0.0..2.0).contains(&row[1]));
            assert!((4.0..14.0).contains(&row[2]));
            assert!((3.0..9.0).contains(&row[3]));
            assert!((1.0..11.0).contains(&row[4]));
            assert!((1.0..11.0).contains(&row[5]));
            assert!((0.0..8.0).contains(&row[6]));
            assert!((0.0..35.0).contains(&row[7]));
            assert!((0.0..2.0).contains(&row[8]));
        }
    }

    #[test]
    fn split_partitions_all_rows() {
        let dataset = generate_dataset(100, 42);
        let (train, test) = split_train_test(&dataset, 0.2, 42);
        assert_eq!(test.x.len(), 20);
        assert_eq!(train.x.len(), 80);
        assert_eq!(train.classes, dataset.classes);
    }
}
