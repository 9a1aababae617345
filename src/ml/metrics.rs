//! Evaluation metrics reported by the trainer.

/// Confusion matrix for a `K`-class classifier. Rows are true classes,
/// columns are predictions.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<u32>>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            counts: vec![vec![0; n_classes]; n_classes],
        }
    }

    /// Number of classes.
    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    /// Count one (truth, predicted) pair. Out-of-range indices are ignored.
    pub fn record(&mut self, truth: usize, predicted: usize) {
        if let Some(row) = self.counts.get_mut(truth) {
            if let Some(cell) = row.get_mut(predicted) {
                *cell = cell.saturating_add(1);
            }
        }
    }

    /// Count for a (truth, predicted) pair.
    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth][predicted]
    }

    /// Overall accuracy, 0 when the matrix is empty.
    pub fn accuracy(&self) -> f32 {
        let mut correct = 0u64;
        let mut total = 0u64;
        for (truth, row) in self.counts.iter().enumerate() {
            for (predicted, &count) in row.iter().enumerate() {
                total += count as u64;
                if truth == predicted {
                    correct += count as u64;
                }
            }
        }
        if total == 0 {
            0.0
        } else {
            correct as f32 / total as f32
        }
    }
}

/// Precision/recall statistics for a single class.
#[derive(Debug, Clone)]
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes();
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx);
        let support: u32 = (0..k).map(|j| cm.get(class_idx, j)).sum();
        let predicted: u32 = (0..k).map(|i| cm.get(i, class_idx)).sum();
        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        stats.push(PerClassStats {
            precision,
            recall,
            support,
        });
    }
    stats
}

fn ratio(numerator: u32, denominator: u32) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> ConfusionMatrix {
        let mut cm = ConfusionMatrix::new(2);
        // truth 0: 8 right, 2 predicted as 1; truth 1: 5 right, 1 as 0.
        for _ in 0..8 {
            cm.record(0, 0);
        }
        for _ in 0..2 {
            cm.record(0, 1);
        }
        for _ in 0..5 {
            cm.record(1, 1);
        }
        cm.record(1, 0);
        cm
    }

    #[test]
    fn accuracy_counts_the_diagonal() {
        let cm = sample_matrix();
        assert!((cm.accuracy() - 13.0 / 16.0).abs() < 1e-6);
    }

    #[test]
    fn per_class_precision_and_recall() {
        let stats = precision_recall_by_class(&sample_matrix());
        assert!((stats[0].precision - 8.0 / 9.0).abs() < 1e-6);
        assert!((stats[0].recall - 0.8).abs() < 1e-6);
        assert_eq!(stats[0].support, 10);
        assert!((stats[1].precision - 5.0 / 7.0).abs() < 1e-6);
        assert_eq!(stats[1].support, 6);
    }

    #[test]
    fn out_of_range_pairs_are_ignored() {
        let mut cm = ConfusionMatrix::new(2);
        cm.record(5, 0);
        cm.record(0, 5);
        assert_eq!(cm.accuracy(), 0.0);
    }

    #[test]
    fn empty_matrix_has_zero_accuracy() {
        assert_eq!(ConfusionMatrix::new(3).accuracy(), 0.0);
    }
}
