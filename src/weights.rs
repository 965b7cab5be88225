//! Class-imbalance sample weights.
//!
//! Arousal events are rare relative to background sleep, so training on raw
//! labels biases the model toward the majority class. Each label column
//! gets a per-row weight vector computed from its own class frequencies.
//!
//! Contract (shared with the training loop): the output has the same length
//! as the input, is deterministic given the inputs, and weights the
//! minority class higher than the majority class.

use serde::{Deserialize, Serialize};

/// Weighting scheme applied to one binary label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeightApproach {
    /// Every sample weighs 1.0 regardless of class balance.
    Uniform,

    /// Inverse class frequency: a sample of class `c` weighs
    /// `n / (2 * n_c)`. Perfectly balanced labels weigh 0.5 each; the
    /// minority class is weighted up in proportion to its rarity.
    #[default]
    Balanced,
}

/// Compute per-sample weights for one binary label column.
///
/// Labels are the raw {0,1} values as floats; anything >= 0.5 counts as the
/// positive class. A class that never occurs contributes no weights and
/// leaves the present class at `n / (2n) = 0.5`.
///
/// # Example
///
/// ```
/// use arousal_feeder::weights::{sample_weights, WeightApproach};
///
/// // 3 negatives, 1 positive: positive weighs 3x the negatives
/// let w = sample_weights(&[0.0, 0.0, 0.0, 1.0], WeightApproach::Balanced);
/// assert_eq!(w, vec![2.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, 2.0]);
/// ```
pub fn sample_weights(labels: &[f64], approach: WeightApproach) -> Vec<f64> {
    match approach {
        WeightApproach::Uniform => vec![1.0; labels.len()],
        WeightApproach::Balanced => balanced_weights(labels),
    }
}

fn balanced_weights(labels: &[f64]) -> Vec<f64> {
    let n = labels.len();
    if n == 0 {
        return Vec::new();
    }

    let positives = labels.iter().filter(|&&l| l >= 0.5).count();
    let negatives = n - positives;

    let pos_weight = class_weight(n, positives);
    let neg_weight = class_weight(n, negatives);

    labels
        .iter()
        .map(|&l| if l >= 0.5 { pos_weight } else { neg_weight })
        .collect()
}

// n / (2 * n_c); the weight is never read when n_c == 0.
fn class_weight(n: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        n as f64 / (2.0 * count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_is_all_ones() {
        let w = sample_weights(&[0.0, 1.0, 0.0], WeightApproach::Uniform);
        assert_eq!(w, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_balanced_labels_weigh_half() {
        let w = sample_weights(&[0.0, 1.0, 0.0, 1.0], WeightApproach::Balanced);
        assert_eq!(w, vec![0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_minority_class_weighs_more() {
        // 1 positive among 10
        let mut labels = vec![0.0; 9];
        labels.push(1.0);
        let w = sample_weights(&labels, WeightApproach::Balanced);

        let pos = w[9];
        let neg = w[0];
        assert!(pos > neg, "minority weight {pos} must exceed majority {neg}");
        assert!((pos - 5.0).abs() < 1e-12); // 10 / (2 * 1)
        assert!((neg - 10.0 / 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_column() {
        let w = sample_weights(&[0.0, 0.0, 0.0], WeightApproach::Balanced);
        assert_eq!(w, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_deterministic() {
        let labels = vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let a = sample_weights(&labels, WeightApproach::Balanced);
        let b = sample_weights(&labels, WeightApproach::Balanced);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input() {
        assert!(sample_weights(&[], WeightApproach::Balanced).is_empty());
    }

    #[test]
    fn test_length_preserved() {
        let labels = vec![1.0; 37];
        assert_eq!(sample_weights(&labels, WeightApproach::Balanced).len(), 37);
    }
}
