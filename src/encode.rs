//! Label encoding.
//!
//! The two label columns (arousal, wake) leave the decoder as raw scalars.
//! This module remaps the ternary wake code to a binary value and expands
//! both labels into a four-wide one-hot logit row:
//!
//! ```text
//! [ 1-arousal, arousal, 1-wake, wake ]
//!   \_ arousal one-hot _/ \_ wake one-hot _/
//! ```

use crate::config::WakeDef;
use crate::schema::LOGIT_WIDTH;
use ndarray::Array2;

/// Collapse the ternary wake code in the wake column (column 1) of a
/// two-column label matrix. Values of 2 become the wake definition's
/// binary value; 0 and 1 pass through.
pub fn remap_wake(targets: &mut Array2<f64>, wake_def: WakeDef) {
    let value = wake_def.remap_value();
    for mut row in targets.rows_mut() {
        if row[1] == 2.0 {
            row[1] = value;
        }
    }
}

/// Expand binary (arousal, wake) label rows into one-hot logit rows.
///
/// Expects labels already remapped to {0, 1}.
pub fn one_hot_logits(targets: &Array2<f64>) -> Array2<f64> {
    let n = targets.nrows();
    let mut logits = Array2::zeros((n, LOGIT_WIDTH));
    for r in 0..n {
        let arousal = targets[[r, 0]];
        let wake = targets[[r, 1]];
        logits[[r, 0]] = 1.0 - arousal;
        logits[[r, 1]] = arousal;
        logits[[r, 2]] = 1.0 - wake;
        logits[[r, 3]] = wake;
    }
    logits
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_remap_wake_only_affects_wake_column() {
        let mut targets = array![[2.0, 2.0], [0.0, 1.0], [1.0, 0.0]];
        remap_wake(&mut targets, WakeDef::WakeOnly);
        // Arousal column untouched even when it holds a 2
        assert_eq!(targets, array![[2.0, 0.0], [0.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_remap_wake_and_n1() {
        let mut targets = array![[0.0, 2.0], [0.0, 0.0]];
        remap_wake(&mut targets, WakeDef::WakeAndN1);
        assert_eq!(targets, array![[0.0, 1.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_one_hot_layout() {
        let targets = array![[0.0, 1.0], [1.0, 0.0], [0.0, 0.0], [1.0, 1.0]];
        let logits = one_hot_logits(&targets);
        assert_eq!(
            logits,
            array![
                [1.0, 0.0, 0.0, 1.0],
                [0.0, 1.0, 1.0, 0.0],
                [1.0, 0.0, 1.0, 0.0],
                [0.0, 1.0, 0.0, 1.0],
            ]
        );
    }

    #[test]
    fn test_one_hot_rows_sum_to_two() {
        let targets = array![[1.0, 0.0], [0.0, 1.0]];
        let logits = one_hot_logits(&targets);
        for row in logits.rows() {
            assert_eq!(row.sum(), 2.0);
        }
    }
}
