//! Per-file feature standardization.
//!
//! The 512 feature columns are four concatenated 128-wide extractor
//! outputs, each on its own scale. Standardization is therefore computed
//! per sub-block, over every element of that block in the file (not per
//! column), so the relative structure inside a block survives while the
//! blocks land on a comparable scale.

use crate::schema::{sub_block_range, NUM_SUB_BLOCKS};
use ndarray::{s, Array2};

/// Minimum std; blocks flatter than this are centered without scaling.
const MIN_STD: f64 = 1e-8;

/// Standardize each 128-column sub-block of `features` in place.
///
/// Statistics are population statistics over all rows and columns of the
/// block, computed on this file alone.
pub fn standardize_sub_blocks(features: &mut Array2<f64>) {
    if features.nrows() == 0 {
        return;
    }

    for block in 0..NUM_SUB_BLOCKS {
        let range = sub_block_range(block);
        let mut view = features.slice_mut(s![.., range]);

        let mean = view.mean().unwrap_or(0.0);
        let std = view.std(0.0);
        let std = if std < MIN_STD { 1.0 } else { std };

        log::debug!("sub-block {block}: mean={mean:.6}, std={std:.6}");

        view.mapv_inplace(|v| (v - mean) / std);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FEATURE_COLUMNS;
    use ndarray::Array2;

    #[test]
    fn test_each_block_standardized_independently() {
        // Block b filled with row index scaled by (b + 1): distinct
        // statistics per block, identical after standardization.
        let mut features = Array2::zeros((10, FEATURE_COLUMNS));
        for block in 0..NUM_SUB_BLOCKS {
            for r in 0..10 {
                for c in sub_block_range(block) {
                    features[[r, c]] = (r as f64) * (block as f64 + 1.0);
                }
            }
        }

        standardize_sub_blocks(&mut features);

        for block in 0..NUM_SUB_BLOCKS {
            let range = sub_block_range(block);
            let view = features.slice(s![.., range]);
            assert!(view.mean().unwrap().abs() < 1e-10);
            assert!((view.std(0.0) - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_uses_population_std() {
        // Two rows, block values {0, 2}: population std is 1, so the
        // standardized values are exactly -1 and 1.
        let mut features = Array2::zeros((2, FEATURE_COLUMNS));
        for c in 0..FEATURE_COLUMNS {
            features[[1, c]] = 2.0;
        }

        standardize_sub_blocks(&mut features);

        assert!((features[[0, 0]] - (-1.0)).abs() < 1e-12);
        assert!((features[[1, 0]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_block_centered_not_scaled() {
        let mut features = Array2::from_elem((5, FEATURE_COLUMNS), 42.0);

        standardize_sub_blocks(&mut features);

        for &v in features.iter() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_empty_input_untouched() {
        let mut features = Array2::zeros((0, FEATURE_COLUMNS));
        standardize_sub_blocks(&mut features);
        assert_eq!(features.nrows(), 0);
    }
}
