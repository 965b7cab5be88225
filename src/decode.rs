//! CSV record decoding.
//!
//! Recording files are headerless CSV: one row per scored epoch, 514
//! comma-separated numeric columns (512 features, arousal label, wake
//! label). [`read_trimmed`] parses a file into a dense matrix and applies
//! the two row trims the feeder needs:
//!
//! 1. **Shift trim** (evaluation only): drop `batch_size / 2` rows from
//!    both ends, producing batch windows that straddle the unshifted batch
//!    boundaries.
//! 2. **Batch trim**: truncate to the largest multiple of `batch_size` so
//!    every batch is full.

use crate::error::{FeederError, Result};
use crate::schema::TOTAL_COLUMNS;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a recording file, trimmed to whole batches.
///
/// With `shift` set, `batch_size / 2` rows are dropped from each end
/// before the batch trim. A file shorter than one (shifted) batch yields
/// a matrix with zero rows, not an error; the caller decides whether to
/// retry with another file.
pub fn read_trimmed(path: &Path, batch_size: usize, shift: bool) -> Result<Array2<f64>> {
    let file = File::open(path).map_err(|e| FeederError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let mut values: Vec<f64> = Vec::new();
    let mut rows = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| FeederError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let start = values.len();
        for field in line.split(',') {
            let field = field.trim();
            let value: f64 = field.parse().map_err(|_| FeederError::Parse {
                path: path.to_path_buf(),
                line: line_no + 1,
                value: field.to_string(),
            })?;
            values.push(value);
        }

        let found = values.len() - start;
        if found != TOTAL_COLUMNS {
            return Err(FeederError::ColumnCount {
                path: path.to_path_buf(),
                line: line_no + 1,
                expected: TOTAL_COLUMNS,
                found,
            });
        }
        rows += 1;
    }

    let mut data = Array2::from_shape_vec((rows, TOTAL_COLUMNS), values)
        .expect("row count and value count are consistent by construction");

    if shift {
        let half = batch_size / 2;
        data = if rows > 2 * half {
            data.slice(ndarray::s![half..rows - half, ..]).to_owned()
        } else {
            Array2::zeros((0, TOTAL_COLUMNS))
        };
    }

    let usable = (data.nrows() / batch_size) * batch_size;
    if usable < data.nrows() {
        data = data.slice(ndarray::s![..usable, ..]).to_owned();
    }

    Ok(data)
}
