//! Batch loading and iteration.
//!
//! [`BatchLoader`] drives the whole feeding pipeline. It holds exactly one
//! decoded recording file in memory at a time and hands out fixed-size
//! batches from it, reloading the next file (chosen by the
//! [`FileCursor`]) whenever the current one is spent.
//!
//! Per-file load pipeline:
//!
//! ```text
//! CSV file
//!   | read_trimmed          shift trim (eval), batch trim
//!   v
//! (n, 514) matrix
//!   | split                 features (n, 512) / targets (n, 2)
//!   | standardize           per sub-block z-score, this file only
//!   | remap_wake            ternary wake code -> binary
//!   | sample_weights        per label column
//!   | one_hot_logits        (n, 4)
//!   v
//! features (n, 512, 1), logits (n, 4), weights (n, 2)
//! ```
//!
//! Batch order within a file is shuffled in training mode and sequential
//! in evaluation mode. Unreadable or too-short files are logged and
//! skipped, up to a bounded number of retries.

use crate::config::{FeederConfig, LoaderOptions};
use crate::cursor::{FileCursor, Selection, SelectionRecord};
use crate::decode::read_trimmed;
use crate::encode::{one_hot_logits, remap_wake};
use crate::error::{FeederError, Result};
use crate::normalize::standardize_sub_blocks;
use crate::schema::{FEATURE_COLUMNS, LABEL_COLUMNS, LOGIT_WIDTH};
use crate::weights::sample_weights;
use ndarray::{s, Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Without a step budget, iteration stops once this many files have been
/// loaded and the current one is spent.
pub const REWIND_CAP: usize = 50;

/// Consecutive unusable files (unreadable, malformed, or too short)
/// tolerated before giving up.
pub const MAX_LOAD_RETRIES: usize = 20;

/// One training or evaluation step.
#[derive(Debug, Clone)]
pub struct Batch {
    /// `(batch_size, 512, 1)` standardized features.
    pub features: Array3<f64>,
    /// `(batch_size, 4)` one-hot arousal and wake logits.
    pub logits: Array2<f64>,
    /// `(batch_size, 2)` per-column sample weights.
    pub weights: Array2<f64>,
}

/// Feeds batches from a directory of recording files.
#[derive(Debug)]
pub struct BatchLoader {
    config: FeederConfig,
    options: LoaderOptions,
    cursor: FileCursor,
    select_rng: StdRng,
    shuffle_rng: StdRng,

    // State of the currently loaded file
    current_file: PathBuf,
    rows_in_file: usize,
    features: Array3<f64>,
    logits: Array2<f64>,
    weights: Array2<f64>,
    num_batches: usize,
    batch_order: Vec<usize>,
    batch_cursor: usize,

    loads: usize,
    steps: usize,
}

impl BatchLoader {
    /// Build a loader over `data_dir` and load the first usable file.
    pub fn new<P: AsRef<Path>>(
        data_dir: P,
        config: FeederConfig,
        options: LoaderOptions,
    ) -> Result<Self> {
        config.validate()?;
        let cursor = FileCursor::new(data_dir.as_ref(), &config, &options)?;
        let (select_rng, shuffle_rng) = match options.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_entropy(), StdRng::from_entropy()),
        };

        let mut loader = Self {
            config,
            options,
            cursor,
            select_rng,
            shuffle_rng,
            current_file: PathBuf::new(),
            rows_in_file: 0,
            features: Array3::zeros((0, FEATURE_COLUMNS, 1)),
            logits: Array2::zeros((0, LOGIT_WIDTH)),
            weights: Array2::zeros((0, LABEL_COLUMNS)),
            num_batches: 0,
            batch_order: Vec::new(),
            batch_cursor: 0,
            loads: 0,
            steps: 0,
        };
        loader.load_next_usable()?;
        Ok(loader)
    }

    /// Path of the file currently held in memory.
    pub fn current_file(&self) -> &Path {
        &self.current_file
    }

    /// Row count of the current file after trimming.
    pub fn rows_in_file(&self) -> usize {
        self.rows_in_file
    }

    /// Full batches available in the current file.
    pub fn num_batches(&self) -> usize {
        self.num_batches
    }

    /// Files loaded so far (shifted and unshifted passes both count).
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Batches handed out so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Selection history of the underlying cursor, newest first.
    pub fn history(&self) -> &[SelectionRecord] {
        self.cursor.history()
    }

    /// Extract the batch at logical `index`, mapped through the current
    /// batch order.
    pub fn get_batch(&self, index: usize) -> Result<Batch> {
        if index >= self.num_batches {
            return Err(FeederError::BatchIndexOutOfRange {
                index,
                num_batches: self.num_batches,
            });
        }
        let start = self.batch_order[index] * self.config.batch_size;
        let end = start + self.config.batch_size;
        Ok(Batch {
            features: self.features.slice(s![start..end, .., ..]).to_owned(),
            logits: self.logits.slice(s![start..end, ..]).to_owned(),
            weights: self.weights.slice(s![start..end, ..]).to_owned(),
        })
    }

    /// Hand out the next batch, reloading files as needed.
    ///
    /// Returns `Ok(None)` when iteration is finished:
    /// - the step budget (`num_steps`) is spent;
    /// - under a step budget in evaluation mode, every file's unshifted
    ///   pass has been selected (checked before each batch);
    /// - without a step budget, the current file is spent and
    ///   [`REWIND_CAP`] files have been loaded.
    ///
    /// An unbudgeted evaluation run that spends the whole rotation before
    /// the load cap surfaces the cursor's `FilesExhausted` error instead.
    pub fn next_batch(&mut self) -> Result<Option<Batch>> {
        if let Some(budget) = self.options.num_steps {
            if self.steps >= budget {
                return Ok(None);
            }
            if !self.config.is_training && self.cursor.files_visited() >= self.cursor.file_count()
            {
                return Ok(None);
            }
        }
        if self.batch_cursor >= self.num_batches {
            if self.options.num_steps.is_none() && self.loads >= REWIND_CAP {
                return Ok(None);
            }
            self.load_next_usable()?;
        }

        let index = self.batch_cursor;
        self.batch_cursor += 1;
        self.steps += 1;
        self.get_batch(index).map(Some)
    }

    /// Pull files from the cursor until one loads with at least one full
    /// batch, tolerating up to [`MAX_LOAD_RETRIES`] unusable files.
    fn load_next_usable(&mut self) -> Result<()> {
        for _ in 0..MAX_LOAD_RETRIES {
            let selection = self.cursor.next_file(&mut self.select_rng)?;
            match self.load(&selection) {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    log::warn!(
                        "{}: no full batch after trimming (shift={}), skipping",
                        selection.path.display(),
                        selection.shift
                    );
                }
                Err(e) if e.is_recoverable() => {
                    log::warn!("failed to load {}: {e}", selection.path.display());
                }
                Err(e) => return Err(e),
            }
        }
        Err(FeederError::RetriesExhausted {
            attempts: MAX_LOAD_RETRIES,
        })
    }

    /// Run the full load pipeline for one selection. Returns `Ok(false)`
    /// when the file yields no full batch after trimming.
    fn load(&mut self, selection: &Selection) -> Result<bool> {
        let data = read_trimmed(&selection.path, self.config.batch_size, selection.shift)?;
        let rows = data.nrows();
        if rows == 0 {
            return Ok(false);
        }
        // read_trimmed guarantees whole batches
        assert_eq!(rows % self.config.batch_size, 0);

        let mut features = data.slice(s![.., ..FEATURE_COLUMNS]).to_owned();
        let mut targets = data.slice(s![.., FEATURE_COLUMNS..]).to_owned();

        standardize_sub_blocks(&mut features);
        remap_wake(&mut targets, self.config.wake_def);

        let mut weights = Array2::zeros((rows, LABEL_COLUMNS));
        for col in 0..LABEL_COLUMNS {
            let labels = targets.column(col).to_vec();
            let column_weights = sample_weights(&labels, self.config.weight_approach);
            for (r, w) in column_weights.into_iter().enumerate() {
                weights[[r, col]] = w;
            }
        }

        self.logits = one_hot_logits(&targets);
        self.features = features.insert_axis(Axis(2));
        self.weights = weights;
        self.current_file = selection.path.clone();
        self.rows_in_file = rows;
        self.num_batches = rows / self.config.batch_size;
        self.rewind();

        log::info!(
            "loaded {} ({} rows, {} batches, shift={})",
            selection.path.display(),
            rows,
            self.num_batches,
            selection.shift
        );
        Ok(true)
    }

    /// Reset the batch walk over the current file.
    fn rewind(&mut self) {
        self.loads += 1;
        self.batch_cursor = 0;
        self.batch_order = (0..self.num_batches).collect();
        if self.config.is_training {
            self.batch_order.shuffle(&mut self.shuffle_rng);
        }
    }
}

impl Iterator for BatchLoader {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Write a fixture file: every feature column of row r holds r, the
    /// arousal column alternates 0/1, the wake column cycles 0/1/2.
    fn write_fixture(dir: &Path, name: &str, rows: usize) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        for r in 0..rows {
            let mut fields: Vec<String> = (0..FEATURE_COLUMNS).map(|_| format!("{r}")).collect();
            fields.push(format!("{}", r % 2));
            fields.push(format!("{}", r % 3));
            writeln!(file, "{}", fields.join(",")).unwrap();
        }
    }

    #[test]
    fn test_batch_shapes() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "a.csv", 8);

        let config = FeederConfig::training().with_batch_size(4);
        let options = LoaderOptions::new().with_num_steps(1).with_seed(0);
        let mut loader = BatchLoader::new(dir.path(), config, options).unwrap();

        let batch = loader.next_batch().unwrap().unwrap();
        assert_eq!(batch.features.dim(), (4, FEATURE_COLUMNS, 1));
        assert_eq!(batch.logits.dim(), (4, LOGIT_WIDTH));
        assert_eq!(batch.weights.dim(), (4, LABEL_COLUMNS));
    }

    #[test]
    fn test_num_steps_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "a.csv", 8);

        let config = FeederConfig::training().with_batch_size(4);
        let options = LoaderOptions::new().with_num_steps(7).with_seed(0);
        let loader = BatchLoader::new(dir.path(), config, options).unwrap();

        let batches: Vec<_> = loader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 7);
    }

    #[test]
    fn test_same_seed_same_run() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "a.csv", 12);
        write_fixture(dir.path(), "b.csv", 16);

        let run = || {
            let config = FeederConfig::training().with_batch_size(4);
            let options = LoaderOptions::new().with_num_steps(10).with_seed(99);
            BatchLoader::new(dir.path(), config, options)
                .unwrap()
                .map(|b| b.unwrap().features)
                .collect::<Vec<_>>()
        };

        let first = run();
        let second = run();
        assert_eq!(first.len(), 10);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_get_batch_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "a.csv", 8);

        let config = FeederConfig::training().with_batch_size(4);
        let options = LoaderOptions::new().with_seed(0);
        let loader = BatchLoader::new(dir.path(), config, options).unwrap();

        assert_eq!(loader.num_batches(), 2);
        let err = loader.get_batch(2).unwrap_err();
        assert!(matches!(err, FeederError::BatchIndexOutOfRange { .. }));
    }

    #[test]
    fn test_too_short_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "short.csv", 2);
        write_fixture(dir.path(), "usable.csv", 8);

        let config = FeederConfig::evaluation().with_batch_size(4);
        let options = LoaderOptions::new().with_seed(0);
        let loader = BatchLoader::new(dir.path(), config, options).unwrap();

        assert_eq!(
            loader.current_file().file_name().unwrap(),
            "usable.csv",
            "the short file should have been skipped"
        );
    }

    #[test]
    fn test_all_files_unusable_exhausts_retries() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "a.csv", 2);
        write_fixture(dir.path(), "b.csv", 3);

        let config = FeederConfig::training().with_batch_size(4);
        let options = LoaderOptions::new().with_seed(0);
        let err = BatchLoader::new(dir.path(), config, options).unwrap_err();
        assert!(matches!(err, FeederError::RetriesExhausted { .. }));
    }
}
