//! Feeder configuration.
//!
//! [`FeederConfig`] is the serializable experiment record: the knobs that
//! change what a batch *is* (size, wake definition, training vs. evaluation,
//! weighting scheme). It round-trips through TOML or JSON so a run can be
//! reproduced from a checked-in file.
//!
//! [`LoaderOptions`] holds the per-run operational switches (step budget,
//! overwrite behavior, RNG seed) that are not part of the experiment
//! identity.
//!
//! # Example
//!
//! ```no_run
//! use arousal_feeder::config::FeederConfig;
//!
//! let config = FeederConfig::training().with_batch_size(200);
//! config.save_toml("experiment.toml")?;
//! let loaded = FeederConfig::load_toml("experiment.toml")?;
//! assert_eq!(loaded.batch_size, 200);
//! # Ok::<(), arousal_feeder::FeederError>(())
//! ```

use crate::error::{FeederError, Result};
use crate::weights::WeightApproach;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How the ternary sleep/wake code is collapsed to a binary label.
///
/// Upstream scoring emits 0 (sleep), 1 (wake), or 2 (the N1 stage). The
/// wake definition decides which side of the binary split N1 lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WakeDef {
    /// N1 counts as sleep: wake = {W}. Code 2 maps to 0.
    #[default]
    WakeOnly,

    /// N1 counts as wake: wake = {W, N1}. Code 2 maps to 1.
    WakeAndN1,
}

impl WakeDef {
    /// The binary value the N1 code (2) is remapped to.
    pub fn remap_value(self) -> f64 {
        match self {
            WakeDef::WakeOnly => 0.0,
            WakeDef::WakeAndN1 => 1.0,
        }
    }
}

/// Serializable feeder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederConfig {
    /// Rows per batch. Must be positive and even (the evaluation shift
    /// trims half a batch from each end of the file).
    pub batch_size: usize,

    /// Collapse policy for the ternary sleep/wake label.
    pub wake_def: WakeDef,

    /// Training mode: random file selection with replacement and shuffled
    /// batch order. Evaluation mode: sequential shift rotation and identity
    /// batch order.
    pub is_training: bool,

    /// Weighting scheme applied independently to each label column.
    #[serde(default)]
    pub weight_approach: WeightApproach,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            wake_def: WakeDef::default(),
            is_training: false,
            weight_approach: WeightApproach::default(),
        }
    }
}

impl FeederConfig {
    /// Default configuration for a training split.
    pub fn training() -> Self {
        Self {
            is_training: true,
            ..Self::default()
        }
    }

    /// Default configuration for an evaluation split.
    pub fn evaluation() -> Self {
        Self::default()
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the wake definition.
    pub fn with_wake_def(mut self, wake_def: WakeDef) -> Self {
        self.wake_def = wake_def;
        self
    }

    /// Set the weighting scheme.
    pub fn with_weight_approach(mut self, approach: WeightApproach) -> Self {
        self.weight_approach = approach;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(FeederError::InvalidConfig(
                "batch_size must be > 0".to_string(),
            ));
        }
        if self.batch_size % 2 != 0 {
            return Err(FeederError::InvalidConfig(format!(
                "batch_size must be even for half-batch shift windows, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| FeederError::InvalidConfig(format!("TOML serialization failed: {e}")))?;
        fs::write(path.as_ref(), text).map_err(|e| FeederError::Io {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Load and validate configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| FeederError::Io {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| FeederError::InvalidConfig(format!("TOML parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| FeederError::InvalidConfig(format!("JSON serialization failed: {e}")))?;
        fs::write(path.as_ref(), text).map_err(|e| FeederError::Io {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Load and validate configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| FeederError::Io {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| FeederError::InvalidConfig(format!("JSON parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Per-run operational options for [`crate::BatchLoader`].
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Step budget: stop after exactly this many batches. `None` falls back
    /// to the file-load safety cap.
    pub num_steps: Option<usize>,

    /// When false, files whose names already exist in `output_dir` are
    /// excluded from selection (resume-after-interrupt behavior).
    pub overwrite: bool,

    /// Directory of already-produced outputs; only consulted when
    /// `overwrite` is false.
    pub output_dir: Option<PathBuf>,

    /// Seed for file selection and batch shuffling. `None` draws from
    /// entropy; set it for reproducible runs and tests.
    pub seed: Option<u64>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            num_steps: None,
            overwrite: true,
            output_dir: None,
            seed: None,
        }
    }
}

impl LoaderOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step budget.
    pub fn with_num_steps(mut self, steps: usize) -> Self {
        self.num_steps = Some(steps);
        self
    }

    /// Skip files already present in `output_dir`.
    pub fn skip_processed<P: AsRef<Path>>(mut self, output_dir: P) -> Self {
        self.overwrite = false;
        self.output_dir = Some(output_dir.as_ref().to_path_buf());
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
