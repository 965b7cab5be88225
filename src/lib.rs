//! Arousal Feeder
//!
//! Batch feeder for sleep arousal sequence classification models.
//!
//! # Overview
//!
//! This library turns a directory of scored polysomnography recordings
//! (headerless 514-column CSV files: 512 features plus arousal and wake
//! labels) into a stream of model-ready batches. One file is held in
//! memory at a time; each file is standardized, label-encoded, and
//! weighted on load, then walked batch by batch.
//!
//! - **Training**: files drawn at random with replacement, batch order
//!   shuffled within each file
//! - **Evaluation**: files walked in sorted order, each read twice
//!   (unshifted, then shifted by half a batch) so batch windows also
//!   cover the unshifted batch boundaries
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Arousal Feeder                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  schema     - Column layout of the recording format             │
//! │  config     - Feeder configuration + per-run options            │
//! │  decode     - CSV parsing and row trimming                      │
//! │  normalize  - Per-file, per-sub-block standardization           │
//! │  encode     - Wake remap and one-hot logit expansion            │
//! │  weights    - Class-imbalance sample weights                    │
//! │  cursor     - File selection strategies and audit history       │
//! │  loader     - Load pipeline and batch iteration                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use arousal_feeder::{BatchLoader, FeederConfig, LoaderOptions};
//!
//! let config = FeederConfig::training().with_batch_size(100);
//! let options = LoaderOptions::new().with_num_steps(1000).with_seed(42);
//! let loader = BatchLoader::new("data/train", config, options)?;
//!
//! for batch in loader {
//!     let batch = batch?;
//!     // batch.features: (100, 512, 1), batch.logits: (100, 4)
//! }
//! # Ok::<(), arousal_feeder::FeederError>(())
//! ```

pub mod config;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod schema;
pub mod weights;

// Re-exports - Config
pub use config::{FeederConfig, LoaderOptions, WakeDef};

// Re-exports - Cursor
pub use cursor::{FileCursor, Selection, SelectionRecord, SelectionStrategy};

// Re-exports - Loader
pub use loader::{Batch, BatchLoader, MAX_LOAD_RETRIES, REWIND_CAP};

// Re-exports - Weights
pub use weights::{sample_weights, WeightApproach};

// Re-exports - Errors
pub use error::{FeederError, Result};
