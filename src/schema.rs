//! Input column layout for per-subject feature files.
//!
//! Each row of a subject file is a fixed-width numeric record: four
//! contiguous 128-wide feature sub-blocks (one per preprocessing channel)
//! followed by two label columns.
//!
//! ```text
//! ┌────────────┬────────────┬────────────┬────────────┬─────────┬──────┐
//! │ block 0    │ block 1    │ block 2    │ block 3    │ arousal │ wake │
//! │ cols 0-127 │ 128-255    │ 256-383    │ 384-511    │ col 512 │ 513  │
//! └────────────┴────────────┴────────────┴────────────┴─────────┴──────┘
//! ```
//!
//! The arousal label is binary {0,1}. The sleep/wake label is a ternary
//! code {0,1,2} where 2 marks the N1 stage; it is collapsed to binary at
//! load time via the configured wake definition (see [`crate::WakeDef`]).

use std::ops::Range;

/// Width of one feature sub-block.
pub const SUB_BLOCK_WIDTH: usize = 128;

/// Number of feature sub-blocks per record.
pub const NUM_SUB_BLOCKS: usize = 4;

/// Total feature columns per record.
pub const FEATURE_COLUMNS: usize = SUB_BLOCK_WIDTH * NUM_SUB_BLOCKS;

/// Trailing label columns per record (arousal, sleep/wake).
pub const LABEL_COLUMNS: usize = 2;

/// Total columns per record.
pub const TOTAL_COLUMNS: usize = FEATURE_COLUMNS + LABEL_COLUMNS;

/// Column index of the arousal label.
pub const AROUSAL_COLUMN: usize = FEATURE_COLUMNS;

/// Column index of the sleep/wake label.
pub const WAKE_COLUMN: usize = FEATURE_COLUMNS + 1;

/// Width of the one-hot logits row (two binary labels, two classes each).
pub const LOGIT_WIDTH: usize = 4;

/// Column range of feature sub-block `block`.
///
/// # Panics
///
/// Panics if `block >= NUM_SUB_BLOCKS`.
pub fn sub_block_range(block: usize) -> Range<usize> {
    assert!(block < NUM_SUB_BLOCKS, "sub-block index out of range");
    block * SUB_BLOCK_WIDTH..(block + 1) * SUB_BLOCK_WIDTH
}
