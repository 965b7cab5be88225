//! File selection.
//!
//! The cursor owns the recording directory listing and decides which file
//! the loader reads next, and whether that read is shifted. Two strategies
//! exist:
//!
//! - **Training**: uniform random selection with replacement, never
//!   shifted. The same file may be drawn many times in a row.
//! - **Evaluation**: sequential shift rotation. Each file is selected
//!   twice in a row, first unshifted and then shifted, before the cursor
//!   advances to the next file in sorted order:
//!
//!   ```text
//!   (file0, unshifted), (file0, shifted), (file1, unshifted), ...
//!   ```
//!
//! Every selection is recorded with a timestamp, newest first, so a run
//! can be audited after the fact.

use crate::config::{FeederConfig, LoaderOptions};
use crate::error::{FeederError, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// A file chosen for the next load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub path: PathBuf,
    /// Drop half a batch from both ends of the file when reading.
    pub shift: bool,
}

/// A past selection, kept for auditing.
#[derive(Debug, Clone)]
pub struct SelectionRecord {
    pub path: PathBuf,
    pub shift: bool,
    pub selected_at: DateTime<Utc>,
}

/// How the next file index is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Uniform random draw, with replacement, never shifted.
    RandomWithReplacement,

    /// Walk the sorted listing, selecting each file unshifted then
    /// shifted before advancing.
    SequentialShiftRotation { index: usize, shift: bool },
}

impl SelectionStrategy {
    /// Strategy for the given mode, positioned at the start.
    pub fn for_mode(is_training: bool) -> Self {
        if is_training {
            SelectionStrategy::RandomWithReplacement
        } else {
            SelectionStrategy::SequentialShiftRotation {
                index: 0,
                shift: false,
            }
        }
    }

    /// Produce the next (file index, shift) pair and advance.
    ///
    /// I/O free: operates purely on the index space `0..file_count`.
    pub fn next_index(&mut self, file_count: usize, rng: &mut StdRng) -> Result<(usize, bool)> {
        match self {
            SelectionStrategy::RandomWithReplacement => Ok((rng.gen_range(0..file_count), false)),
            SelectionStrategy::SequentialShiftRotation { index, shift } => {
                if *index >= file_count {
                    return Err(FeederError::FilesExhausted {
                        visited: *index,
                        available: file_count,
                    });
                }
                let selected = (*index, *shift);
                if *shift {
                    *index += 1;
                    *shift = false;
                } else {
                    *shift = true;
                }
                Ok(selected)
            }
        }
    }
}

/// Tracks which recording file is read next.
#[derive(Debug)]
pub struct FileCursor {
    files: Vec<PathBuf>,
    strategy: SelectionStrategy,
    history: Vec<SelectionRecord>,
    /// Files whose unshifted pass has been selected.
    visited: usize,
}

impl FileCursor {
    /// Scan `data_dir` and build a cursor over its files, sorted by name.
    ///
    /// When `options.overwrite` is false, files whose names already exist
    /// in `options.output_dir` are excluded from the listing. An empty
    /// listing (before or after exclusion) is an error.
    pub fn new(data_dir: &Path, config: &FeederConfig, options: &LoaderOptions) -> Result<Self> {
        let exclude = match (&options.output_dir, options.overwrite) {
            (Some(output_dir), false) => list_names(output_dir)?,
            _ => HashSet::new(),
        };

        let mut files: Vec<PathBuf> = Vec::new();
        let entries = fs::read_dir(data_dir).map_err(|e| FeederError::Io {
            path: data_dir.to_path_buf(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| FeederError::Io {
                path: data_dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name() {
                if exclude.contains(name) {
                    log::debug!("skipping already-processed file {}", path.display());
                    continue;
                }
            }
            files.push(path);
        }
        files.sort();

        if files.is_empty() {
            return Err(FeederError::EmptyDirectory(data_dir.to_path_buf()));
        }

        log::info!(
            "cursor over {} file(s) in {} ({} mode)",
            files.len(),
            data_dir.display(),
            if config.is_training {
                "training"
            } else {
                "evaluation"
            }
        );

        Ok(Self {
            files,
            strategy: SelectionStrategy::for_mode(config.is_training),
            history: Vec::new(),
            visited: 0,
        })
    }

    /// Number of selectable files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of files whose unshifted pass has been selected.
    pub fn files_visited(&self) -> usize {
        self.visited
    }

    /// Selection history, newest first.
    pub fn history(&self) -> &[SelectionRecord] {
        &self.history
    }

    /// Choose the next file and record the selection.
    pub fn next_file(&mut self, rng: &mut StdRng) -> Result<Selection> {
        let (index, shift) = self.strategy.next_index(self.files.len(), rng)?;
        let selection = Selection {
            path: self.files[index].clone(),
            shift,
        };
        if !shift {
            self.visited += 1;
        }
        self.history.insert(
            0,
            SelectionRecord {
                path: selection.path.clone(),
                shift,
                selected_at: Utc::now(),
            },
        );
        Ok(selection)
    }
}

/// File names present in a directory; missing directory counts as empty.
fn list_names(dir: &Path) -> Result<HashSet<OsString>> {
    if !dir.exists() {
        return Ok(HashSet::new());
    }
    let mut names = HashSet::new();
    let entries = fs::read_dir(dir).map_err(|e| FeederError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| FeederError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        names.insert(entry.file_name());
    }
    Ok(names)
}
