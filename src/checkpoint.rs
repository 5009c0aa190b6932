//! Resumable progress for long extraction runs
//!
//! A checkpoint records the results accumulated so far and the index of the
//! next corpus line to process. Detection is pure, so restarting from
//! `next_index` with the stored results gives the same final output as an
//! uninterrupted run.

use crate::results::ResultSets;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CHECKPOINT_FILE: &str = "checkpoint.json";

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt checkpoint {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Index of the first corpus line not yet processed
    pub next_index: usize,
    pub results: ResultSets,
}

impl Checkpoint {
    pub fn new(next_index: usize, results: ResultSets) -> Self {
        Self {
            next_index,
            results,
        }
    }

    pub fn path(dir: &Path) -> PathBuf {
        dir.join(CHECKPOINT_FILE)
    }

    /// Load the checkpoint in `dir`; `Ok(None)` if there is none yet
    pub fn load(dir: &Path) -> Result<Option<Self>, CheckpointError> {
        let path = Self::path(dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CheckpointError::Io { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| CheckpointError::Json { path, source })
    }

    /// Save to `dir`, replacing any previous checkpoint atomically
    pub fn save(&self, dir: &Path) -> Result<PathBuf, CheckpointError> {
        let path = Self::path(dir);
        let tmp = dir.join(format!("{CHECKPOINT_FILE}.tmp"));
        let io_err = |source| CheckpointError::Io {
            path: path.clone(),
            source,
        };

        let content = serde_json::to_vec(self).map_err(|source| CheckpointError::Json {
            path: path.clone(),
            source,
        })?;
        fs::create_dir_all(dir).map_err(io_err)?;
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(path)
    }

    /// Delete the checkpoint in `dir` if present
    pub fn clear(dir: &Path) -> Result<(), CheckpointError> {
        let path = Self::path(dir);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CheckpointError::Io { path, source }),
        }
    }
}
