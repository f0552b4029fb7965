//! Best score persistence
//!
//! One integer survives between runs. The store is read when a session starts
//! and after every game over, and written only when a game ends above it.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "score store I/O failed: {}", err),
            StoreError::Json(err) => write!(f, "score store encoding failed: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Json(err) => Some(err),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json(err)
    }
}

/// Somewhere to keep the best score between games
pub trait ScoreStore {
    fn best_score(&self) -> u64;
    fn set_best_score(&mut self, score: u64) -> Result<(), StoreError>;
}

/// Keeps the best score for the life of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best_score(best: u64) -> Self {
        Self { best }
    }
}

impl ScoreStore for MemoryStore {
    fn best_score(&self) -> u64 {
        self.best
    }

    fn set_best_score(&mut self, score: u64) -> Result<(), StoreError> {
        self.best = score;
        Ok(())
    }
}

/// On-disk document
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct ScoreFile {
    best_score: u64,
}

/// Best score kept in a small JSON file.
///
/// Nothing is cached: every read goes back to the file, so a score saved by
/// another run shows up at the next game over.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or unreadable file reads as 0.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        log::info!("Best score file {} holds {}", path.display(), Self::read(&path));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> u64 {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("No best score at {}, starting fresh", path.display());
                return 0;
            }
            Err(err) => {
                log::warn!("Could not read best score from {}: {}", path.display(), err);
                return 0;
            }
        };

        match serde_json::from_str::<ScoreFile>(&json) {
            Ok(file) => file.best_score,
            Err(err) => {
                log::warn!("Ignoring corrupt best score file {}: {}", path.display(), err);
                0
            }
        }
    }
}

impl ScoreStore for JsonFileStore {
    fn best_score(&self) -> u64 {
        Self::read(&self.path)
    }

    fn set_best_score(&mut self, score: u64) -> Result<(), StoreError> {
        let json = serde_json::to_string(&ScoreFile { best_score: score })?;
        fs::write(&self.path, json)?;
        log::info!("Best score saved ({})", score);
        Ok(())
    }
}
