//! Run progress checkpoint.
//!
//! Written after every completed job so an aborted run can resume at the
//! next sequence index. The fingerprint ties a checkpoint to the plan that
//! produced it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::DocumentError;

/// Default checkpoint filename, placed in the raw output directory.
pub const CHECKPOINT_FILE: &str = ".turntable-progress.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCheckpoint {
    /// Fingerprint of the job plan.
    pub plan_fingerprint: String,

    /// Total jobs in the plan.
    pub total_jobs: u32,

    /// Highest sequence index fully rendered (0 = none).
    pub last_completed_index: u32,

    /// Last update time (RFC 3339).
    pub updated_at: String,
}

impl RunCheckpoint {
    pub fn new(plan_fingerprint: impl Into<String>, total_jobs: u32) -> Self {
        Self {
            plan_fingerprint: plan_fingerprint.into(),
            total_jobs,
            last_completed_index: 0,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Mark a sequence index as completed.
    pub fn record(&mut self, sequence_index: u32) {
        self.last_completed_index = sequence_index;
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    pub fn is_complete(&self) -> bool {
        self.last_completed_index >= self.total_jobs
    }

    /// Load a checkpoint; a missing file yields `None`.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, DocumentError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path).map_err(|e| DocumentError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let checkpoint = serde_json::from_str(&json).map_err(|e| DocumentError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Some(checkpoint))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| DocumentError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| DocumentError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Default checkpoint location inside an output directory.
    pub fn default_path(output_dir: &Path) -> PathBuf {
        output_dir.join(CHECKPOINT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_complete() {
        let mut checkpoint = RunCheckpoint::new("abc", 3);
        assert!(!checkpoint.is_complete());
        checkpoint.record(3);
        assert_eq!(checkpoint.last_completed_index, 3);
        assert!(checkpoint.is_complete());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("turntable_test_checkpoint");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = RunCheckpoint::default_path(&dir);

        assert_eq!(RunCheckpoint::load(&path).unwrap(), None);

        let mut checkpoint = RunCheckpoint::new("fingerprint", 8);
        checkpoint.record(5);
        checkpoint.save(&path).unwrap();

        let loaded = RunCheckpoint::load(&path).unwrap().unwrap();
        assert_eq!(loaded, checkpoint);

        std::fs::remove_dir_all(&dir).ok();
    }
}
