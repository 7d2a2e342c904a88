//! Result Store: the table of analysis records, persisted as one JSON array.
//!
//! Persistence is whole-table overwrite: the array goes to a temp file in the same
//! directory, which is then renamed over the target, so a crash mid-write never
//! leaves a half-written store behind.

use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::models::{AnalysisRecord, RecordFilter};
use crate::scoring::RecommendationStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Dashboard totals over the whole store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub total: usize,
    pub ready_for_interview: usize,
    pub needs_review: usize,
    pub not_recommended: usize,
    pub average_score: f64,
}

#[derive(Debug)]
pub struct ResultStore {
    path: PathBuf,
    records: Vec<AnalysisRecord>,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Loads the store file. A missing file is an empty store; an unreadable or
    /// corrupt one is logged and also treated as empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !path.exists() {
            info!("No result store at {}, starting empty", path.display());
            return Self::new(path);
        }

        match read_records(&path) {
            Ok(records) => {
                info!("Loaded {} analysis records from {}", records.len(), path.display());
                Self { path, records }
            }
            Err(e) => {
                warn!(
                    "Could not load result store {}, starting empty: {e}",
                    path.display()
                );
                Self::new(path)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of every stored name.
    pub fn names(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&AnalysisRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn insert(&mut self, record: AnalysisRecord) {
        self.records.push(record);
    }

    /// Removes every record named `name`, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.name != name);
        before - self.records.len()
    }

    /// Removes `name` and persists. On a failed write the removed records are put
    /// back in place so memory keeps matching disk.
    pub fn delete(&mut self, name: &str) -> Result<usize, StoreError> {
        if !self.contains(name) {
            return Ok(0);
        }
        let snapshot = self.records.clone();
        let removed = self.remove(name);
        if let Err(e) = self.persist() {
            self.records = snapshot;
            return Err(e);
        }
        Ok(removed)
    }

    /// Records matching `filter`, in insertion order.
    pub fn filter(&self, filter: &RecordFilter) -> Vec<AnalysisRecord> {
        self.records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> StoreSummary {
        let count = |status: RecommendationStatus| {
            self.records.iter().filter(|r| r.status == status).count()
        };
        let total = self.len();
        let average_score = if self.is_empty() {
            0.0
        } else {
            self.records.iter().map(|r| f64::from(r.score)).sum::<f64>() / total as f64
        };

        StoreSummary {
            total,
            ready_for_interview: count(RecommendationStatus::ReadyForInterview),
            needs_review: count(RecommendationStatus::NeedsReview),
            not_recommended: count(RecommendationStatus::NotRecommended),
            average_score,
        }
    }

    /// Drops records appended after `len`. Used to undo a batch whose write failed.
    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Writes the full table atomically (temp file + rename).
    pub fn persist(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &self.records)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        info!(
            "Persisted {} analysis records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn read_records(path: &Path) -> Result<Vec<AnalysisRecord>, StoreError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
