// Per-file outcome of a run and the summary JSON written at the end.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{CadenceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Success,
    /// Analysed, but the text had no words
    Degenerate,
    Failed,
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    pub path: String,
    pub words: u64,
    pub bytes_read: u64,
    pub turning_points: u64,
    pub processing_time_ms: u64,
    pub status: FileStatus,
    /// Reports written for this file
    pub reports: Vec<PathBuf>,
    pub error: Option<String>,
}

impl FileStats {
    pub fn failed(path: &Path, error: &CadenceError) -> Self {
        Self {
            path: path.display().to_string(),
            words: 0,
            bytes_read: 0,
            turning_points: 0,
            processing_time_ms: 0,
            status: FileStatus::Failed,
            reports: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunStats {
    pub files_processed: u64,
    pub files_failed: u64,
    pub total_words: u64,
    pub run_time_ms: u64,
    pub files: Vec<FileStats>,
}

impl RunStats {
    pub fn record(&mut self, stats: FileStats) {
        match stats.status {
            FileStatus::Failed => self.files_failed += 1,
            FileStatus::Success | FileStatus::Degenerate => self.files_processed += 1,
        }
        self.total_words += stats.words;
        self.files.push(stats);
    }

    pub async fn write(&self, path: &Path) -> Result<()> {
        let wrap = |source: std::io::Error| CadenceError::ReportWrite {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_vec_pretty(self).map_err(|e| wrap(e.into()))?;
        let file = tokio::fs::File::create(path).await.map_err(wrap)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&json).await.map_err(wrap)?;
        writer.write_all(b"\n").await.map_err(wrap)?;
        writer.flush().await.map_err(wrap)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn success(words: u64) -> FileStats {
        FileStats {
            path: "a.txt".into(),
            words,
            bytes_read: words * 6,
            turning_points: 1,
            processing_time_ms: 3,
            status: FileStatus::Success,
            reports: vec![PathBuf::from("a_cadence.md")],
            error: None,
        }
    }

    #[test]
    fn test_record_tallies_outcomes() {
        let mut run = RunStats::default();
        run.record(success(120));
        let missing = CadenceError::Extraction {
            path: "b.txt".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        run.record(FileStats::failed(Path::new("b.txt"), &missing));
        assert_eq!(run.files_processed, 1);
        assert_eq!(run.files_failed, 1);
        assert_eq!(run.total_words, 120);
        assert!(run.files[1].error.as_deref().unwrap().contains("b.txt"));
    }

    #[tokio::test]
    async fn test_write_summary_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run_stats.json");
        let mut run = RunStats::default();
        run.record(success(10));
        run.write(&path).await.unwrap();

        let loaded: RunStats = serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(loaded.files.len(), 1);
        assert_eq!(loaded.files[0].status, FileStatus::Success);
    }
}
