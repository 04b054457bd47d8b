// Integration test utilities and common code

use cadence::output::{report_path, ReportFormat};
use cadence::{AnalysisConfig, Analyzer, Collaborators, Lexicon};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Temporary directory holding source texts and their reports
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();
        Self { temp_dir, root_path }
    }

    /// Write a source file, creating parent directories as needed
    pub fn create_source_file<P: AsRef<Path>>(&self, relative_path: P, content: impl AsRef<[u8]>) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root_path.join("reports")
    }

    pub fn report_path<P: AsRef<Path>>(&self, source_path: P, format: ReportFormat) -> PathBuf {
        report_path(source_path.as_ref(), Some(&self.out_dir()), format)
    }

    pub fn read_report<P: AsRef<Path>>(&self, source_path: P, format: ReportFormat) -> Result<String, std::io::Error> {
        fs::read_to_string(self.report_path(source_path, format))
    }
}

/// Analyzer over the built-in lexicon and default collaborators
pub fn analyzer(config: AnalysisConfig) -> Analyzer {
    let lexicon = Arc::new(Lexicon::builtin().expect("builtin lexicon"));
    let collaborators = Collaborators::heuristic(lexicon.clone()).expect("default collaborators");
    Analyzer::new(config, lexicon, collaborators).expect("analyzer")
}

/// Windows small enough for short fixture texts
pub fn small_window_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.window.size = 12;
    config.crutches.window_size = 12;
    config.turning_point_threshold = 0.2;
    config
}
