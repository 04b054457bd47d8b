use anyhow::Result;
use futures::stream::{Stream, StreamExt};
use glob::glob;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::output::is_report_file;

/// Configuration for source discovery
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Stop at the first inaccessible path instead of recording it
    pub fail_fast: bool,
}

/// A discovered source and whether it can be opened
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub error: Option<String>,
}

impl FileValidation {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Stream every `*.txt` file under `root_dir`, recursively, skipping reports
/// this tool wrote. Paths arrive in glob (lexicographic) order.
pub fn discover_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    let root_path = root_dir.as_ref().to_path_buf();
    futures::stream::unfold(
        DiscoveryState::new(root_path, config),
        |mut state| async move { state.next_file().await.map(|result| (result, state)) },
    )
}

struct DiscoveryState {
    root_dir: PathBuf,
    config: DiscoveryConfig,
    glob_iter: Option<glob::Paths>,
}

impl DiscoveryState {
    fn new(root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            config,
            glob_iter: None,
        }
    }

    async fn next_file(&mut self) -> Option<Result<FileValidation>> {
        if self.glob_iter.is_none() {
            let pattern = format!("{}/**/*.txt", self.root_dir.display());
            debug!("Starting file discovery with pattern: {}", pattern);
            match glob(&pattern) {
                Ok(paths) => self.glob_iter = Some(paths),
                Err(e) => return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e))),
            }
        }

        let glob_iter = self.glob_iter.as_mut()?;
        loop {
            match glob_iter.next()? {
                Ok(path) if is_report_file(&path) => {
                    debug!("Skipping report file: {}", path.display());
                }
                Ok(path) => return Some(validate_file(path, &self.config).await),
                Err(e) => {
                    let error_msg = format!("Glob iteration error: {e}");
                    warn!("{}", error_msg);
                    if self.config.fail_fast {
                        return Some(Err(anyhow::anyhow!(error_msg)));
                    }
                }
            }
        }
    }
}

async fn validate_file(path: PathBuf, config: &DiscoveryConfig) -> Result<FileValidation> {
    let error = match fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => None,
        Ok(_) => Some(format!("Path is not a file: {}", path.display())),
        Err(e) => {
            let error = format!("Cannot access file {}: {}", path.display(), e);
            if config.fail_fast {
                return Err(anyhow::anyhow!(error));
            }
            Some(error)
        }
    };
    if let Some(ref error) = error {
        warn!("{}", error);
    }
    Ok(FileValidation { path, error })
}

/// Collect the discovered files of one directory
pub async fn collect_discovered_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_files(root_dir, config));
    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    let valid_count = files.iter().filter(|f| f.is_valid()).count();
    let invalid_count = files.len() - valid_count;
    if invalid_count > 0 {
        warn!("Found {} files with validation issues", invalid_count);
    }
    info!("File discovery summary: {} valid, {} invalid", valid_count, invalid_count);
    Ok(files)
}

/// Expand CLI inputs: files pass through as given, directories are searched.
/// A missing input is kept so extraction reports it.
pub async fn expand_inputs(inputs: &[PathBuf], config: DiscoveryConfig) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(collect_discovered_files(input, config.clone()).await?);
        } else {
            files.push(FileValidation {
                path: input.clone(),
                error: None,
            });
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        let file_path = dir.join(name);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file_path, content).await?;
        Ok(file_path)
    }

    #[tokio::test]
    async fn test_discover_files_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default())
            .await
            .unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_discovers_text_files_and_skips_reports() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "a_livro.txt", "Texto.").await.unwrap();
        create_test_file(temp_dir.path(), "sub/b_conto.txt", "Outro.").await.unwrap();
        create_test_file(temp_dir.path(), "a_livro_cadence.txt", "Relatório.").await.unwrap();
        create_test_file(temp_dir.path(), "notas.md", "Nada.").await.unwrap();

        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default())
            .await
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_livro.txt", "b_conto.txt"]);
        assert!(files.iter().all(FileValidation::is_valid));
    }

    #[tokio::test]
    async fn test_expand_inputs_keeps_explicit_files() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "dir/um.txt", "Um.").await.unwrap();
        let missing = temp_dir.path().join("falta.txt");

        let files = expand_inputs(
            &[temp_dir.path().join("dir"), missing.clone()],
            DiscoveryConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, file);
        assert_eq!(files[1].path, missing);
    }
}
