use memmap2::MmapOptions;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::{CadenceError, Result};
use crate::segment::Document;

/// Configuration for source extraction
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
    /// Map the file into memory instead of streaming it line by line
    pub use_mmap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            use_mmap: false,
        }
    }
}

/// Statistics for one extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadStats {
    pub file_path: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
}

fn extraction_error(path: &Path, e: std::io::Error) -> CadenceError {
    if e.kind() == ErrorKind::InvalidData {
        CadenceError::InvalidEncoding {
            path: path.to_path_buf(),
        }
    } else {
        CadenceError::Extraction {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

/// Extracts the text of a plain UTF-8 source file
pub struct TextReader {
    config: ReaderConfig,
}

impl TextReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Load `path` as a document. A missing, unreadable or non-UTF-8 file is an
    /// extraction failure; nothing partial is returned.
    pub async fn read_document<P: AsRef<Path>>(&self, file_path: P) -> Result<(Document, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();
        debug!("Starting read of file: {}", path.display());

        let read = if self.config.use_mmap {
            read_mapped(path)
        } else {
            self.read_lines(path).await
        };
        let text = read.map_err(|e| {
            warn!("Failed to extract {}: {}", path.display(), e);
            e
        })?;

        let stats = ReadStats {
            file_path: path.display().to_string(),
            lines_read: text.lines().count() as u64,
            bytes_read: text.len() as u64,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(
            "Read {}: {} lines, {} bytes in {}ms",
            path.display(),
            stats.lines_read,
            stats.bytes_read,
            stats.duration_ms
        );
        Ok((Document::new(path, text), stats))
    }

    async fn read_lines(&self, path: &Path) -> Result<String> {
        let file = File::open(path).await.map_err(|e| extraction_error(path, e))?;
        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = reader.lines();
        let mut result_lines = Vec::new();
        while let Some(line) = lines.next_line().await.map_err(|e| extraction_error(path, e))? {
            result_lines.push(line);
        }
        Ok(result_lines.join("\n"))
    }
}

fn read_mapped(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|e| extraction_error(path, e))?;
    let len = file.metadata().map_err(|e| extraction_error(path, e))?.len();
    if len == 0 {
        return Ok(String::new());
    }
    // SAFETY: the mapping is read-only and dropped before this function returns
    let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|e| extraction_error(path, e))?;
    let text = std::str::from_utf8(&mmap).map_err(|_| CadenceError::InvalidEncoding {
        path: path.to_path_buf(),
    })?;
    Ok(text.to_string())
}

/// Read a single file with the default configuration
pub async fn read_document<P: AsRef<Path>>(file_path: P) -> Result<Document> {
    let reader = TextReader::new(ReaderConfig::default());
    let (document, _stats) = reader.read_document(file_path).await?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    async fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
        let file_path = dir.join(name);
        fs::write(&file_path, content).await.unwrap();
        file_path
    }

    fn readers() -> [TextReader; 2] {
        [
            TextReader::new(ReaderConfig::default()),
            TextReader::new(ReaderConfig {
                use_mmap: true,
                ..Default::default()
            }),
        ]
    }

    #[tokio::test]
    async fn test_read_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_test_file(temp_dir.path(), "livro.txt", "Linha um\nLinha dois\nÚltima".as_bytes()).await;

        for reader in readers() {
            let (document, stats) = reader.read_document(&file_path).await.unwrap();
            assert_eq!(document.text, "Linha um\nLinha dois\nÚltima");
            assert_eq!(document.source, file_path);
            assert_eq!(stats.lines_read, 3);
        }
    }

    #[tokio::test]
    async fn test_read_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_test_file(temp_dir.path(), "vazio.txt", b"").await;

        for reader in readers() {
            let (document, stats) = reader.read_document(&file_path).await.unwrap();
            assert!(document.is_blank());
            assert_eq!(stats.bytes_read, 0);
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_extraction_error() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nonexistent.txt");

        for reader in readers() {
            let err = reader.read_document(&file_path).await.unwrap_err();
            assert!(matches!(err, CadenceError::Extraction { .. }));
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_encoding_error() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_test_file(temp_dir.path(), "latin1.txt", &[b'c', b'a', 0xE7, b'a', b'\n']).await;

        for reader in readers() {
            let err = reader.read_document(&file_path).await.unwrap_err();
            assert!(matches!(err, CadenceError::InvalidEncoding { .. }), "{err}");
            assert!(err.is_extraction());
        }
    }

    #[tokio::test]
    async fn test_custom_buffer_size() {
        let temp_dir = TempDir::new().unwrap();
        let content = "x".repeat(2048) + "\n" + &"y".repeat(2048);
        let file_path = create_test_file(temp_dir.path(), "large.txt", content.as_bytes()).await;
        let reader = TextReader::new(ReaderConfig {
            buffer_size: 1024,
            use_mmap: false,
        });

        let (document, stats) = reader.read_document(&file_path).await.unwrap();
        assert_eq!(document.text, content);
        assert_eq!(stats.lines_read, 2);
    }
}
