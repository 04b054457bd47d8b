// Report file naming: `<stem>_cadence.<ext>` next to the source or in an output directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Marker in every report file name; discovery skips files carrying it
pub const REPORT_SUFFIX: &str = "_cadence";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Markdown,
    Text,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

/// Path of the report for `source` in `format`. Without `out_dir` the report
/// lands beside the source.
pub fn report_path(source: &Path, out_dir: Option<&Path>, format: ReportFormat) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    let name = format!("{stem}{REPORT_SUFFIX}.{}", format.extension());
    match out_dir {
        Some(dir) => dir.join(name),
        None => source.with_file_name(name),
    }
}

/// True for files this tool wrote, so reruns never analyze their own reports
pub fn is_report_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(REPORT_SUFFIX))
}
