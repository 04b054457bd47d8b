use anyhow::Result;
use cadence::discovery::{self, DiscoveryConfig};
use cadence::run_stats::{FileStats, FileStatus, RunStats};
use cadence::{AnalysisConfig, Analyzer, Collaborators, Lexicon, ReaderConfig, ReportFormat, TextReader};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(about = "Stylistic and narrative-arc diagnostics for long-form fiction")]
#[command(version)]
struct Args {
    /// Text files or directories to scan for *.txt files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Analysis configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra lexicon entries (TOML), merged into the built-in lexicon
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Use --lexicon instead of the built-in lexicon rather than extending it
    #[arg(long, requires = "lexicon")]
    replace_lexicon: bool,

    /// Words per sentiment window
    #[arg(long)]
    window_size: Option<usize>,

    /// Turning-point threshold on the sentiment series
    #[arg(long)]
    threshold: Option<f64>,

    /// Minimum occurrences before a name's spelling variants are reported
    #[arg(long)]
    min_name_occurrences: Option<usize>,

    /// Directory for reports (default: beside each source)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Report formats to write
    #[arg(long, value_enum, value_delimiter = ',', default_value = "markdown")]
    format: Vec<ReportFormat>,

    /// Use memory-mapped I/O instead of async buffered
    #[arg(long)]
    use_mmap: bool,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Remove dialogue before the style analysis
    #[arg(long)]
    no_dialogue: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,
}

fn load_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(size) = args.window_size {
        config.window.size = size;
    }
    if let Some(threshold) = args.threshold {
        config.turning_point_threshold = threshold;
    }
    if let Some(min) = args.min_name_occurrences {
        config.names.min_occurrences = min;
    }
    if args.no_dialogue {
        config.style.strip_dialogue = true;
    }
    let origin = args.config.clone().unwrap_or_else(|| PathBuf::from("<command line>"));
    config.validate(&origin)?;
    Ok(config)
}

fn load_lexicon(args: &Args) -> Result<Lexicon> {
    match (&args.lexicon, args.replace_lexicon) {
        (Some(path), true) => Ok(Lexicon::load(path)?),
        (Some(path), false) => Ok(Lexicon::builtin()?.merge(Lexicon::load(path)?)),
        (None, _) => Ok(Lexicon::builtin()?),
    }
}

fn progress_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

async fn process_file(
    path: &Path,
    reader: &TextReader,
    analyzer: &Analyzer,
    args: &Args,
) -> cadence::error::Result<FileStats> {
    let start = Instant::now();
    let (document, read_stats) = reader.read_document(path).await?;
    let report = analyzer.analyze(&document)?;
    let reports = report
        .write_all(path, args.out_dir.as_deref(), &args.format)
        .await?;

    Ok(FileStats {
        path: path.display().to_string(),
        words: report.word_count as u64,
        bytes_read: read_stats.bytes_read,
        turning_points: report.arc.turning_points.len() as u64,
        processing_time_ms: start.elapsed().as_millis() as u64,
        status: if report.has_meaningful_metrics() {
            FileStatus::Success
        } else {
            FileStatus::Degenerate
        },
        reports,
        error: None,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).json().init();

    let args = Args::parse();
    info!("Starting cadence");
    info!(?args, "Parsed CLI arguments");

    if args.format.is_empty() {
        anyhow::bail!("At least one report format is required");
    }
    if let Some(ref dir) = args.out_dir {
        if dir.exists() && !dir.is_dir() {
            anyhow::bail!("Output path is not a directory: {}", dir.display());
        }
    }

    let config = load_config(&args)?;
    let lexicon = Arc::new(load_lexicon(&args)?);
    let collaborators = Collaborators::heuristic(lexicon.clone())?;
    let progress = progress_bar(args.no_progress)?;
    let analyzer = Analyzer::new(config, lexicon, collaborators)?.with_progress(progress.clone());

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
    };
    let files = discovery::expand_inputs(&args.inputs, discovery_config).await?;
    info!("Found {} input files", files.len());
    if files.is_empty() {
        anyhow::bail!("No .txt files found in the given inputs");
    }

    let reader = TextReader::new(ReaderConfig {
        use_mmap: args.use_mmap,
        ..Default::default()
    });
    let run_start = Instant::now();
    let mut run = RunStats::default();
    for file in &files {
        let outcome = match &file.error {
            Some(error) => {
                warn!("Skipping {}: {}", file.path.display(), error);
                Err(cadence::CadenceError::Extraction {
                    path: file.path.clone(),
                    source: std::io::Error::other(error.clone()),
                })
            }
            None => process_file(&file.path, &reader, &analyzer, &args).await,
        };
        match outcome {
            Ok(stats) => {
                info!("Analyzed {}: {} words", stats.path, stats.words);
                run.record(stats);
            }
            Err(e) => {
                warn!("Failed {}: {}", file.path.display(), e);
                run.record(FileStats::failed(&file.path, &e));
                if args.fail_fast {
                    progress.abandon();
                    run.write(&args.stats_out).await?;
                    return Err(anyhow::Error::new(e).context(format!("Aborting run at {}", file.path.display())));
                }
            }
        }
    }
    progress.finish_with_message("done");
    run.run_time_ms = run_start.elapsed().as_millis() as u64;
    run.write(&args.stats_out).await?;

    println!("cadence v{}", env!("CARGO_PKG_VERSION"));
    println!("  Analyzed: {} files, {} words", run.files_processed, run.total_words);
    if run.files_failed > 0 {
        println!("  Failed: {} files", run.files_failed);
    }
    println!("  Run stats: {}", args.stats_out.display());

    if run.files_failed > 0 {
        anyhow::bail!("{} of {} files failed", run.files_failed, files.len());
    }
    Ok(())
}
