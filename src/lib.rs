pub mod aggregate;
pub mod analysis;
pub mod annotate;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod lexicon;
pub mod metrics;
pub mod output;
pub mod pattern;
pub mod phonetics;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod richness;
pub mod run_stats;
pub mod segment;
pub mod sentence_detector;
pub mod sentiment;
pub mod turning;
pub mod window;

// Re-export the engine types
pub use aggregate::{AggregateStats, Aggregator, RatioSpec};
pub use classify::{BandTable, Classification, ScoreCard};
pub use metrics::{score_windows, MetricRecord, MetricValue, WindowMetric};
pub use turning::{detect_turning_points, TurningPoint};
pub use window::{TailPolicy, Window, Windower};

// Re-export the run surface
pub use config::AnalysisConfig;
pub use error::{AnnotationError, CadenceError};
pub use lexicon::Lexicon;
pub use output::ReportFormat;
pub use pipeline::{Analyzer, Collaborators};
pub use reader::{ReaderConfig, TextReader};
pub use report::NarrativeReport;
pub use segment::{Document, Segment};
