// Runs every analysis over one document and assembles the report.

use indicatif::ProgressBar;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analysis::{
    classes_report, crutch_report, dialogue_report, filler_patterns, keyword_report, name_consistency,
    rhythm_report, sentiment_arc, sound_report, style_report,
};
use crate::annotate::{Annotator, HeuristicAnnotator};
use crate::config::AnalysisConfig;
use crate::error::{AnnotationError, CadenceError, Result};
use crate::lexicon::Lexicon;
use crate::pattern::PatternSet;
use crate::phonetics::{OrthographicPhonemizer, Phonemizer};
use crate::report::{NarrativeReport, SegmentOutline, SegmentStyle, StyleSection};
use crate::richness::{DiversityScorer, RichnessScorer};
use crate::segment::{
    clean_text, concatenate, ChapterSplitter, DialogueStripper, Document, Segment, WHOLE_TEXT_TITLE,
};
use crate::sentence_detector::SentenceDetector;
use crate::sentiment::{LexiconSentiment, SentimentScorer};
use crate::window::{whitespace_units, Windower};

/// Analyses run per document, used to size the progress bar
const STEPS: u64 = 9;

/// The injected linguistic backends
#[derive(Clone)]
pub struct Collaborators {
    pub annotator: Arc<dyn Annotator>,
    pub sentiment: Arc<dyn SentimentScorer>,
    pub richness: Arc<dyn RichnessScorer>,
    pub phonemizer: Arc<dyn Phonemizer>,
}

impl Collaborators {
    /// The lexicon-driven defaults shipped with the crate
    pub fn heuristic(lexicon: Arc<Lexicon>) -> Result<Self> {
        let sentiment = LexiconSentiment::new(&lexicon);
        let annotator = HeuristicAnnotator::new(lexicon).map_err(setup_error)?;
        Ok(Self {
            annotator: Arc::new(annotator),
            sentiment: Arc::new(sentiment),
            richness: Arc::new(DiversityScorer::default()),
            phonemizer: Arc::new(OrthographicPhonemizer),
        })
    }
}

fn setup_error(e: AnnotationError) -> CadenceError {
    CadenceError::Config {
        path: "<collaborators>".into(),
        message: e.to_string(),
    }
}

fn whole_text(e: AnnotationError) -> CadenceError {
    CadenceError::annotation(WHOLE_TEXT_TITLE, e)
}

/// Compiled analysis state shared by every document of a run
pub struct Analyzer {
    config: AnalysisConfig,
    lexicon: Arc<Lexicon>,
    collaborators: Collaborators,
    detector: SentenceDetector,
    splitter: ChapterSplitter,
    fillers: PatternSet,
    stripper: DialogueStripper,
    progress: ProgressBar,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig, lexicon: Arc<Lexicon>, collaborators: Collaborators) -> Result<Self> {
        let detector = SentenceDetector::with_default_rules().map_err(setup_error)?;
        let splitter = ChapterSplitter::new(&config.chapter_heading)?;
        let fillers = filler_patterns(&lexicon, &config.crutches)?;
        let stripper = DialogueStripper::new()?;
        debug!("Analyzer ready with {} filler phrases", fillers.len());
        Ok(Self {
            config,
            lexicon,
            collaborators,
            detector,
            splitter,
            fillers,
            stripper,
            progress: ProgressBar::hidden(),
        })
    }

    /// Advance `progress` once per analysis step
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn step(&self, name: &'static str) {
        self.progress.set_message(name);
        self.progress.inc(1);
    }

    /// Annotation failures abort the document and name the failing segment
    pub fn analyze(&self, document: &Document) -> Result<NarrativeReport> {
        let config = &self.config;
        let collaborators = &self.collaborators;
        self.progress.inc_length(STEPS);

        let text = clean_text(&document.text);
        let chapters = self.splitter.split(&text);
        let global = concatenate(&chapters);
        let word_count = whitespace_units(&text).len();
        info!(
            "Analyzing {}: {} words in {} segments",
            document.source.display(),
            word_count,
            chapters.len()
        );

        let arc = sentiment_arc(
            &text,
            Windower::new(config.window.size, config.window.tail),
            config.turning_point_threshold,
            &config.arc.tone_bands,
            collaborators.sentiment.as_ref(),
            config.workers,
        )
        .map_err(whole_text)?;
        self.step("sentiment arc");

        let crutches = crutch_report(&text, &self.fillers, &config.crutches, config.window.tail, config.workers)
            .map_err(whole_text)?;
        self.step("crutch phrases");

        let themes = keyword_report(&text, &self.lexicon, &config.themes);
        self.step("keywords");

        let names = name_consistency(&text, &self.lexicon, &config.names);
        self.step("names");

        let dialogue = dialogue_report(&text, &self.lexicon, &config.dialogue)?;
        self.step("dialogue");

        let classes = classes_report(
            &chapters,
            collaborators.annotator.as_ref(),
            &self.lexicon,
            &config.classes,
        )?;
        self.step("word classes");

        let rhythm = rhythm_report(&text, &self.detector, &config.rhythm);
        self.step("rhythm");

        let sound = sound_report(&text, &self.detector, collaborators.phonemizer.as_ref()).map_err(whole_text)?;
        self.step("sound figures");

        let style = self.style_section(&chapters, &global.text)?;
        self.step("style");

        let segments = chapters
            .iter()
            .map(|s| SegmentOutline {
                title: s.title.clone(),
                order_index: s.order_index,
                words: whitespace_units(&s.text).len(),
            })
            .collect();

        Ok(NarrativeReport {
            source: document.source.display().to_string(),
            word_count,
            segments,
            arc,
            crutches,
            themes,
            names,
            dialogue,
            classes,
            rhythm,
            sound,
            style,
        })
    }

    fn style_section(&self, chapters: &[Segment], global_text: &str) -> Result<StyleSection> {
        let config = &self.config.style;
        let prepare = |text: &str| {
            if config.strip_dialogue {
                self.stripper.strip(text)
            } else {
                text.to_string()
            }
        };
        let run = |title: &str, text: &str| {
            style_report(
                &prepare(text),
                &self.detector,
                &self.lexicon,
                self.collaborators.richness.as_ref(),
                config,
            )
            .map_err(|e| CadenceError::annotation(title, e))
        };

        let mut segments = Vec::with_capacity(chapters.len());
        for chapter in chapters {
            segments.push(SegmentStyle {
                title: chapter.title.clone(),
                order_index: chapter.order_index,
                report: run(&chapter.title, &chapter.text)?,
            });
        }
        Ok(StyleSection {
            dialogue_stripped: config.strip_dialogue,
            segments,
            global: run(WHOLE_TEXT_TITLE, global_text)?,
        })
    }
}
