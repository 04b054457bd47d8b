// The assembled report of one document and its markdown, text and JSON renderings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

use crate::analysis::{
    ArcReport, ClassesReport, CrutchReport, DialogueReport, FigureKind, NameReport, RhythmReport,
    SoundReport, StyleReport, ThemeReport,
};
use crate::error::{CadenceError, Result};
use crate::output::{report_path, ReportFormat};
use crate::turning::TurningPoint;

/// Stated in place of the sections when the document has no words at all
pub const NO_MEANINGFUL_METRICS: &str = "No meaningful metrics were found: the document contains no words.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentOutline {
    pub title: String,
    pub order_index: usize,
    pub words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStyle {
    pub title: String,
    pub order_index: usize,
    pub report: StyleReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSection {
    /// Quoted speech and dash lines were removed before scoring
    pub dialogue_stripped: bool,
    pub segments: Vec<SegmentStyle>,
    pub global: StyleReport,
}

/// Everything one run learned about one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeReport {
    pub source: String,
    pub word_count: usize,
    pub segments: Vec<SegmentOutline>,
    pub arc: ArcReport,
    pub crutches: CrutchReport,
    pub themes: ThemeReport,
    pub names: NameReport,
    pub dialogue: DialogueReport,
    pub classes: ClassesReport,
    pub rhythm: RhythmReport,
    pub sound: SoundReport,
    pub style: StyleSection,
}

impl NarrativeReport {
    pub fn has_meaningful_metrics(&self) -> bool {
        self.word_count > 0
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Markdown => {
                let mut out = Markdown::default();
                self.write_sections(&mut out);
                Ok(out.finish())
            }
            ReportFormat::Text => {
                let mut out = PlainText::default();
                self.write_sections(&mut out);
                Ok(out.finish())
            }
            ReportFormat::Json => serde_json::to_string_pretty(self)
                .map(|mut json| {
                    json.push('\n');
                    json
                })
                .map_err(|e| CadenceError::ReportWrite {
                    path: self.source.clone().into(),
                    source: e.into(),
                }),
        }
    }

    /// Render every requested format and write it under `out_dir` (or beside the source).
    /// Returns the written paths in format order.
    pub async fn write_all(
        &self,
        source: &Path,
        out_dir: Option<&Path>,
        formats: &[ReportFormat],
    ) -> Result<Vec<std::path::PathBuf>> {
        if let Some(dir) = out_dir {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| CadenceError::ReportWrite {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
        }
        let mut written = Vec::with_capacity(formats.len());
        for &format in formats {
            let path = report_path(source, out_dir, format);
            let contents = self.render(format)?;
            write_report(&path, &contents).await?;
            info!("Wrote {} report to {}", format.extension(), path.display());
            written.push(path);
        }
        Ok(written)
    }

    fn write_sections(&self, out: &mut dyn Renderer) {
        out.heading(1, &format!("Cadence report: {}", self.source));
        out.paragraph(&format!(
            "{} words in {} segment(s).",
            self.word_count,
            self.segments.len()
        ));
        out.table(
            &["#", "Segment", "Words"],
            self.segments
                .iter()
                .map(|s| vec![(s.order_index + 1).to_string(), s.title.clone(), s.words.to_string()])
                .collect(),
        );
        if !self.has_meaningful_metrics() {
            out.paragraph(NO_MEANINGFUL_METRICS);
            return;
        }
        self.write_arc(out);
        self.write_crutches(out);
        self.write_themes(out);
        self.write_names(out);
        self.write_dialogue(out);
        self.write_classes(out);
        self.write_rhythm(out);
        self.write_sound(out);
        self.write_style(out);
    }

    fn write_arc(&self, out: &mut dyn Renderer) {
        let arc = &self.arc;
        out.heading(2, "Sentiment arc");
        if arc.is_insufficient() {
            out.paragraph(&format!(
                "Insufficient data: {} words, fewer than one window of {}.",
                arc.word_count, arc.window_size
            ));
            return;
        }
        out.paragraph(&format!(
            "{} windows of {} words, threshold {}. Overall tone: {}.",
            arc.windows.len(),
            arc.window_size,
            arc.threshold,
            arc.tone
        ));
        out.table(
            &["Window", "Start", "Words", "Compound"],
            arc.windows
                .iter()
                .map(|w| {
                    vec![
                        w.window.window_index.to_string(),
                        w.window.start_offset.to_string(),
                        w.window.token_count.to_string(),
                        format!("{:.3}", w.compound),
                    ]
                })
                .collect(),
        );
        write_turning_points(out, "Turning points", &arc.turning_points, "Compound");
    }

    fn write_crutches(&self, out: &mut dyn Renderer) {
        let crutches = &self.crutches;
        out.heading(2, "Crutch phrases");
        out.paragraph(&format!(
            "{} matches in {} words ({:.2}% of words).",
            crutches.total_matches, crutches.total_words, crutches.rate_pct
        ));
        if crutches.phrases.is_empty() {
            return;
        }
        out.table(
            &["Phrase", "Count", "Share %"],
            crutches
                .phrases
                .iter()
                .map(|p| vec![p.phrase.clone(), p.count.to_string(), format!("{:.1}", p.share_pct)])
                .collect(),
        );
        out.table(
            &["Window", "Words", "Matches", "Per 1000"],
            crutches
                .windows
                .iter()
                .map(|w| {
                    vec![
                        w.window.window_index.to_string(),
                        w.window.token_count.to_string(),
                        w.matches.to_string(),
                        format!("{:.2}", w.per_1000),
                    ]
                })
                .collect(),
        );
        write_turning_points(out, "Rate jumps", &crutches.turning_points, "Per 1000");
    }

    fn write_themes(&self, out: &mut dyn Renderer) {
        let themes = &self.themes;
        out.heading(2, "Thematic keywords");
        out.paragraph(&format!(
            "{} tokens, {} analyzed, {} distinct.",
            themes.total_tokens, themes.analyzed_tokens, themes.distinct_words
        ));
        out.table(
            &["Word", "Count", "%"],
            themes
                .keywords
                .iter()
                .map(|k| vec![k.word.clone(), k.count.to_string(), format!("{:.2}", k.pct)])
                .collect(),
        );
    }

    fn write_names(&self, out: &mut dyn Renderer) {
        let names = &self.names;
        out.heading(2, "Name consistency");
        if names.is_consistent() {
            out.paragraph(&format!(
                "No spelling variants among {} candidate names (cutoff {}).",
                names.candidates, names.min_occurrences
            ));
            return;
        }
        out.table(
            &["Name", "Total", "Spellings"],
            names
                .inconsistencies
                .iter()
                .map(|g| {
                    let variants = g
                        .variants
                        .iter()
                        .map(|v| format!("{} ({})", v.spelling, v.count))
                        .collect::<Vec<_>>()
                        .join(", ");
                    vec![g.base.clone(), g.total.to_string(), variants]
                })
                .collect(),
        );
    }

    fn write_dialogue(&self, out: &mut dyn Renderer) {
        let dialogue = &self.dialogue;
        out.heading(2, "Dialogue and interactions");
        out.paragraph(&format!(
            "{} candidate names, {} unattributed speech spans.",
            dialogue.names.len(),
            dialogue.unattributed
        ));
        out.table(
            &["Speaker", "Lines"],
            dialogue
                .speakers
                .iter()
                .map(|s| vec![s.name.clone(), s.lines.to_string()])
                .collect(),
        );
        out.table(
            &["Pair", "Co-occurrences"],
            dialogue
                .interactions
                .iter()
                .map(|i| vec![format!("{} / {}", i.pair.0, i.pair.1), i.count.to_string()])
                .collect(),
        );
    }

    fn write_classes(&self, out: &mut dyn Renderer) {
        let classes = &self.classes;
        out.heading(2, "Word classes");
        out.table(
            &["Segment", "N/V", "ADJ/N", "Verbs %", "Pace", "Adjectivation"],
            classes
                .segments
                .iter()
                .map(|s| {
                    vec![
                        s.title.clone(),
                        format!("{:.2}", s.stats.ratio("n_v")),
                        format!("{:.2}", s.stats.ratio("adj_n")),
                        format!("{:.1}", s.stats.ratio("verb_density_pct")),
                        s.pace.to_string(),
                        s.adjectivation.to_string(),
                    ]
                })
                .collect(),
        );
        out.table(
            &["Global ratio", "Value"],
            classes
                .global
                .ratios
                .iter()
                .map(|(name, value)| vec![name.clone(), format!("{value:.2}")])
                .collect(),
        );
        out.paragraph(&format!("Pace: {}. Adjectivation: {}.", classes.pace, classes.adjectivation));
        out.bullets(&classes.alerts);
    }

    fn write_rhythm(&self, out: &mut dyn Renderer) {
        let rhythm = &self.rhythm;
        out.heading(2, "Paragraph rhythm");
        out.paragraph(&format!(
            "{} paragraphs, {:.1}% monotonous. Overall: {}.",
            rhythm.paragraphs.len(),
            rhythm.stats.ratio("monotonous_pct"),
            rhythm.classification
        ));
        out.table(
            &["Paragraph", "Sentences", "IR", "SW", "Rhythm"],
            rhythm
                .paragraphs
                .iter()
                .map(|p| {
                    vec![
                        p.number.to_string(),
                        p.sentence_lengths.len().to_string(),
                        format!("{:.3}", p.ir),
                        p.sw.to_string(),
                        p.classification.to_string(),
                    ]
                })
                .collect(),
        );
        write_turning_points(out, "Rhythm shifts", &rhythm.shifts, "IR");
    }

    fn write_sound(&self, out: &mut dyn Renderer) {
        let sound = &self.sound;
        out.heading(2, "Sound figures");
        out.paragraph(&format!(
            "{} alliterations and {} assonances across {} of {} sentences.",
            sound.alliterations,
            sound.assonances,
            sound.figures.len(),
            sound.sentences
        ));
        let lines: Vec<String> = sound
            .figures
            .iter()
            .map(|s| {
                let figures = s
                    .figures
                    .iter()
                    .map(|f| {
                        let kind = match f.kind {
                            FigureKind::Alliteration => "alliteration",
                            FigureKind::Assonance => "assonance",
                        };
                        format!("{kind} /{}/: {}", f.key, f.words.join(" "))
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("{}. {} [{}]", s.number, s.sentence, figures)
            })
            .collect();
        out.bullets(&lines);
    }

    fn write_style(&self, out: &mut dyn Renderer) {
        let style = &self.style;
        out.heading(2, "Style");
        if style.dialogue_stripped {
            out.paragraph("Dialogue removed before analysis.");
        }
        let global = &style.global;
        out.paragraph(&format!(
            "Score {:.1} / 100. {} words, {} sentences, mean sentence {:.1} words (min {}, max {}).",
            global.score.value,
            global.words,
            global.sentences,
            global.mean_sentence_length,
            global.min_sentence_length,
            global.max_sentence_length
        ));
        out.table(
            &["Metric", "Value"],
            global
                .metrics
                .iter()
                .map(|(name, value)| vec![name.clone(), format!("{value:.3}")])
                .collect(),
        );
        out.bullets(&global.diagnostics);
        out.table(
            &["Segment", "Words", "Score", "Strong verb ratio", "Adverbs"],
            style
                .segments
                .iter()
                .map(|s| {
                    vec![
                        s.title.clone(),
                        s.report.words.to_string(),
                        format!("{:.1}", s.report.score.value),
                        format!("{:.2}", s.report.strong_verb_ratio),
                        s.report.adverbs.to_string(),
                    ]
                })
                .collect(),
        );
        out.table(
            &["Word", "Count"],
            global
                .top_words
                .iter()
                .map(|(word, count)| vec![word.clone(), count.to_string()])
                .collect(),
        );
        if !global.highlights.is_empty() {
            out.heading(3, "Highlighted sentences");
            out.bullets(&global.highlights);
        }
    }
}

fn write_turning_points(out: &mut dyn Renderer, title: &str, points: &[TurningPoint], value_label: &str) {
    out.heading(3, title);
    if points.is_empty() {
        out.paragraph("None above the threshold.");
        return;
    }
    out.table(
        &["From", "To", "Delta", value_label],
        points
            .iter()
            .map(|p| {
                vec![
                    p.from_window_index.to_string(),
                    p.to_window_index.to_string(),
                    format!("{:.3}", p.delta),
                    format!("{:.3}", p.value),
                ]
            })
            .collect(),
    );
}

async fn write_report(path: &Path, contents: &str) -> Result<()> {
    let wrap = |source: std::io::Error| CadenceError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = tokio::fs::File::create(path).await.map_err(wrap)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents.as_bytes()).await.map_err(wrap)?;
    writer.flush().await.map_err(wrap)?;
    Ok(())
}

/// Block-level sink the sections are written into
trait Renderer {
    fn heading(&mut self, level: usize, text: &str);
    fn paragraph(&mut self, text: &str);
    fn bullets(&mut self, items: &[String]);
    /// Empty tables are skipped
    fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>);
}

#[derive(Default)]
struct Markdown {
    out: String,
}

impl Markdown {
    fn finish(self) -> String {
        self.out
    }
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}

impl Renderer for Markdown {
    fn heading(&mut self, level: usize, text: &str) {
        self.out.push_str(&"#".repeat(level));
        self.out.push(' ');
        self.out.push_str(text);
        self.out.push_str("\n\n");
    }

    fn paragraph(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push_str("\n\n");
    }

    fn bullets(&mut self, items: &[String]) {
        if items.is_empty() {
            return;
        }
        for item in items {
            self.out.push_str("- ");
            self.out.push_str(item);
            self.out.push('\n');
        }
        self.out.push('\n');
    }

    fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) {
        if rows.is_empty() {
            return;
        }
        self.out.push_str(&format!("| {} |\n", headers.join(" | ")));
        self.out.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
        for row in rows {
            let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
            self.out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        self.out.push('\n');
    }
}

#[derive(Default)]
struct PlainText {
    out: String,
}

impl PlainText {
    fn finish(self) -> String {
        self.out
    }
}

impl Renderer for PlainText {
    fn heading(&mut self, level: usize, text: &str) {
        let rule = if level == 1 { '=' } else { '-' };
        self.out.push_str(text);
        self.out.push('\n');
        self.out.extend(std::iter::repeat(rule).take(text.chars().count()));
        self.out.push_str("\n\n");
    }

    fn paragraph(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push_str("\n\n");
    }

    fn bullets(&mut self, items: &[String]) {
        if items.is_empty() {
            return;
        }
        for item in items {
            self.out.push_str("  * ");
            self.out.push_str(item);
            self.out.push('\n');
        }
        self.out.push('\n');
    }

    fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) {
        if rows.is_empty() {
            return;
        }
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        let line = |cells: Vec<&str>| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect();
            format!("{}\n", padded.join("  ").trim_end())
        };
        self.out.push_str(&line(headers.to_vec()));
        for row in &rows {
            self.out.push_str(&line(row.iter().map(String::as_str).collect()));
        }
        self.out.push('\n');
    }
}
