//! Directory batch processing.
//!
//! Pass one turns every `*.pdf` in the input directory into `<stem>.json` in
//! the output directory. Pass two reads those outlines back, ranks their
//! headings for a persona and writes `persona_analysis.json`. A document that
//! fails in either pass is logged and the batch carries on.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::config::{Directories, PersonaConfig};
use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::extract::OutlineExtractor;
use crate::model::{AnalysisResult, Outline};
use crate::rank::PersonaRanker;
use crate::render::{read_json, write_json, JsonFormat};

/// File name of the combined ranked analysis.
pub const ANALYSIS_FILE_NAME: &str = "persona_analysis.json";

/// Result of extracting one document.
#[derive(Debug)]
pub enum DocumentOutcome {
    Extracted(Outline),
    Failed(Error),
}

impl DocumentOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, DocumentOutcome::Failed(_))
    }

    pub fn outline(&self) -> Option<&Outline> {
        match self {
            DocumentOutcome::Extracted(outline) => Some(outline),
            DocumentOutcome::Failed(_) => None,
        }
    }

    /// The outline to write: the extracted one, or empty on failure.
    pub fn outline_or_empty(&self) -> Outline {
        self.outline().cloned().unwrap_or_default()
    }
}

impl From<Result<Outline>> for DocumentOutcome {
    fn from(result: Result<Outline>) -> Self {
        match result {
            Ok(outline) => DocumentOutcome::Extracted(outline),
            Err(e) => DocumentOutcome::Failed(e),
        }
    }
}

/// Counters and paths collected over a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// The input directory did not exist
    pub input_missing: bool,
    /// PDFs attempted
    pub processed: usize,
    /// PDFs that degraded to an empty outline
    pub failed: usize,
    /// Outline files written
    pub written: Vec<PathBuf>,
    /// Outline files that could not be read back during ranking
    pub skipped_outlines: usize,
    /// Sections in the analysis
    pub ranked_sections: usize,
    pub analysis_path: Option<PathBuf>,
}

/// Runs both passes over a pair of directories.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    dirs: Directories,
    extractor: OutlineExtractor,
    format: JsonFormat,
    timestamp: Option<NaiveDateTime>,
}

impl BatchProcessor {
    pub fn new(dirs: Directories) -> Self {
        Self {
            dirs,
            extractor: OutlineExtractor::default(),
            format: JsonFormat::Pretty,
            timestamp: None,
        }
    }

    pub fn with_extractor(mut self, extractor: OutlineExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Stamp the analysis with a fixed time instead of the current local time.
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn directories(&self) -> &Directories {
        &self.dirs
    }

    /// PDFs in the input directory, in directory-listing order.
    pub fn pdf_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dirs.input)? {
            match entry {
                Ok(entry) if has_pdf_extension(entry.file_name()) => files.push(entry.path()),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable directory entry: {}", e),
            }
        }
        Ok(files)
    }

    /// Output path of the outline for a given PDF.
    pub fn outline_path(&self, pdf: &Path) -> PathBuf {
        let stem = pdf.file_stem().unwrap_or_default().to_string_lossy();
        self.dirs.output.join(format!("{}.json", stem))
    }

    /// Run both passes and write all outputs.
    ///
    /// `on_document` is called after each PDF is extracted, before its outline
    /// is written. Only failing to create the output directory or to write the
    /// analysis is returned as an error.
    pub fn run<F>(&self, config: &PersonaConfig, on_document: F) -> Result<BatchReport>
    where
        F: FnMut(&Path, &DocumentOutcome),
    {
        fs::create_dir_all(&self.dirs.output)?;

        let mut report = BatchReport::default();
        self.extract_all(&mut report, on_document);

        let analysis = self.analyze_with(self.ranker(config), &mut report);
        report.analysis_path = Some(self.write_analysis(&analysis)?);

        Ok(report)
    }

    /// Pass one: extract every PDF and write its outline.
    pub fn extract_all<F>(&self, report: &mut BatchReport, mut on_document: F)
    where
        F: FnMut(&Path, &DocumentOutcome),
    {
        if !self.dirs.input.exists() {
            log::error!("Input directory {} not found", self.dirs.input.display());
            report.input_missing = true;
            return;
        }

        let files = match self.pdf_files() {
            Ok(files) => files,
            Err(e) => {
                log::error!("Cannot list {}: {}", self.dirs.input.display(), e);
                return;
            }
        };

        for pdf in files {
            log::info!("Processing {}", pdf.display());
            let outcome = self.extract_document(&pdf);
            report.processed += 1;
            if outcome.is_failed() {
                report.failed += 1;
            }
            on_document(&pdf, &outcome);

            let out_path = self.outline_path(&pdf);
            match write_json(&out_path, &outcome.outline_or_empty(), self.format) {
                Ok(()) => report.written.push(out_path),
                Err(e) => log::error!("Cannot write {}: {}", out_path.display(), e),
            }
        }
    }

    /// Extract one PDF, logging a failure instead of returning it.
    pub fn extract_document(&self, pdf: &Path) -> DocumentOutcome {
        let outcome = DocumentOutcome::from(self.extractor.extract_file(pdf));
        if let DocumentOutcome::Failed(e) = &outcome {
            log::error!("Error processing {}: {}", pdf.display(), e);
        }
        outcome
    }

    /// Pass two: rank the outlines currently in the output directory.
    pub fn analyze(&self, config: &PersonaConfig) -> AnalysisResult {
        self.analyze_with(self.ranker(config), &mut BatchReport::default())
    }

    fn ranker(&self, config: &PersonaConfig) -> PersonaRanker {
        match self.timestamp {
            Some(ts) => PersonaRanker::with_timestamp(config, ts),
            None => PersonaRanker::new(config),
        }
    }

    fn analyze_with(&self, mut ranker: PersonaRanker, report: &mut BatchReport) -> AnalysisResult {
        for path in self.outline_files() {
            let outline: Outline = match read_json(&path) {
                Ok(outline) => outline,
                Err(e) => {
                    log::error!("Error processing {}: {}", path.display(), e);
                    report.skipped_outlines += 1;
                    continue;
                }
            };

            let stem = path.file_stem().unwrap_or_default().to_string_lossy();
            report.ranked_sections += ranker.add_document(&format!("{}.pdf", stem), &outline);
        }

        ranker.finish()
    }

    /// `*.json` files in the output directory other than the analysis itself.
    fn outline_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dirs.output) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot list {}: {}", self.dirs.output.display(), e);
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter(|path| path.file_name().is_some_and(|name| name != ANALYSIS_FILE_NAME))
            .collect()
    }

    /// Write the analysis to the output directory.
    pub fn write_analysis(&self, analysis: &AnalysisResult) -> Result<PathBuf> {
        let path = self.dirs.output.join(ANALYSIS_FILE_NAME);
        write_json(&path, analysis, self.format)?;
        log::info!("Generated persona analysis: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Heading, HeadingLevel};

    fn processor(dir: &Path) -> BatchProcessor {
        BatchProcessor::new(Directories::new(dir.join("input"), dir.join("output")))
    }

    #[test]
    fn test_outline_path_uses_stem() {
        let p = BatchProcessor::new(Directories::new("in", "out"));
        assert_eq!(p.outline_path(Path::new("in/Report.PDF")), PathBuf::from("out/Report.json"));
        assert_eq!(p.outline_path(Path::new("in/a.b.pdf")), PathBuf::from("out/a.b.json"));
    }

    #[test]
    fn test_outcome_conversion() {
        let ok = DocumentOutcome::from(Ok(Outline {
            title: "T".to_string(),
            headings: vec![],
        }));
        assert!(!ok.is_failed());
        assert_eq!(ok.outline_or_empty().title, "T");

        let failed = DocumentOutcome::from(Err(Error::UnknownFormat));
        assert!(failed.is_failed());
        assert!(failed.outline().is_none());
        assert_eq!(failed.outline_or_empty(), Outline::empty());
    }

    #[test]
    fn test_missing_input_directory() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor(dir.path());
        let mut calls = 0;
        let report = p.run(&PersonaConfig::default(), |_, _| calls += 1).unwrap();

        assert!(report.input_missing);
        assert_eq!(calls, 0);
        assert_eq!(report.processed, 0);
        let analysis_path = report.analysis_path.unwrap();
        assert!(analysis_path.exists());
        let analysis: AnalysisResult = read_json(&analysis_path).unwrap();
        assert!(analysis.metadata.input_documents.is_empty());
    }

    #[test]
    fn test_analyze_skips_bad_files_and_previous_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor(dir.path());
        let out = &p.directories().output;
        fs::create_dir_all(out).unwrap();

        let outline = Outline {
            title: "Guide".to_string(),
            headings: vec![
                Heading::new(HeadingLevel::H1, "Research Methods", 2),
                Heading::new(HeadingLevel::H2, "Glossary", 5),
            ],
        };
        write_json(out.join("guide.json"), &outline, JsonFormat::Pretty).unwrap();
        fs::write(out.join("broken.json"), "{ nope").unwrap();
        fs::write(out.join(ANALYSIS_FILE_NAME), "{}").unwrap();
        fs::write(out.join("notes.txt"), "ignored").unwrap();

        let mut report = BatchReport::default();
        let analysis = p.analyze_with(p.ranker(&PersonaConfig::default()), &mut report);

        assert_eq!(analysis.metadata.input_documents, vec!["guide.pdf"]);
        assert_eq!(report.skipped_outlines, 1);
        assert_eq!(analysis.extracted_sections.len(), 1);
        assert_eq!(analysis.extracted_sections[0].section_title, "Research Methods");
        assert_eq!(analysis.extracted_sections[0].page_number, 2);
    }

    #[test]
    fn test_invalid_pdf_yields_empty_outline_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor(dir.path());
        fs::create_dir_all(&p.directories().input).unwrap();
        fs::write(p.directories().input.join("bad.pdf"), b"this is not a pdf").unwrap();
        fs::write(p.directories().input.join("readme.txt"), b"skip me").unwrap();

        let mut failures = Vec::new();
        let report = p
            .run(&PersonaConfig::default(), |path, outcome| {
                if outcome.is_failed() {
                    failures.push(path.to_path_buf());
                }
            })
            .unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(failures.len(), 1);

        let written = fs::read_to_string(p.directories().output.join("bad.json")).unwrap();
        let outline: Outline = serde_json::from_str(&written).unwrap();
        assert_eq!(outline, Outline::empty());
        assert!(!p.directories().output.join("readme.json").exists());
    }
}
