//! Persona-driven ranking of outline headings.
//!
//! Keywords are the lowercased whitespace tokens of `persona + " " + job`
//! longer than two characters. Duplicate tokens are kept, so a word repeated
//! in the persona and job counts twice when it matches. A heading's score is
//! the number of keywords contained in its lowercased text. Ranks restart at 1
//! for every document.

use chrono::{Local, NaiveDateTime};

use crate::config::PersonaConfig;
use crate::model::{AnalysisResult, ExtractedSection, Heading, Outline, SubsectionAnalysis};

/// Tokens of this length or shorter are not keywords.
const MIN_KEYWORD_CHARS: usize = 2;

/// Timestamp layout used in the analysis metadata.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Build the keyword list for a persona and job.
pub fn keywords(persona: &str, job: &str) -> Vec<String> {
    format!("{} {}", persona, job)
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_KEYWORD_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// Count keywords (with multiplicity) occurring in `text`, case-insensitively.
pub fn score(text: &str, keywords: &[String]) -> usize {
    if text.is_empty() || keywords.is_empty() {
        return 0;
    }
    let text = text.to_lowercase();
    keywords.iter().filter(|kw| text.contains(kw.as_str())).count()
}

/// A heading that scored above zero, with its rank within its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedHeading<'a> {
    pub heading: &'a Heading,
    pub score: usize,
    /// 1-based
    pub rank: u32,
}

/// Score and rank the headings of one outline.
///
/// Zero-score headings are dropped; the sort is stable so ties keep
/// extraction order.
pub fn rank_outline<'a>(outline: &'a Outline, keywords: &[String]) -> Vec<RankedHeading<'a>> {
    let mut scored: Vec<(usize, &Heading)> = outline
        .headings
        .iter()
        .map(|h| (score(&h.text, keywords), h))
        .filter(|(s, _)| *s > 0)
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .zip(1u32..)
        .map(|((score, heading), rank)| RankedHeading {
            heading,
            score,
            rank,
        })
        .collect()
}

/// Accumulates ranked sections across documents into an [`AnalysisResult`].
#[derive(Debug)]
pub struct PersonaRanker {
    keywords: Vec<String>,
    result: AnalysisResult,
}

impl PersonaRanker {
    /// Start a ranking run stamped with the current local time.
    pub fn new(config: &PersonaConfig) -> Self {
        Self::with_timestamp(config, Local::now().naive_local())
    }

    /// Start a ranking run with an explicit timestamp.
    pub fn with_timestamp(config: &PersonaConfig, timestamp: NaiveDateTime) -> Self {
        Self {
            keywords: keywords(&config.persona, &config.job),
            result: AnalysisResult::new(
                config.persona.clone(),
                config.job.clone(),
                timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Add one document's outline; returns how many sections it contributed.
    pub fn add_document(&mut self, document: &str, outline: &Outline) -> usize {
        self.result
            .metadata
            .input_documents
            .push(document.to_string());

        let ranked = rank_outline(outline, &self.keywords);
        for entry in &ranked {
            self.result.extracted_sections.push(ExtractedSection {
                document: document.to_string(),
                page_number: entry.heading.page_number,
                section_title: entry.heading.text.clone(),
                importance_rank: entry.rank,
            });
            self.result.subsection_analysis.push(SubsectionAnalysis {
                document: document.to_string(),
                refined_text: entry.heading.text.clone(),
                page_number: entry.heading.page_number,
            });
        }

        log::debug!("{}: {} ranked sections", document, ranked.len());
        ranked.len()
    }

    pub fn finish(self) -> AnalysisResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;
    use chrono::NaiveDate;

    fn outline(texts: &[&str]) -> Outline {
        Outline {
            title: String::new(),
            headings: texts
                .iter()
                .enumerate()
                .map(|(i, t)| Heading::new(HeadingLevel::H1, *t, i as u32 + 1))
                .collect(),
        }
    }

    fn config(persona: &str, job: &str) -> PersonaConfig {
        PersonaConfig {
            persona: persona.to_string(),
            job: job.to_string(),
        }
    }

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_micro_opt(9, 30, 15, 42)
            .unwrap()
    }

    #[test]
    fn test_keywords_filter_and_lowercase() {
        let kws = keywords("Research Analyst", "Find key AI methods in docs");
        assert_eq!(
            kws,
            vec!["research", "analyst", "find", "key", "methods", "docs"]
        );
    }

    #[test]
    fn test_keywords_keep_duplicates() {
        let kws = keywords("Data analyst", "analyst data review");
        assert_eq!(kws, vec!["data", "analyst", "analyst", "data", "review"]);
        assert_eq!(score("Data Review", &kws), 3);
    }

    #[test]
    fn test_score_is_case_insensitive_substring() {
        let kws = keywords("", "method learning");
        assert_eq!(score("Methodology", &kws), 1);
        assert_eq!(score("MACHINE LEARNING METHODS", &kws), 2);
        assert_eq!(score("Results", &kws), 0);
        assert_eq!(score("", &kws), 0);
        assert_eq!(score("anything", &[]), 0);
    }

    #[test]
    fn test_zero_scores_dropped_and_ranks_contiguous() {
        let doc = outline(&["Intro", "Methods", "Learning Methods", "Appendix", "Data"]);
        let kws = keywords("", "methods learning data");
        let ranked = rank_outline(&doc, &kws);

        let texts: Vec<&str> = ranked.iter().map(|r| r.heading.text.as_str()).collect();
        assert_eq!(texts, vec!["Learning Methods", "Methods", "Data"]);
        let ranks: Vec<u32> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_keep_extraction_order() {
        let doc = outline(&["Beta review", "Alpha review", "Gamma review"]);
        let ranked = rank_outline(&doc, &keywords("", "review"));
        let texts: Vec<&str> = ranked.iter().map(|r| r.heading.text.as_str()).collect();
        assert_eq!(texts, vec!["Beta review", "Alpha review", "Gamma review"]);
    }

    #[test]
    fn test_ranker_resets_rank_per_document() {
        let mut ranker =
            PersonaRanker::with_timestamp(&config("Analyst", "survey methods"), fixed_time());
        assert_eq!(ranker.add_document("a.pdf", &outline(&["Survey", "Methods"])), 2);
        assert_eq!(ranker.add_document("b.pdf", &outline(&["Nothing here"])), 0);
        assert_eq!(ranker.add_document("c.pdf", &outline(&["Methods"])), 1);
        let result = ranker.finish();

        assert_eq!(result.metadata.input_documents, vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert_eq!(result.metadata.processing_timestamp, "2024-03-05T09:30:15.000042");
        assert_eq!(result.metadata.persona, "Analyst");
        assert_eq!(result.metadata.job_to_be_done, "survey methods");

        let ranks: Vec<(&str, u32)> = result
            .extracted_sections
            .iter()
            .map(|s| (s.document.as_str(), s.importance_rank))
            .collect();
        assert_eq!(ranks, vec![("a.pdf", 1), ("a.pdf", 2), ("c.pdf", 1)]);

        assert_eq!(result.subsection_analysis.len(), result.extracted_sections.len());
        for (section, sub) in result
            .extracted_sections
            .iter()
            .zip(&result.subsection_analysis)
        {
            assert_eq!(section.section_title, sub.refined_text);
            assert_eq!(section.page_number, sub.page_number);
        }
    }
}
