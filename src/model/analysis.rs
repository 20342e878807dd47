//! Persona analysis output types.

use serde::{Deserialize, Serialize};

/// The combined ranked analysis written as `persona_analysis.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metadata: AnalysisMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl AnalysisResult {
    /// Start an empty analysis for a persona and job.
    pub fn new(
        persona: impl Into<String>,
        job_to_be_done: impl Into<String>,
        processing_timestamp: impl Into<String>,
    ) -> Self {
        Self {
            metadata: AnalysisMetadata {
                input_documents: Vec::new(),
                persona: persona.into(),
                job_to_be_done: job_to_be_done.into(),
                processing_timestamp: processing_timestamp.into(),
            },
            extracted_sections: Vec::new(),
            subsection_analysis: Vec::new(),
        }
    }

    /// Sections belonging to one document, in emitted order.
    pub fn sections_for<'a>(
        &'a self,
        document: &'a str,
    ) -> impl Iterator<Item = &'a ExtractedSection> + 'a {
        self.extracted_sections
            .iter()
            .filter(move |s| s.document == document)
    }
}

/// Run metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// PDF filenames whose outlines were loaded
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    /// Local time, `YYYY-MM-DDTHH:MM:SS.ffffff`
    pub processing_timestamp: String,
}

/// A heading that matched at least one keyword, with its per-document rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub page_number: u32,
    pub section_title: String,
    /// 1-based, resets for every document
    pub importance_rank: u32,
}

/// Unranked copy of an extracted section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_json_shape() {
        let mut result =
            AnalysisResult::new("Analyst", "Find methods", "2024-01-01T00:00:00.000000");
        result.metadata.input_documents.push("a.pdf".to_string());
        result.extracted_sections.push(ExtractedSection {
            document: "a.pdf".to_string(),
            page_number: 2,
            section_title: "Methods".to_string(),
            importance_rank: 1,
        });
        result.subsection_analysis.push(SubsectionAnalysis {
            document: "a.pdf".to_string(),
            refined_text: "Methods".to_string(),
            page_number: 2,
        });

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["metadata"]["input_documents"][0], "a.pdf");
        assert_eq!(value["metadata"]["job_to_be_done"], "Find methods");
        assert_eq!(value["extracted_sections"][0]["importance_rank"], 1);
        assert_eq!(value["subsection_analysis"][0]["refined_text"], "Methods");
        assert!(value["subsection_analysis"][0].get("importance_rank").is_none());
    }

    #[test]
    fn test_sections_for() {
        let mut result = AnalysisResult::new("p", "j", "t");
        for (doc, rank) in [("a.pdf", 1), ("b.pdf", 1), ("a.pdf", 2)] {
            result.extracted_sections.push(ExtractedSection {
                document: doc.to_string(),
                page_number: 1,
                section_title: "x".to_string(),
                importance_rank: rank,
            });
        }
        let ranks: Vec<u32> = result.sections_for("a.pdf").map(|s| s.importance_rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }
}
