//! Core data models used throughout Resume Harness.
//!
//! These types represent the documents, sections, and extraction results
//! that flow through the ingestion and extraction pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical format of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    Pdf,
    Docx,
}

impl DocFormat {
    /// Maps a file extension (without the dot, any casing) to a format.
    /// Returns `None` for anything outside the supported set.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocFormat::Pdf),
            "docx" => Some(DocFormat::Docx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocFormat::Pdf => "pdf",
            DocFormat::Docx => "docx",
        }
    }
}

impl std::fmt::Display for DocFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ingested resume, immutable once created. Normalization happens once,
/// at ingest; `lines` holds the trimmed non-empty lines in document order.
#[derive(Debug, Clone)]
pub struct Document {
    /// Content-hash identity: hex SHA-256 over name + raw bytes, truncated.
    pub id: String,
    pub name: String,
    pub format: DocFormat,
    /// Raw text as produced by the decoder, before normalization.
    pub raw: String,
    pub lines: Vec<String>,
    pub ingested_at: DateTime<Utc>,
}

/// Semantic label of a located section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionLabel {
    Experience,
}

/// A contiguous sub-range `[start, end)` of a document's line sequence.
/// The heading line itself is included in the range.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub label: SectionLabel,
    pub start: usize,
    pub end: usize,
    /// The covered lines joined back into a single text blob.
    pub text: String,
}

/// One job history entry. Dates are free-form strings as they appear in
/// the resume; `end_date` may be the literal sentinel `"Present"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEntry {
    #[serde(alias = "Company")]
    pub company: String,
    #[serde(alias = "Role")]
    pub role: String,
    #[serde(default, alias = "Start Date", alias = "start")]
    pub start_date: String,
    #[serde(default, alias = "End Date", alias = "end")]
    pub end_date: String,
}

/// Structured career record decoded from the model's response.
///
/// `job_history` preserves resume declaration order; most-recent-first is
/// not guaranteed. The aliases absorb the capitalized field names models
/// commonly emit despite the prompt naming snake_case keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(default, alias = "Full Name", alias = "name", alias = "Name")]
    pub full_name: Option<String>,
    #[serde(
        default,
        alias = "Total Experience",
        alias = "Total Work Experience",
        alias = "total_work_experience"
    )]
    pub total_experience: Option<String>,
    #[serde(default, alias = "Skills")]
    pub skills: Vec<String>,
    #[serde(default, alias = "Job History")]
    pub job_history: Vec<JobEntry>,
}

/// Tagged extraction result, so callers can distinguish trusted structured
/// data from opaque model text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum ExtractionOutcome {
    /// The response decoded into the expected shape.
    Parsed(ExtractionRecord),
    /// The response could not be decoded; carries the raw text verbatim.
    Unparsed(String),
}

/// Snapshot of one document's memoized session state.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub document: Document,
    pub section: Option<Section>,
    pub outcome: Option<ExtractionOutcome>,
    /// True while an extraction is running for this document.
    pub in_flight: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(DocFormat::from_extension("PDF"), Some(DocFormat::Pdf));
        assert_eq!(DocFormat::from_extension("Docx"), Some(DocFormat::Docx));
        assert_eq!(DocFormat::from_extension("txt"), None);
    }

    #[test]
    fn record_decodes_capitalized_aliases() {
        let json = r#"{
            "Full Name": "Ada Lovelace",
            "Total Work Experience": "9 years",
            "Skills": ["analysis"],
            "Job History": [
                {"Company": "Analytical Engines", "Role": "Programmer",
                 "Start Date": "1833", "End Date": "Present"}
            ]
        }"#;
        let record: ExtractionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(record.total_experience.as_deref(), Some("9 years"));
        assert_eq!(record.job_history[0].end_date, "Present");
    }
}
