//! Experience-section segmentation.
//!
//! Locates the work-experience section of a normalized resume using two
//! heading heuristics with deliberately different strictness:
//!
//! - the section **start** is the first line whose lowercased form exactly
//!   equals one of the configured headings (tight, so prose mentioning
//!   "experience" never opens a section);
//! - the section **end** is the first later line that *contains* one of
//!   the stop terms as a substring (loose, because terminator headings are
//!   often decorated, e.g. "EDUCATION & CERTIFICATIONS").
//!
//! The returned range includes the heading line and runs to the end of the
//! document when no stop heading follows.

use crate::models::{Section, SectionLabel};

/// Default start headings, matched by exact equality after lowercasing.
pub const DEFAULT_HEADINGS: &[&str] = &["experience", "work experience", "professional experience"];

/// Default stop terms, matched by substring containment after lowercasing.
pub const DEFAULT_STOP_HEADINGS: &[&str] = &[
    "education",
    "projects",
    "certifications",
    "skills",
    "achievements",
    "personal",
    "languages",
    "contact",
    "summary",
    "objective",
    "hobbies",
    "interests",
];

/// Segmentation vocabulary: ordered heading and stop-heading term lists.
/// Terms are held lowercased so matching never re-normalizes the vocab.
#[derive(Debug, Clone)]
pub struct SegmentVocab {
    headings: Vec<String>,
    stop_headings: Vec<String>,
}

impl SegmentVocab {
    pub fn new(headings: &[String], stop_headings: &[String]) -> Self {
        Self {
            headings: headings.iter().map(|h| h.trim().to_lowercase()).collect(),
            stop_headings: stop_headings
                .iter()
                .map(|s| s.trim().to_lowercase())
                .collect(),
        }
    }
}

impl Default for SegmentVocab {
    fn default() -> Self {
        let headings: Vec<String> = DEFAULT_HEADINGS.iter().map(|s| s.to_string()).collect();
        let stops: Vec<String> = DEFAULT_STOP_HEADINGS.iter().map(|s| s.to_string()).collect();
        Self::new(&headings, &stops)
    }
}

/// Locate the experience section inside a normalized line sequence.
///
/// Returns `None` when no heading matches. Otherwise the section covers
/// `[start, end)` where `start` is the heading line and `end` is the first
/// stop-heading line after it, or the end of the sequence.
pub fn find_section(lines: &[String], vocab: &SegmentVocab) -> Option<Section> {
    let start = lines.iter().position(|line| {
        let lower = line.trim().to_lowercase();
        vocab.headings.iter().any(|h| lower == *h)
    })?;

    let end = lines[start + 1..]
        .iter()
        .position(|line| {
            let lower = line.to_lowercase();
            vocab.stop_headings.iter().any(|s| lower.contains(s.as_str()))
        })
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());

    Some(Section {
        label: SectionLabel::Experience,
        start,
        end,
        text: lines[start..end].join("\n"),
    })
}
