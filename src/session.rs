//! In-memory per-session document store.
//!
//! One [`SessionStore`] exists per user session and owns all memoized
//! document state: normalized text, the segmented experience section, and
//! the extraction outcome. It is passed explicitly to everything that
//! needs it; there are no ambient globals.
//!
//! Segmentation runs once, when a document enters the store. Extraction
//! is triggered explicitly and serialized per document identity: a second
//! trigger while one is in flight is rejected, never queued, so duplicate
//! triggers cost exactly one inference call. A completed re-trigger
//! overwrites the stored outcome (last-write-wins).

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::models::{CacheEntry, Document, ExtractionOutcome, Section};
use crate::segment::{find_section, SegmentVocab};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("unknown document: {0}")]
    UnknownDocument(String),
    #[error("extraction already in flight for document {0}")]
    Busy(String),
}

struct DocState {
    document: Document,
    section: Option<Section>,
    outcome: Option<ExtractionOutcome>,
    in_flight: bool,
}

impl DocState {
    fn snapshot(&self) -> CacheEntry {
        CacheEntry {
            document: self.document.clone(),
            section: self.section.clone(),
            outcome: self.outcome.clone(),
            in_flight: self.in_flight,
        }
    }
}

/// Session-scoped store mapping document identity to cached state.
pub struct SessionStore {
    docs: RwLock<HashMap<String, DocState>>,
    vocab: SegmentVocab,
}

impl SessionStore {
    pub fn new(vocab: SegmentVocab) -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            vocab,
        }
    }

    /// Insert a document if absent, segmenting its experience section at
    /// creation time. Re-inserting the same identity returns the existing
    /// entry untouched.
    pub fn get_or_create(&self, document: Document) -> CacheEntry {
        let mut docs = self.docs.write().unwrap();
        docs.entry(document.id.clone())
            .or_insert_with(|| {
                let section = find_section(&document.lines, &self.vocab);
                DocState {
                    document,
                    section,
                    outcome: None,
                    in_flight: false,
                }
            })
            .snapshot()
    }

    pub fn get(&self, id: &str) -> Option<CacheEntry> {
        let docs = self.docs.read().unwrap();
        docs.get(id).map(DocState::snapshot)
    }

    /// All entries, sorted by document name for deterministic output.
    pub fn list(&self) -> Vec<CacheEntry> {
        let docs = self.docs.read().unwrap();
        let mut entries: Vec<CacheEntry> = docs.values().map(DocState::snapshot).collect();
        entries.sort_by(|a, b| {
            a.document
                .name
                .cmp(&b.document.name)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        entries
    }

    /// Mark an extraction as in flight. Fails with [`SessionError::Busy`]
    /// if one is already running for this document.
    pub fn begin_extraction(&self, id: &str) -> Result<(), SessionError> {
        let mut docs = self.docs.write().unwrap();
        let state = docs
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownDocument(id.to_string()))?;
        if state.in_flight {
            return Err(SessionError::Busy(id.to_string()));
        }
        state.in_flight = true;
        Ok(())
    }

    /// Store a completed outcome, overwriting any previous one.
    pub fn finish_extraction(
        &self,
        id: &str,
        outcome: ExtractionOutcome,
    ) -> Result<(), SessionError> {
        let mut docs = self.docs.write().unwrap();
        let state = docs
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownDocument(id.to_string()))?;
        state.outcome = Some(outcome);
        state.in_flight = false;
        Ok(())
    }

    /// Clear the in-flight flag after a failed extraction, keeping
    /// whatever outcome was stored before.
    pub fn abort_extraction(&self, id: &str) {
        let mut docs = self.docs.write().unwrap();
        if let Some(state) = docs.get_mut(id) {
            state.in_flight = false;
        }
    }
}
