//! Document ingestion.
//!
//! Turns file paths or uploaded byte payloads into cached [`Document`]s:
//! format detection, decoding, normalization, and insertion into the
//! session store (which segments the experience section at creation).
//!
//! Unsupported formats are rejected here, before any decoding, and never
//! populate the cache. A failure on one document is reported to the
//! caller and never aborts the rest of a batch.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

use crate::decode::{decode, DecodeError};
use crate::models::{CacheEntry, DocFormat, Document};
use crate::normalize::normalize;
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported format: {0} (expected .pdf or .docx)")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Content-hash identity for a document: name + raw bytes.
pub fn document_id(name: &str, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(bytes);
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Detect a file's format from its extension. `.txt` and friends are
/// rejected before the pipeline ever sees the bytes.
pub fn detect_format(path: &Path) -> Result<DocFormat, IngestError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocFormat::from_extension)
        .ok_or_else(|| IngestError::UnsupportedFormat(path.display().to_string()))
}

/// Expand a mixed list of files and directories into candidate files.
///
/// Explicit files are accepted as-is (their extension is still validated
/// at ingest time); directories are walked recursively and filtered by
/// the include globs. The result is sorted for deterministic ordering.
pub fn scan_paths(paths: &[PathBuf], include_globs: &[String]) -> Result<Vec<PathBuf>> {
    let include_set = build_globset(include_globs)?;
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path) {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
                if include_set.is_match(relative) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Ingest an in-memory payload (the upload path): decode, normalize, and
/// insert into the store. Idempotent per document identity.
pub fn ingest_bytes(
    store: &SessionStore,
    name: &str,
    format: DocFormat,
    bytes: &[u8],
) -> Result<CacheEntry, IngestError> {
    let raw = decode(bytes, format)?;
    let lines = normalize(&raw);
    let document = Document {
        id: document_id(name, bytes),
        name: name.to_string(),
        format,
        raw,
        lines,
        ingested_at: chrono::Utc::now(),
    };
    tracing::debug!(id = %document.id, name, lines = document.lines.len(), "ingested document");
    Ok(store.get_or_create(document))
}

/// Ingest a file from disk.
pub fn ingest_file(store: &SessionStore, path: &Path) -> Result<CacheEntry, IngestError> {
    let format = detect_format(path)?;
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    ingest_bytes(store, &name, format, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentVocab;

    #[test]
    fn txt_files_are_rejected_before_the_pipeline() {
        let store = SessionStore::new(SegmentVocab::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Experience\nAcme Corp").unwrap();

        let err = ingest_file(&store, &path).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)));
        assert!(store.list().is_empty());
    }

    #[test]
    fn decode_failure_does_not_populate_the_cache() {
        let store = SessionStore::new(SegmentVocab::default());
        let err = ingest_bytes(&store, "broken.pdf", DocFormat::Pdf, b"not a pdf").unwrap_err();
        assert!(matches!(err, IngestError::Decode(_)));
        assert!(store.list().is_empty());
    }

    #[test]
    fn identity_is_stable_for_same_name_and_bytes() {
        assert_eq!(document_id("a.pdf", b"abc"), document_id("a.pdf", b"abc"));
        assert_ne!(document_id("a.pdf", b"abc"), document_id("b.pdf", b"abc"));
        assert_eq!(document_id("a.pdf", b"abc").len(), 16);
    }

    #[test]
    fn directory_scan_honors_include_globs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("b.docx"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/c.pdf"), b"x").unwrap();

        let globs = vec!["**/*.pdf".to_string(), "**/*.docx".to_string()];
        let files = scan_paths(&[dir.path().to_path_buf()], &globs).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.docx", "c.pdf"]);
    }

    #[test]
    fn explicit_files_bypass_the_globs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"x").unwrap();
        let files = scan_paths(&[path.clone()], &["**/*.docx".to_string()]).unwrap();
        assert_eq!(files, vec![path]);
    }
}
