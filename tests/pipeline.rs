//! End-to-end pipeline tests over real byte fixtures.
//!
//! Builds minimal-but-valid PDF and DOCX payloads by hand, runs them
//! through ingestion (decode → normalize → segment → cache), and drives
//! extraction with a scripted inference client.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use resume_harness::contract::run_extraction;
use resume_harness::infer::{InferError, InferenceClient};
use resume_harness::ingest::{ingest_bytes, ingest_file, scan_paths, IngestError};
use resume_harness::models::{DocFormat, ExtractionOutcome};
use resume_harness::search::{match_keywords, search_session, SearchQuery};
use resume_harness::segment::SegmentVocab;
use resume_harness::session::SessionStore;

/// Minimal valid single-page PDF whose content stream draws `phrase`.
/// Body is emitted first, then an xref table with correct byte offsets so
/// the decoder can parse it.
fn minimal_pdf_with_phrase(phrase: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET\n", phrase);
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}endstream endobj\n",
            stream.len(),
            stream
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

/// Minimal DOCX (ZIP) whose word/document.xml holds one paragraph per
/// entry in `paragraphs`.
fn minimal_docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
        body
    );
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

/// Inference client that replays a scripted sequence of responses.
struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedClient {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
        }
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn complete(&self, _prompt: &str) -> Result<String, InferError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| InferError::Transport("script exhausted".to_string()))
    }
}

#[test]
fn docx_resume_flows_through_segmentation_and_search() {
    let store = SessionStore::new(SegmentVocab::default());
    let bytes = minimal_docx_with_paragraphs(&[
        "Jane Doe",
        "Experience",
        "Built APIs in Python at Acme",
        "Education",
        "MIT",
    ]);

    let entry = ingest_bytes(&store, "jane.docx", DocFormat::Docx, &bytes).unwrap();
    let section = entry.section.expect("experience section should be found");
    assert_eq!(section.text, "Experience\nBuilt APIs in Python at Acme");

    let query = SearchQuery::parse("python, java");
    assert_eq!(match_keywords(&section.text, &query), vec!["python"]);

    let results = search_session(&store, &query);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].matched, vec!["python"]);
    assert_eq!(results[0].unmatched, vec!["java"]);
}

#[test]
fn pdf_resume_is_decoded_and_cached() {
    let store = SessionStore::new(SegmentVocab::default());
    let bytes = minimal_pdf_with_phrase("Work Experience");

    let entry = ingest_bytes(&store, "jane.pdf", DocFormat::Pdf, &bytes).unwrap();
    assert!(entry.document.raw.contains("Work Experience"));
    assert!(entry.section.is_some());
    assert_eq!(store.list().len(), 1);
}

#[test]
fn txt_file_is_rejected_and_never_cached() {
    let store = SessionStore::new(SegmentVocab::default());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resume.txt");
    std::fs::write(&path, "Experience\nPython").unwrap();

    let err = ingest_file(&store, &path).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat(_)));
    assert!(store.list().is_empty());
}

#[tokio::test]
async fn extraction_runs_end_to_end_and_overwrites_on_retrigger() {
    let store = SessionStore::new(SegmentVocab::default());
    let bytes = minimal_docx_with_paragraphs(&["Jane Doe", "Experience", "Acme Corp, Engineer"]);
    let entry = ingest_bytes(&store, "jane.docx", DocFormat::Docx, &bytes).unwrap();
    let id = entry.document.id;

    let client = ScriptedClient::new(&[
        "```json\n{\"full_name\": \"Jane Doe\", \"skills\": [\"python\"], \"job_history\": [{\"company\": \"Acme\", \"role\": \"Engineer\", \"start_date\": \"2020\", \"end_date\": \"Present\"}]}\n```",
        "no json this time, sorry",
    ]);

    // First trigger: fenced JSON decodes into a record.
    let first = run_extraction(&store, &client, &id).await.unwrap();
    match first {
        ExtractionOutcome::Parsed(ref record) => {
            assert_eq!(record.full_name.as_deref(), Some("Jane Doe"));
            assert_eq!(record.job_history[0].end_date, "Present");
        }
        ref other => panic!("expected Parsed, got {:?}", other),
    }

    // Second trigger: undecodable response replaces the stored outcome.
    let second = run_extraction(&store, &client, &id).await.unwrap();
    assert!(matches!(second, ExtractionOutcome::Unparsed(_)));
    assert_eq!(store.get(&id).unwrap().outcome, Some(second));
}

#[test]
fn one_documents_failure_does_not_block_others() {
    let store = SessionStore::new(SegmentVocab::default());
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("good.docx"),
        minimal_docx_with_paragraphs(&["Experience", "Python"]),
    )
    .unwrap();
    std::fs::write(dir.path().join("broken.pdf"), b"not a pdf at all").unwrap();

    let globs = vec!["**/*.pdf".to_string(), "**/*.docx".to_string()];
    let files = scan_paths(&[dir.path().to_path_buf()], &globs).unwrap();
    assert_eq!(files.len(), 2);

    let mut ok = 0;
    let mut failed = 0;
    for file in &files {
        match ingest_file(&store, file) {
            Ok(_) => ok += 1,
            Err(_) => failed += 1,
        }
    }
    assert_eq!((ok, failed), (1, 1));
    assert_eq!(store.list().len(), 1);
    assert_eq!(store.list()[0].document.name, "good.docx");
}
