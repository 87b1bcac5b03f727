//! Text decoding for binary resume documents (PDF, DOCX).
//!
//! Decoding is pipeline-layer: ingestion supplies bytes plus a declared
//! format; this module returns plain UTF-8 text. Line structure matters
//! downstream (the segmenter matches headings per line), so the DOCX path
//! emits one line per `w:p` paragraph.

use std::io::Read;

use thiserror::Error;

use crate::models::DocFormat;

/// Maximum decompressed bytes to read from a single ZIP entry
/// (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Decode failure for a single document. Never fatal to a batch; the
/// ingest layer reports it and moves on.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("PDF decoding failed: {0}")]
    Pdf(String),
    #[error("DOCX decoding failed: {0}")]
    Docx(String),
}

/// Decode a document's byte payload into raw text.
pub fn decode(bytes: &[u8], format: DocFormat) -> Result<String, DecodeError> {
    match format {
        DocFormat::Pdf => decode_pdf(bytes),
        DocFormat::Docx => decode_docx(bytes),
    }
}

fn decode_pdf(bytes: &[u8]) -> Result<String, DecodeError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| DecodeError::Pdf(e.to_string()))
}

fn decode_docx(bytes: &[u8]) -> Result<String, DecodeError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| DecodeError::Docx(e.to_string()))?;

    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| DecodeError::Docx(format!("word/document.xml: {}", e)))?;

    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| DecodeError::Docx(e.to_string()))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(DecodeError::Docx(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }

    paragraph_text(&doc_xml)
}

/// Walk the document XML collecting `w:t` text runs, inserting a line
/// break at the end of every `w:p` paragraph so headings stay on their
/// own lines. Text is only collected inside `w:t`, so inter-tag
/// formatting whitespace never leaks in; run-internal spaces survive.
fn paragraph_text(xml: &[u8]) -> Result<String, DecodeError> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut in_text_run = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(quick_xml::events::Event::Text(t)) if in_text_run => {
                out.push_str(t.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(quick_xml::events::Event::Empty(e)) => {
                // Explicit line breaks inside a paragraph.
                if e.local_name().as_ref() == b"br" {
                    out.push('\n');
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(DecodeError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}
