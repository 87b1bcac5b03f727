//! The model-assisted extraction contract.
//!
//! Builds the deterministic extraction prompt, submits it through an
//! [`InferenceClient`], and decodes the response. The model's output is
//! never trusted blindly: anything that fails strict decoding comes back
//! as [`ExtractionOutcome::Unparsed`] with the raw text carried verbatim,
//! so callers can still render it.

use thiserror::Error;

use crate::infer::{InferError, InferenceClient};
use crate::models::{ExtractionOutcome, ExtractionRecord};
use crate::session::{SessionError, SessionStore};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Inference(#[from] InferError),
}

/// Build the extraction prompt embedding the full normalized resume text.
/// Deterministic: the same text always yields the same prompt.
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a professional resume parser.

From the resume below, extract the following information as a single JSON object with exactly these fields:
1. "full_name": the candidate's full name
2. "total_experience": total work experience, calculated from job start and end dates even when not stated explicitly
3. "skills": a list of skill strings
4. "job_history": a list of objects with "company", "role", "start_date" and "end_date" (include previous roles as well; use "Present" for a current role)

Respond with the JSON object only.

Resume:
"""
{text}
"""
"#
    )
}

/// Decode the model's response into an [`ExtractionOutcome`].
///
/// Markdown code fences are stripped and the outermost JSON object is
/// located before decoding, since models routinely wrap their answer in
/// prose or a ```json block. Any decode failure yields `Unparsed` with
/// the original response text.
pub fn parse_response(raw: &str) -> ExtractionOutcome {
    match extract_json_object(raw).and_then(|json| serde_json::from_str(json).ok()) {
        Some(record) => ExtractionOutcome::Parsed(sanitize(record)),
        None => ExtractionOutcome::Unparsed(raw.to_string()),
    }
}

/// Locate the outermost `{...}` span in possibly fenced, possibly chatty
/// model output.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Normalize whitespace-only optional fields to absent.
fn sanitize(mut record: ExtractionRecord) -> ExtractionRecord {
    if record
        .full_name
        .as_deref()
        .is_some_and(|n| n.trim().is_empty())
    {
        record.full_name = None;
    }
    if record
        .total_experience
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        record.total_experience = None;
    }
    record
}

/// Run one extraction for a cached document: reserve the in-flight slot,
/// submit the prompt, decode, and store the outcome.
///
/// A concurrent duplicate trigger fails with [`SessionError::Busy`]
/// before any inference happens, so duplicate triggers never cost a
/// second model call. On inference failure the slot is released and any
/// previously stored outcome is kept.
pub async fn run_extraction(
    store: &SessionStore,
    client: &dyn InferenceClient,
    document_id: &str,
) -> Result<ExtractionOutcome, ExtractionError> {
    let entry = store
        .get(document_id)
        .ok_or_else(|| SessionError::UnknownDocument(document_id.to_string()))?;
    store.begin_extraction(document_id)?;

    let prompt = build_prompt(&entry.document.lines.join("\n"));
    tracing::debug!(document_id, prompt_bytes = prompt.len(), "submitting extraction");

    let raw = match client.complete(&prompt).await {
        Ok(raw) => raw,
        Err(err) => {
            store.abort_extraction(document_id);
            tracing::warn!(document_id, error = %err, "extraction failed");
            return Err(err.into());
        }
    };

    let outcome = parse_response(&raw);
    store.finish_extraction(document_id, outcome.clone())?;
    Ok(outcome)
}
