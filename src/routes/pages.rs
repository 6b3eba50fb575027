use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
};
use std::sync::Arc;
use tera::Context;
use tracing::warn;

use crate::error::AppError;
use crate::extract::{self, DocumentKind};
use crate::session::{HistoryEntry, Session};
use crate::state::AppState;
use crate::storage;

// Source label recorded for typed (non-file) submissions.
const TEXT_SOURCE_LABEL: &str = "text_input";

const UNSUPPORTED_FILE_ERROR: &str = "Only .pdf and .pptx files are supported.";
const MISSING_INPUT_ERROR: &str = "Please enter text or upload a file.";

#[derive(Default)]
struct SubmissionForm {
    text_idea: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

#[derive(Default)]
struct PageOutcome {
    result: Option<String>,
    drive_link: Option<String>,
    error: Option<String>,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let session = Session::from_headers(&headers, &state.keys);
    render_page(&session, &PageOutcome::default())
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut session = Session::from_headers(&headers, &state.keys);

    let form = read_form(multipart).await;
    let outcome = process_submission(&state, &mut session, form).await?;

    let cookie = session.to_cookie(&state.keys)?;
    let page = render_page(&session, &outcome)?;
    Ok(([(header::SET_COOKIE, cookie)], page))
}

async fn read_form(mut multipart: Multipart) -> SubmissionForm {
    let mut form = SubmissionForm::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        if name == "text_idea" {
            if let Ok(text) = field.text().await {
                form.text_idea = Some(text);
            }
        } else if name == "file" {
            let filename = field.file_name().unwrap_or("").to_string();
            if let Ok(data) = field.bytes().await {
                if !filename.is_empty() {
                    form.file = Some((filename, data.to_vec()));
                }
            }
        }
    }

    form
}

/// Runs one submission through the extract -> evaluate -> persist ->
/// publish pipeline, recording a history entry on success. Typed text
/// wins over an uploaded file when both are present.
async fn process_submission(
    state: &AppState,
    session: &mut Session,
    form: SubmissionForm,
) -> Result<PageOutcome, AppError> {
    let mut outcome = PageOutcome::default();

    let idea_text;
    let source_label;

    if let Some(text) = form
        .text_idea
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        idea_text = text.to_string();
        source_label = TEXT_SOURCE_LABEL.to_string();
    } else if let Some((raw_name, data)) = &form.file {
        let filename = storage::sanitize_filename(raw_name);
        let saved = storage::save_upload(&state.config.upload_folder, &filename, data)?;

        match DocumentKind::from_name(&filename) {
            Some(kind) => {
                idea_text = extract::extract_text(&saved, kind);
                source_label = filename;
            }
            None => {
                outcome.error = Some(UNSUPPORTED_FILE_ERROR.to_string());
                return Ok(outcome);
            }
        }
    } else {
        outcome.error = Some(MISSING_INPUT_ERROR.to_string());
        return Ok(outcome);
    }

    // Nothing extractable: render the bare page, as with an empty form.
    if idea_text.trim().is_empty() {
        return Ok(outcome);
    }

    match state.evaluator.evaluate(&idea_text).await {
        Ok(analysis) => {
            let filename = storage::analysis_filename(&source_label);
            let path = storage::save_analysis(&state.config.upload_folder, &filename, &analysis)?;

            let link = state
                .publisher
                .publish(&path, &filename, session.credentials.as_ref())
                .await?;

            session.push_history(HistoryEntry {
                filename,
                drive_link: link.clone(),
            });

            outcome.result = Some(analysis);
            outcome.drive_link = link;
        }
        Err(e) => {
            warn!("Idea evaluation failed: {}", e);
            outcome.error = Some(format!("Analysis failed: {}", e));
        }
    }

    Ok(outcome)
}

fn render_page(session: &Session, outcome: &PageOutcome) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("result", &outcome.result);
    ctx.insert("drive_link", &outcome.drive_link);
    ctx.insert("error", &outcome.error);
    ctx.insert("history", &session.history);
    ctx.insert("connected", &session.credentials.is_some());

    let page = crate::templates::get_tera().render("index.html", &ctx)?;
    Ok(Html(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;
    use std::io::Write;

    fn text_form(text: &str) -> SubmissionForm {
        SubmissionForm {
            text_idea: Some(text.to_string()),
            file: None,
        }
    }

    fn file_form(name: &str, data: &[u8]) -> SubmissionForm {
        SubmissionForm {
            text_idea: None,
            file: Some((name.to_string(), data.to_vec())),
        }
    }

    fn authenticated_session() -> Session {
        Session {
            credentials: Some(test_support::credentials()),
            ..Session::default()
        }
    }

    fn pptx_bytes(slide_xml: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut archive = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            archive
                .start_file("ppt/slides/slide1.xml", options)
                .unwrap();
            archive.write_all(slide_xml.as_bytes()).unwrap();
            archive.finish().unwrap();
        }
        buf
    }

    #[tokio::test]
    async fn text_submission_persists_and_records_history() {
        let staging = tempfile::tempdir().unwrap();
        let state = test_support::state(
            &staging,
            Some("RESULT-X"),
            Some("https://drive.google.com/file/d/abc/view?usp=sharing"),
        );
        let mut session = authenticated_session();

        let outcome = process_submission(
            &state,
            &mut session,
            text_form("AI-powered coffee subscription"),
        )
        .await
        .unwrap();

        let artifact = staging.path().join("text_input.txt");
        assert_eq!(std::fs::read_to_string(artifact).unwrap(), "RESULT-X");

        assert_eq!(outcome.result.as_deref(), Some("RESULT-X"));
        assert_eq!(
            outcome.drive_link.as_deref(),
            Some("https://drive.google.com/file/d/abc/view?usp=sharing")
        );
        assert!(outcome.error.is_none());

        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history[0].filename, "text_input.txt");
        assert_eq!(
            session.history[0].drive_link.as_deref(),
            Some("https://drive.google.com/file/d/abc/view?usp=sharing")
        );
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected_without_side_effects() {
        let staging = tempfile::tempdir().unwrap();
        let state = test_support::state(&staging, Some("RESULT-X"), None);
        let mut session = authenticated_session();

        let outcome = process_submission(&state, &mut session, file_form("pitch.docx", b"doc"))
            .await
            .unwrap();

        assert_eq!(outcome.error.as_deref(), Some(UNSUPPORTED_FILE_ERROR));
        assert!(outcome.result.is_none());
        assert!(!staging.path().join("pitch.docx.txt").exists());
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn empty_submission_is_rejected() {
        let staging = tempfile::tempdir().unwrap();
        let state = test_support::state(&staging, Some("RESULT-X"), None);
        let mut session = authenticated_session();

        let outcome = process_submission(&state, &mut session, SubmissionForm::default())
            .await
            .unwrap();

        assert_eq!(outcome.error.as_deref(), Some(MISSING_INPUT_ERROR));
        assert!(session.history.is_empty());

        let outcome = process_submission(&state, &mut session, text_form("   "))
            .await
            .unwrap();
        assert_eq!(outcome.error.as_deref(), Some(MISSING_INPUT_ERROR));
    }

    #[tokio::test]
    async fn text_takes_priority_over_file() {
        let staging = tempfile::tempdir().unwrap();
        let state = test_support::state(&staging, Some("RESULT-X"), None);
        let mut session = authenticated_session();

        let form = SubmissionForm {
            text_idea: Some("subscription lunchboxes".to_string()),
            file: Some(("deck.pdf".to_string(), b"%PDF".to_vec())),
        };

        let outcome = process_submission(&state, &mut session, form).await.unwrap();

        assert!(outcome.result.is_some());
        assert!(staging.path().join("text_input.txt").exists());
        assert!(!staging.path().join("deck.pdf").exists());
        assert_eq!(session.history[0].filename, "text_input.txt");
    }

    #[tokio::test]
    async fn pptx_upload_flows_through_extraction() {
        let staging = tempfile::tempdir().unwrap();
        let state = test_support::state(&staging, Some("RESULT-X"), None);
        let mut session = authenticated_session();

        let bytes = pptx_bytes("<p:sp><a:t>Subscription coffee service</a:t></p:sp>");
        let outcome = process_submission(&state, &mut session, file_form("deck.pptx", &bytes))
            .await
            .unwrap();

        assert_eq!(outcome.result.as_deref(), Some("RESULT-X"));
        let artifact = staging.path().join("deck.pptx.txt");
        assert_eq!(std::fs::read_to_string(artifact).unwrap(), "RESULT-X");
        assert_eq!(session.history[0].filename, "deck.pptx.txt");
    }

    #[tokio::test]
    async fn evaluation_failure_records_nothing() {
        let staging = tempfile::tempdir().unwrap();
        let state = test_support::state(&staging, None, None);
        let mut session = authenticated_session();

        let outcome = process_submission(&state, &mut session, text_form("robot florist"))
            .await
            .unwrap();

        assert!(outcome.result.is_none());
        assert!(outcome.drive_link.is_none());
        assert!(outcome.error.as_deref().unwrap().starts_with("Analysis failed"));
        assert!(!staging.path().join("text_input.txt").exists());
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_submission_skips_publishing() {
        let staging = tempfile::tempdir().unwrap();
        let state = test_support::state(
            &staging,
            Some("RESULT-X"),
            Some("https://drive.google.com/file/d/abc/view?usp=sharing"),
        );
        let mut session = Session::default();

        let outcome = process_submission(&state, &mut session, text_form("pet rental"))
            .await
            .unwrap();

        // The artifact is still written locally; only publishing is skipped.
        assert!(staging.path().join("text_input.txt").exists());
        assert!(outcome.drive_link.is_none());
        assert_eq!(session.history.len(), 1);
        assert!(session.history[0].drive_link.is_none());
    }
}
