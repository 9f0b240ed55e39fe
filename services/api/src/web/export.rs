//! services/api/src/web/export.rs
//!
//! The report-export endpoint: converts the stored markdown to HTML with a
//! fixed style template and hands it to the renderer for a PDF byte stream.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use doc_insight_core::ports::{PortError, PortResult};
use std::sync::Arc;
use tracing::error;

use crate::web::cookies::{get_cookie, SESSION_COOKIE};
use crate::web::state::AppState;

/// Styles applied to the rendered report page.
const REPORT_STYLE: &str = r#"
body {
  font-family: "Inter", sans-serif;
  font-size: 12px;
  line-height: 20px;
  padding: 0;
  margin: 0;
  color: #374151;
}
h1, h2, h3 {
  font-weight: 700;
  color: #111827;
}
h2 {
  font-size: 18px;
  margin-top: 28px;
  margin-bottom: 14px;
  line-height: 25px;
}
h3 {
  font-size: 16px;
  margin-top: 25px;
  margin-bottom: 7px;
  line-height: 25px;
}
p {
  margin-top: 14px;
  margin-bottom: 14px;
  text-align: justify;
}
ul {
  margin-top: 0.75rem;
  margin-bottom: 0.75rem;
  padding-left: 1.5rem;
}
li {
  text-align: justify;
  margin-bottom: 0.5rem;
}
hr {
  border-color: #d1d5db;
}
h2:first-of-type {
  margin-top: 0;
}
"#;

//=========================================================================================
// Export Logic
//=========================================================================================

/// Wraps the report markdown in the fixed page template.
pub(crate) fn report_html(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut body = String::new();
    pulldown_cmark::html::push_html(&mut body, parser);
    format!(
        "<html><head><style>{}</style></head><body>{}</body></html>",
        REPORT_STYLE, body
    )
}

/// Loads the session's report and renders it to PDF bytes.
pub(crate) async fn export_report(state: &AppState, session_token: &str) -> PortResult<Vec<u8>> {
    let session = state
        .store
        .find_session_by_token(session_token)
        .await?
        .ok_or_else(|| PortError::NotFound("Session not found".to_string()))?;

    let markdown = session
        .report_text
        .ok_or_else(|| PortError::NotFound("No report generated yet".to_string()))?;

    state.renderer.render_html(&report_html(&markdown)).await
}

//=========================================================================================
// Handler
//=========================================================================================

/// POST /api/export - Render the stored report to a PDF.
#[utoipa::path(
    post,
    path = "/api/export",
    responses(
        (status = 200, description = "The rendered PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "No session or no report"),
        (status = 500, description = "Render error")
    )
)]
pub async fn export_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session_token = get_cookie(&headers, SESSION_COOKIE)
        .ok_or((StatusCode::NOT_FOUND, "Data not found.".to_string()))?;

    let pdf = export_report(&state, &session_token)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => (StatusCode::NOT_FOUND, "Data not found.".to_string()),
            other => {
                error!("Failed to export report: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate PDF".to_string(),
                )
            }
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"report.pdf\""),
        ],
        pdf,
    ))
}
