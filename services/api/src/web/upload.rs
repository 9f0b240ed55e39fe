//! services/api/src/web/upload.rs
//!
//! The source-upload endpoint. Storing a new document invalidates the
//! session's report and payment link; a new analysis requires a new payment.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use doc_insight_core::domain::PaymentStatus;
use doc_insight_core::ports::{PortError, PortResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::cookies::{get_cookie, SESSION_COOKIE};
use crate::web::state::AppState;

/// The response payload sent after a successful upload.
#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub status: bool,
    pub message: String,
}

//=========================================================================================
// Upload Logic
//=========================================================================================

/// Stores the uploaded bytes on the session. Any previously linked payment
/// is failed first so a stale checkout cannot pay for the new document.
pub(crate) async fn store_source(
    state: &AppState,
    session_token: &str,
    file_bytes: &[u8],
) -> PortResult<()> {
    let session = state
        .store
        .find_session_by_token(session_token)
        .await?
        .ok_or_else(|| PortError::NotFound("Session not found".to_string()))?;

    if let Some(old_payment) = session.payment_id {
        state
            .store
            .set_payment_status(old_payment, PaymentStatus::False)
            .await?;
    }

    state
        .store
        .update_source_document(session.id, &BASE64.encode(file_bytes))
        .await
}

//=========================================================================================
// Handler
//=========================================================================================

/// POST /api/upload - Store the uploaded PDF on the session.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data", description = "The PDF to analyze."),
    responses(
        (status = 200, description = "Source stored", body = UploadResponse),
        (status = 404, description = "No session or no file"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session_token = get_cookie(&headers, SESSION_COOKIE)
        .ok_or((StatusCode::NOT_FOUND, "Data not found.".to_string()))?;

    let mut file_bytes = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        if field.name() == Some("file") {
            let data = field.bytes().await.map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to read file bytes: {}", e),
                )
            })?;
            file_bytes = Some(data);
            break;
        }
    }
    let file_bytes =
        file_bytes.ok_or((StatusCode::NOT_FOUND, "File not found.".to_string()))?;

    store_source(&state, &session_token, &file_bytes)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => (StatusCode::NOT_FOUND, "Data not found.".to_string()),
            other => {
                error!("Failed to store source document: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error".to_string())
            }
        })?;

    Ok(Json(UploadResponse {
        status: true,
        message: "Source Uploaded".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::fixtures::{app_state, MemStore};

    #[tokio::test]
    async fn upload_stores_base64_and_clears_report_and_payment() {
        let store = Arc::new(MemStore::new());
        let session = store.seed_session("tok", Some("b2xk"), Some("# Old Report"), None);
        let payment = store.seed_payment(session.id, "ref-1", PaymentStatus::Wait);
        store.link_payment(session.id, payment.id);
        let state = app_state(store.clone());

        store_source(&state, "tok", b"%PDF-1.4 new").await.unwrap();

        let session = store.session_by_token("tok").unwrap();
        assert_eq!(
            session.source_document.as_deref(),
            Some(BASE64.encode(b"%PDF-1.4 new").as_str())
        );
        assert_eq!(session.report_text, None);
        assert_eq!(session.payment_id, None);
        // The superseded payment can no longer succeed.
        assert_eq!(store.payment(payment.id).unwrap().status, PaymentStatus::False);
    }

    #[tokio::test]
    async fn upload_without_prior_payment_just_stores_the_document() {
        let store = Arc::new(MemStore::new());
        store.seed_session("tok", None, None, None);
        let state = app_state(store.clone());

        store_source(&state, "tok", b"%PDF-1.4").await.unwrap();

        let session = store.session_by_token("tok").unwrap();
        assert!(session.source_document.is_some());
        assert_eq!(store.payment_count(), 0);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = Arc::new(MemStore::new());
        let state = app_state(store);

        let result = store_source(&state, "missing", b"%PDF-1.4").await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }
}
