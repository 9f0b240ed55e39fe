//! services/api/src/web/current.rs
//!
//! The current-status endpoint: bootstraps a session for new visitors,
//! derives the session's state for returning ones, and performs the
//! one-time report generation once the linked payment has succeeded.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Json},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use doc_insight_core::domain::PaymentStatus;
use doc_insight_core::ports::{PortError, PortResult};
use doc_insight_core::token::{generate_token, unique_token, SESSION_TOKEN_LEN};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::cookies::{
    get_cookie, set_cookie_headers, CookieOp, NOTIF_COOKIE, NOTIF_PAYMENT_FAILED,
    NOTIF_REPORT_READY, SESSION_COOKIE,
};
use crate::web::state::AppState;

/// The fixed instruction sent to the model along with the uploaded PDF.
const REPORT_PROMPT: &str = r#"You are an expert document analyst. Read the attached PDF carefully and produce a structured analysis report.

Your report must include:
1. Executive summary of the document's purpose and content.
2. Key strengths, each with a concrete example from the document.
3. Critical areas for improvement, each with its impact and a suggested fix.
4. A detailed section-by-section assessment with a score out of 10 and the reasoning behind it.
5. A recommended action plan split into immediate, short-term and long-term steps.

Respond in markdown only. End every line that should break with two trailing spaces, and separate major sections with a horizontal rule. Do not end lines with a bare pair of asterisks."#;

//=========================================================================================
// Response Types
//=========================================================================================

/// The derived state of a session, returned on every poll.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentStatus {
    pub message: String,
    /// Status of the current payment (`WAIT`/`SUCCESS`/`FALSE`), or null
    /// when no payment exists.
    #[serde(rename = "isPaid")]
    pub is_paid: Option<String>,
    pub status: bool,
    /// Whether a source document has been uploaded.
    pub source: bool,
    /// The generated report markdown, once available.
    pub data: Option<String>,
}

/// A derived status together with the cookie mutations it implies.
pub(crate) struct CurrentOutcome {
    pub status: CurrentStatus,
    pub cookies: Vec<CookieOp>,
}

//=========================================================================================
// State Derivation
//=========================================================================================

/// Derives the session's current state, creating the session on first
/// contact and generating the report when eligible. Evaluated in order;
/// the first matching case wins.
pub(crate) async fn current_status(
    state: &AppState,
    session_token: Option<&str>,
    has_notif: bool,
) -> PortResult<CurrentOutcome> {
    let session = match session_token {
        Some(token) => state.store.find_session_by_token(token).await?,
        None => None,
    };

    // Case 1: unknown visitor. Mint a token that no existing session holds
    // and create a fresh session for it.
    let Some(session) = session else {
        let token = unique_token(
            || generate_token(SESSION_TOKEN_LEN),
            |candidate| {
                let store = state.store.clone();
                async move { store.session_token_exists(&candidate).await }
            },
        )
        .await?;
        state.store.create_session(&token).await?;

        let mut cookies = vec![CookieOp::SetSession(token)];
        if has_notif {
            cookies.push(CookieOp::DeleteNotif);
        }
        return Ok(CurrentOutcome {
            status: CurrentStatus {
                message: "User Created".to_string(),
                is_paid: None,
                status: true,
                source: false,
                data: None,
            },
            cookies,
        });
    };

    let stale_notif = if has_notif {
        vec![CookieOp::DeleteNotif]
    } else {
        Vec::new()
    };

    // Case 2: nothing uploaded yet.
    if session.source_document.is_none() && session.payment_id.is_none() {
        return Ok(CurrentOutcome {
            status: CurrentStatus {
                message: "Welcome again.".to_string(),
                is_paid: None,
                status: true,
                source: false,
                data: None,
            },
            cookies: stale_notif,
        });
    }

    // Case 3: uploaded but no payment initiated.
    let uploaded_not_paid = |cookies: Vec<CookieOp>| CurrentOutcome {
        status: CurrentStatus {
            message: "Welcome again.".to_string(),
            is_paid: None,
            status: true,
            source: true,
            data: None,
        },
        cookies,
    };
    let Some(payment_id) = session.payment_id else {
        return Ok(uploaded_not_paid(stale_notif));
    };

    // Case 4: the linked payment cannot be loaded; fall back to case 3.
    let payment = match state.store.get_payment(payment_id).await {
        Ok(payment) => payment,
        Err(PortError::NotFound(_)) => return Ok(uploaded_not_paid(stale_notif)),
        Err(e) => return Err(e),
    };

    // Case 5: payment still pending or failed. A failure arms the one-shot
    // notification so the client can toast exactly once.
    if payment.status != PaymentStatus::Success {
        let cookies = if payment.status == PaymentStatus::False {
            vec![CookieOp::SetNotif(NOTIF_PAYMENT_FAILED)]
        } else {
            Vec::new()
        };
        return Ok(CurrentOutcome {
            status: CurrentStatus {
                message: "Welcome again.".to_string(),
                is_paid: Some(payment.status.as_str().to_string()),
                status: true,
                source: true,
                data: None,
            },
            cookies,
        });
    }

    // Case 6: paid and no report yet. Invoke the model once and persist the
    // result. Concurrent eligible requests are not mutually excluded here;
    // the presence check makes the call at-most-once under sequential access.
    if session.report_text.is_none() {
        let source = session.source_document.as_deref().ok_or_else(|| {
            PortError::Unexpected("Paid session has no source document".to_string())
        })?;
        let document = BASE64
            .decode(source)
            .map_err(|e| PortError::Unexpected(format!("Stored document is not base64: {}", e)))?;

        let report = state
            .model
            .generate_report(REPORT_PROMPT, &document, "application/pdf")
            .await?;
        state.store.set_report_text(session.id, &report).await?;

        return Ok(CurrentOutcome {
            status: CurrentStatus {
                message: "Welcome again.".to_string(),
                is_paid: Some(PaymentStatus::Success.as_str().to_string()),
                status: true,
                source: true,
                data: Some(report),
            },
            cookies: vec![CookieOp::SetNotif(NOTIF_REPORT_READY)],
        });
    }

    // Case 7: paid and already generated; serve the cached text.
    Ok(CurrentOutcome {
        status: CurrentStatus {
            message: "Welcome again.".to_string(),
            is_paid: Some(PaymentStatus::Success.as_str().to_string()),
            status: true,
            source: true,
            data: session.report_text,
        },
        cookies: Vec::new(),
    })
}

//=========================================================================================
// Handler
//=========================================================================================

/// GET /api/current - Bootstrap or derive the session state.
#[utoipa::path(
    get,
    path = "/api/current",
    responses(
        (status = 200, description = "Derived session state", body = CurrentStatus),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn current_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session_token = get_cookie(&headers, SESSION_COOKIE);
    let has_notif = get_cookie(&headers, NOTIF_COOKIE).is_some();

    let outcome = current_status(&state, session_token.as_deref(), has_notif)
        .await
        .map_err(|e| {
            error!("Failed to derive current status: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error".to_string())
        })?;

    Ok((
        StatusCode::OK,
        AppendHeaders(set_cookie_headers(&outcome.cookies)),
        Json(outcome.status),
    ))
}
