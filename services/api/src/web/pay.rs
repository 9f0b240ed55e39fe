//! services/api/src/web/pay.rs
//!
//! The payment-creation endpoint: mints a unique order reference, creates
//! the order at the gateway, then records the payment and links it to the
//! session. The gateway call strictly precedes all store writes, so a
//! rejected order never leaves payment state behind.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use doc_insight_core::domain::PaymentStatus;
use doc_insight_core::ports::{PortError, PortResult};
use doc_insight_core::token::{generate_token, unique_token, ORDER_REFERENCE_LEN};
use std::sync::Arc;
use tracing::error;

use crate::web::cookies::{get_cookie, SESSION_COOKIE};
use crate::web::state::AppState;

//=========================================================================================
// Payment Initiation Logic
//=========================================================================================

/// Creates a payable order for the session and returns the gateway's
/// redirect URL. A previously linked payment is marked `FALSE` before the
/// new one takes its place, so at most one payment per session is ever
/// actionable.
pub(crate) async fn initiate_payment(state: &AppState, session_token: &str) -> PortResult<String> {
    let session = state
        .store
        .find_session_by_token(session_token)
        .await?
        .ok_or_else(|| PortError::NotFound("Session not found".to_string()))?;

    let order_reference = unique_token(
        || generate_token(ORDER_REFERENCE_LEN),
        |candidate| {
            let store = state.store.clone();
            async move { store.payment_reference_exists(&candidate).await }
        },
    )
    .await?;

    let order = state
        .gateway
        .create_order(&order_reference, state.config.report_price)
        .await?;

    // The writes below are not transactional; a crash between them can
    // leave the session link stale until the next attempt.
    if let Some(old_payment) = session.payment_id {
        state
            .store
            .set_payment_status(old_payment, PaymentStatus::False)
            .await?;
    }
    let payment = state.store.create_payment(session.id, &order_reference).await?;
    state.store.set_payment_link(session.id, payment.id).await?;

    Ok(order.redirect_url)
}

//=========================================================================================
// Handler
//=========================================================================================

/// POST /api/pay - Create a gateway order and return its redirect URL.
#[utoipa::path(
    post,
    path = "/api/pay",
    responses(
        (status = 200, description = "Redirect URL for the checkout page", body = String),
        (status = 400, description = "Gateway rejected the order"),
        (status = 404, description = "No session"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn pay_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session_token = get_cookie(&headers, SESSION_COOKIE)
        .ok_or((StatusCode::NOT_FOUND, "Data not found.".to_string()))?;

    let redirect_url = initiate_payment(&state, &session_token)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => (StatusCode::NOT_FOUND, "Data not found.".to_string()),
            PortError::Gateway(detail) => {
                error!("Payment gateway rejected order creation: {}", detail);
                (StatusCode::BAD_REQUEST, "Gateway Error".to_string())
            }
            other => {
                error!("Failed to initiate payment: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error".to_string())
            }
        })?;

    Ok(Json(redirect_url))
}
