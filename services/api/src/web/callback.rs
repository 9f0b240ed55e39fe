//! services/api/src/web/callback.rs
//!
//! The payment-gateway webhook. Verifies the notification's signature,
//! looks up the payment by order reference and applies the derived status.
//! The gateway may redeliver notifications, so applying the same status
//! twice is a plain overwrite. Every response path, errors included,
//! carries permissive CORS headers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use doc_insight_core::domain::PaymentStatus;
use doc_insight_core::ports::{PortError, PortResult, SessionStore};
use doc_insight_core::signature::verify_notification;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;

/// The fields of a gateway status notification. Amounts and status codes
/// arrive as strings and enter the signature in that form.
#[derive(Debug, Deserialize)]
pub struct GatewayNotification {
    pub transaction_status: String,
    pub order_id: String,
    pub signature_key: String,
    pub gross_amount: String,
    pub status_code: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

//=========================================================================================
// Reconciliation Logic
//=========================================================================================

/// Verifies and applies a notification. The signature is checked before
/// any store access. Note that the payment is matched by order reference
/// alone; a notification for a superseded payment still updates that
/// payment's (now informational) status.
pub(crate) async fn apply_notification(
    store: &Arc<dyn SessionStore>,
    server_key: &str,
    notification: &GatewayNotification,
) -> PortResult<PaymentStatus> {
    if !verify_notification(
        &notification.order_id,
        &notification.status_code,
        &notification.gross_amount,
        server_key,
        &notification.signature_key,
    ) {
        return Err(PortError::Unauthorized);
    }

    let payment = store
        .find_payment_by_reference(&notification.order_id)
        .await?
        .ok_or_else(|| {
            PortError::NotFound(format!("No payment for order {}", notification.order_id))
        })?;

    let derived = PaymentStatus::from_notification(
        &notification.transaction_status,
        notification.fraud_status.as_deref(),
    );
    store.set_payment_status(payment.id, derived).await?;

    Ok(derived)
}

//=========================================================================================
// Handler
//=========================================================================================

/// Wraps a response with the permissive CORS headers the gateway expects
/// on every exit path.
fn with_cors(status: StatusCode, body: impl IntoResponse) -> Response {
    let headers = [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    ];
    (status, headers, body).into_response()
}

/// POST /api/callback - Apply an asynchronous payment-status notification.
#[utoipa::path(
    post,
    path = "/api/callback",
    responses(
        (status = 200, description = "Notification applied"),
        (status = 401, description = "Signature mismatch"),
        (status = 404, description = "Unknown order reference"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn callback_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
    let notification: GatewayNotification = match serde_json::from_str(&body) {
        Ok(notification) => notification,
        Err(e) => {
            error!("Malformed webhook payload: {}", e);
            return with_cors(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error");
        }
    };

    match apply_notification(&state.store, &state.config.gateway_server_key, &notification).await
    {
        Ok(_) => with_cors(
            StatusCode::OK,
            (
                [(header::CONTENT_TYPE, "application/json")],
                json!({ "success": true }).to_string(),
            ),
        ),
        Err(PortError::Unauthorized) => with_cors(StatusCode::UNAUTHORIZED, "Data not valid"),
        Err(PortError::NotFound(_)) => with_cors(StatusCode::NOT_FOUND, "Data not found"),
        Err(e) => {
            error!("Failed to apply webhook notification: {:?}", e);
            with_cors(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
        }
    }
}
