//! crates/doc_insight_core/src/signature.rs
//!
//! Verification of the payment gateway's webhook signature. The gateway
//! signs each notification with
//! `sha512(order_reference || status_code || gross_amount || server_key)`,
//! hex-encoded.

use sha2::{Digest, Sha512};

/// Computes the expected hex-encoded signature for a notification.
pub fn notification_signature(
    order_reference: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_reference.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks a supplied signature against the recomputed one. Must be called
/// before any store access for the notification.
pub fn verify_notification(
    order_reference: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
    supplied: &str,
) -> bool {
    notification_signature(order_reference, status_code, gross_amount, server_key) == supplied
}
