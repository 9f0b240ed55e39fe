//! crates/doc_insight_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use uuid::Uuid;

/// Represents one visitor, identified across requests by an opaque cookie
/// token. Uploading a new source document invalidates both `report_text`
/// and `payment_id`, so a new analysis always requires a new payment.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub session_token: String,
    /// Base64-encoded bytes of the uploaded PDF. `None` until upload.
    pub source_document: Option<String>,
    /// Generated report markdown. `None` until the model call succeeds.
    pub report_text: Option<String>,
    /// The session's current payment. Older payments stay in the store
    /// but are no longer actionable.
    pub payment_id: Option<Uuid>,
}

/// Represents one checkout attempt against the payment gateway.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    /// Correlation id shared with the gateway; unique across all payments.
    pub order_reference: String,
    pub session_id: Uuid,
    pub status: PaymentStatus,
}

/// Lifecycle status of a payment. Created as `Wait`; transitions only via
/// the webhook reconciler or superseding-payment invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Wait,
    Success,
    False,
}

impl PaymentStatus {
    /// Maps a gateway notification to a payment status:
    ///
    /// | transaction status | fraud status | status  |
    /// |--------------------|--------------|---------|
    /// | capture            | accept       | Success |
    /// | settlement         | (any)        | Success |
    /// | pending            | (any)        | Wait    |
    /// | anything else      | (any)        | False   |
    pub fn from_notification(transaction_status: &str, fraud_status: Option<&str>) -> Self {
        match transaction_status {
            "capture" if fraud_status == Some("accept") => PaymentStatus::Success,
            "settlement" => PaymentStatus::Success,
            "pending" => PaymentStatus::Wait,
            _ => PaymentStatus::False,
        }
    }

    /// The wire/store representation (`WAIT`, `SUCCESS`, `FALSE`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Wait => "WAIT",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::False => "FALSE",
        }
    }

    /// Parses the store representation back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WAIT" => Some(PaymentStatus::Wait),
            "SUCCESS" => Some(PaymentStatus::Success),
            "FALSE" => Some(PaymentStatus::False),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_success_only_when_fraud_accepted() {
        assert_eq!(
            PaymentStatus::from_notification("capture", Some("accept")),
            PaymentStatus::Success
        );
        assert_eq!(
            PaymentStatus::from_notification("capture", Some("challenge")),
            PaymentStatus::False
        );
        assert_eq!(
            PaymentStatus::from_notification("capture", None),
            PaymentStatus::False
        );
    }

    #[test]
    fn settlement_is_success_regardless_of_fraud_status() {
        assert_eq!(
            PaymentStatus::from_notification("settlement", None),
            PaymentStatus::Success
        );
        assert_eq!(
            PaymentStatus::from_notification("settlement", Some("deny")),
            PaymentStatus::Success
        );
    }

    #[test]
    fn pending_maps_to_wait() {
        assert_eq!(
            PaymentStatus::from_notification("pending", Some("accept")),
            PaymentStatus::Wait
        );
        assert_eq!(
            PaymentStatus::from_notification("pending", None),
            PaymentStatus::Wait
        );
    }

    #[test]
    fn everything_else_maps_to_false() {
        for status in ["deny", "cancel", "expire", "refund", ""] {
            assert_eq!(
                PaymentStatus::from_notification(status, Some("accept")),
                PaymentStatus::False
            );
        }
    }

    #[test]
    fn status_round_trips_through_store_representation() {
        for status in [PaymentStatus::Wait, PaymentStatus::Success, PaymentStatus::False] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PaymentStatus::parse("PAID"), None);
    }
}
