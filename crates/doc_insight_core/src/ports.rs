//! crates/doc_insight_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Payment, PaymentStatus, Session};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Payment gateway rejected the request: {0}")]
    Gateway(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Document-store operations over the `Session` and `Payment` collections.
#[async_trait]
pub trait SessionStore: Send + Sync {
    // --- Session collection ---
    async fn find_session_by_token(&self, token: &str) -> PortResult<Option<Session>>;

    async fn session_token_exists(&self, token: &str) -> PortResult<bool>;

    /// Creates a session with all optional fields unset.
    async fn create_session(&self, token: &str) -> PortResult<Session>;

    /// Stores a freshly uploaded document and clears both the report text
    /// and the payment link in the same write.
    async fn update_source_document(&self, session_id: Uuid, source_base64: &str)
        -> PortResult<()>;

    async fn set_report_text(&self, session_id: Uuid, report_text: &str) -> PortResult<()>;

    async fn set_payment_link(&self, session_id: Uuid, payment_id: Uuid) -> PortResult<()>;

    // --- Payment collection ---
    async fn get_payment(&self, payment_id: Uuid) -> PortResult<Payment>;

    async fn find_payment_by_reference(&self, order_reference: &str)
        -> PortResult<Option<Payment>>;

    async fn payment_reference_exists(&self, order_reference: &str) -> PortResult<bool>;

    /// Creates a payment in `Wait` status linked to the given session.
    async fn create_payment(&self, session_id: Uuid, order_reference: &str)
        -> PortResult<Payment>;

    async fn set_payment_status(&self, payment_id: Uuid, status: PaymentStatus)
        -> PortResult<()>;
}

/// A checkout order issued by the external payment gateway.
#[derive(Debug, Clone)]
pub struct CheckoutOrder {
    /// Where the browser is sent to complete the payment.
    pub redirect_url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an order for the given reference and amount. A non-success
    /// response from the gateway surfaces as `PortError::Gateway`.
    async fn create_order(&self, order_reference: &str, gross_amount: u64)
        -> PortResult<CheckoutOrder>;
}

#[async_trait]
pub trait ReportModel: Send + Sync {
    /// Generates a markdown report for the attached document.
    async fn generate_report(
        &self,
        prompt: &str,
        document: &[u8],
        mime_type: &str,
    ) -> PortResult<String>;
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Rasterizes an HTML page to a PDF byte stream.
    async fn render_html(&self, html: &str) -> PortResult<Vec<u8>>;
}
