//! services/api/src/web/fixtures.rs
//!
//! In-memory fakes for the core ports, used by the handler-logic tests.

use async_trait::async_trait;
use doc_insight_core::domain::{Payment, PaymentStatus, Session};
use doc_insight_core::ports::{
    CheckoutOrder, PaymentGateway, PdfRenderer, PortError, PortResult, ReportModel, SessionStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::config::Config;
use crate::web::state::AppState;

//=========================================================================================
// In-Memory Session Store
//=========================================================================================

/// A `SessionStore` over two in-memory vectors, with seeding and
/// inspection helpers for tests.
#[derive(Default)]
pub struct MemStore {
    sessions: Mutex<Vec<Session>>,
    payments: Mutex<Vec<Payment>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_session(
        &self,
        token: &str,
        source_document: Option<&str>,
        report_text: Option<&str>,
        payment_id: Option<Uuid>,
    ) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            session_token: token.to_string(),
            source_document: source_document.map(|s| s.to_string()),
            report_text: report_text.map(|s| s.to_string()),
            payment_id,
        };
        self.sessions.lock().unwrap().push(session.clone());
        session
    }

    pub fn seed_payment(
        &self,
        session_id: Uuid,
        order_reference: &str,
        status: PaymentStatus,
    ) -> Payment {
        let payment = Payment {
            id: Uuid::new_v4(),
            order_reference: order_reference.to_string(),
            session_id,
            status,
        };
        self.payments.lock().unwrap().push(payment.clone());
        payment
    }

    pub fn link_payment(&self, session_id: Uuid, payment_id: Uuid) {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.iter_mut().find(|s| s.id == session_id).unwrap();
        session.payment_id = Some(payment_id);
    }

    pub fn session_by_token(&self, token: &str) -> Option<Session> {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.session_token == token)
            .cloned()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn payment(&self, payment_id: Uuid) -> Option<Payment> {
        self.payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == payment_id)
            .cloned()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for MemStore {
    async fn find_session_by_token(&self, token: &str) -> PortResult<Option<Session>> {
        Ok(self.session_by_token(token))
    }

    async fn session_token_exists(&self, token: &str) -> PortResult<bool> {
        Ok(self.session_by_token(token).is_some())
    }

    async fn create_session(&self, token: &str) -> PortResult<Session> {
        Ok(self.seed_session(token, None, None, None))
    }

    async fn update_source_document(
        &self,
        session_id: Uuid,
        source_base64: &str,
    ) -> PortResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| PortError::NotFound(format!("Session {} not found", session_id)))?;
        session.source_document = Some(source_base64.to_string());
        session.report_text = None;
        session.payment_id = None;
        Ok(())
    }

    async fn set_report_text(&self, session_id: Uuid, report_text: &str) -> PortResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| PortError::NotFound(format!("Session {} not found", session_id)))?;
        session.report_text = Some(report_text.to_string());
        Ok(())
    }

    async fn set_payment_link(&self, session_id: Uuid, payment_id: Uuid) -> PortResult<()> {
        self.link_payment(session_id, payment_id);
        Ok(())
    }

    async fn get_payment(&self, payment_id: Uuid) -> PortResult<Payment> {
        self.payment(payment_id)
            .ok_or_else(|| PortError::NotFound(format!("Payment {} not found", payment_id)))
    }

    async fn find_payment_by_reference(
        &self,
        order_reference: &str,
    ) -> PortResult<Option<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.order_reference == order_reference)
            .cloned())
    }

    async fn payment_reference_exists(&self, order_reference: &str) -> PortResult<bool> {
        Ok(self.find_payment_by_reference(order_reference).await?.is_some())
    }

    async fn create_payment(
        &self,
        session_id: Uuid,
        order_reference: &str,
    ) -> PortResult<Payment> {
        Ok(self.seed_payment(session_id, order_reference, PaymentStatus::Wait))
    }

    async fn set_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> PortResult<()> {
        let mut payments = self.payments.lock().unwrap();
        let payment = payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or_else(|| PortError::NotFound(format!("Payment {} not found", payment_id)))?;
        payment.status = status;
        Ok(())
    }
}

//=========================================================================================
// Fake Model, Gateway and Renderer
//=========================================================================================

/// A `ReportModel` that returns a fixed text and counts invocations.
pub struct FakeModel {
    text: String,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeModel {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: String::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportModel for FakeModel {
    async fn generate_report(
        &self,
        _prompt: &str,
        _document: &[u8],
        _mime_type: &str,
    ) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PortError::Unexpected("model unavailable".to_string()));
        }
        Ok(self.text.clone())
    }
}

/// A `PaymentGateway` that records orders and hands out a canned redirect.
#[derive(Default)]
pub struct FakeGateway {
    fail: bool,
    orders: Mutex<Vec<(String, u64)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn orders(&self) -> Vec<(String, u64)> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        order_reference: &str,
        gross_amount: u64,
    ) -> PortResult<CheckoutOrder> {
        if self.fail {
            return Err(PortError::Gateway("402 Payment Required".to_string()));
        }
        self.orders
            .lock()
            .unwrap()
            .push((order_reference.to_string(), gross_amount));
        Ok(CheckoutOrder {
            redirect_url: format!("https://gateway.test/redirect/{}", order_reference),
        })
    }
}

/// A `PdfRenderer` that returns a recognizable byte stub.
pub struct FakeRenderer;

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn render_html(&self, _html: &str) -> PortResult<Vec<u8>> {
        Ok(b"%PDF-1.4 test".to_vec())
    }
}

//=========================================================================================
// AppState Assembly
//=========================================================================================

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://localhost/test".to_string(),
        log_level: tracing::Level::INFO,
        base_url: "http://localhost:3000".to_string(),
        gemini_api_key: "test-key".to_string(),
        report_model: "gemini-2.0-flash".to_string(),
        gateway_server_key: "server-key".to_string(),
        gateway_url: "https://gateway.test/snap".to_string(),
        report_price: 9005,
    }
}

/// Builds an `AppState` around the given store with benign fakes for the
/// remaining ports. Tests swap in their own fakes as needed.
pub fn app_state(store: Arc<MemStore>) -> AppState {
    AppState {
        store,
        gateway: Arc::new(FakeGateway::new()),
        model: Arc::new(FakeModel::new("fixture report")),
        renderer: Arc::new(FakeRenderer),
        config: Arc::new(test_config()),
    }
}
