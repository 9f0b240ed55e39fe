//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use doc_insight_core::ports::{PaymentGateway, PdfRenderer, ReportModel, SessionStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. Every external collaborator is behind a port trait so tests
/// can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub model: Arc<dyn ReportModel>,
    pub renderer: Arc<dyn PdfRenderer>,
    pub config: Arc<Config>,
}
