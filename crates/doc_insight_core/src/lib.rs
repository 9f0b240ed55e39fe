pub mod domain;
pub mod ports;
pub mod signature;
pub mod token;

pub use domain::{Payment, PaymentStatus, Session};
pub use ports::{
    CheckoutOrder, PaymentGateway, PdfRenderer, PortError, PortResult, ReportModel, SessionStore,
};
pub use signature::{notification_signature, verify_notification};
pub use token::{generate_token, unique_token, ORDER_REFERENCE_LEN, SESSION_TOKEN_LEN};
