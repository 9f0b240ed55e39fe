//! services/api/src/web/mod.rs
//!
//! The HTTP surface: one module per endpoint, shared state, cookie
//! plumbing and the master OpenAPI definition.

pub mod callback;
pub mod cookies;
pub mod current;
pub mod export;
pub mod pay;
pub mod state;
pub mod upload;

#[cfg(test)]
pub(crate) mod fixtures;

pub use callback::callback_handler;
pub use current::current_handler;
pub use export::export_handler;
pub use pay::pay_handler;
pub use upload::upload_handler;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        current::current_handler,
        upload::upload_handler,
        pay::pay_handler,
        callback::callback_handler,
        export::export_handler,
    ),
    components(
        schemas(current::CurrentStatus, upload::UploadResponse)
    ),
    tags(
        (name = "Document Insight API", description = "Upload a document, pay, and retrieve its analysis report.")
    )
)]
pub struct ApiDoc;
