//! services/api/src/adapters/renderer.rs
//!
//! This module contains the PDF renderer adapter. It implements the
//! `PdfRenderer` port from the `core` crate by driving a headless Chromium
//! instance: load the HTML, print to PDF with a fixed A4 page template,
//! return the bytes.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use doc_insight_core::ports::{PdfRenderer, PortError, PortResult};
use futures::StreamExt;

/// Page header drawn by Chromium above every page of the exported report.
const HEADER_TEMPLATE: &str = r#"
<div style="display: flex; width: 100%; gap: 12px; justify-content: flex-start; align-items: center; padding-inline: 40px; border-bottom: 1px solid #000000; padding-bottom: 16px;">
    <div style="display: flex; flex-direction: column;">
        <h1 style="font-size: 16px; font-weight: bold; line-height: 1; margin: 0">Document Analysis</h1>
        <p style="font-size: 12px; margin: 0">Generated report</p>
    </div>
</div>
"#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that rasterizes HTML to PDF with a headless Chromium.
/// The browser is launched per render, matching the renderer's stateless
/// contract.
#[derive(Clone, Default)]
pub struct ChromiumRenderer;

impl ChromiumRenderer {
    /// Creates a new `ChromiumRenderer`.
    pub fn new() -> Self {
        Self
    }
}

//=========================================================================================
// `PdfRenderer` Trait Implementation
//=========================================================================================

#[async_trait]
impl PdfRenderer for ChromiumRenderer {
    async fn render_html(&self, html: &str) -> PortResult<Vec<u8>> {
        let config = BrowserConfig::builder()
            .args(["--no-sandbox", "--disable-setuid-sandbox"])
            .build()
            .map_err(PortError::Unexpected)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to launch browser: {}", e)))?;

        // The handler must be polled for the browser connection to make progress.
        let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let result = async {
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| PortError::Unexpected(format!("Failed to create page: {}", e)))?;

            page.set_content(html)
                .await
                .map_err(|e| PortError::Unexpected(format!("Failed to set content: {}", e)))?;

            // A4 with the fixed logo header; margins mirror the report's
            // 80px page margin (100px on top for the header).
            let params = PrintToPdfParams {
                display_header_footer: Some(true),
                header_template: Some(HEADER_TEMPLATE.to_string()),
                footer_template: Some("<div></div>".to_string()),
                print_background: Some(true),
                paper_width: Some(8.27),
                paper_height: Some(11.69),
                margin_top: Some(1.04),
                margin_bottom: Some(0.83),
                margin_left: Some(0.83),
                margin_right: Some(0.83),
                ..Default::default()
            };

            page.pdf(params)
                .await
                .map_err(|e| PortError::Unexpected(format!("Failed to print PDF: {}", e)))
        }
        .await;

        let _ = browser.close().await;
        handle.abort();

        result
    }
}
