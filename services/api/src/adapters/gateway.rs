//! services/api/src/adapters/gateway.rs
//!
//! This module contains the payment gateway adapter. It implements the
//! `PaymentGateway` port from the `core` crate against a Midtrans-Snap-style
//! HTTP endpoint: one POST creates an order and returns the URL the browser
//! is redirected to.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use doc_insight_core::ports::{CheckoutOrder, PaymentGateway, PortError, PortResult};
use serde_json::json;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that creates checkout orders against the external gateway.
#[derive(Clone)]
pub struct SnapGateway {
    client: reqwest::Client,
    gateway_url: String,
    server_key: String,
    /// Public base URL of this deployment, used to build the browser
    /// redirect and webhook notification targets.
    base_url: String,
}

impl SnapGateway {
    /// Creates a new `SnapGateway`.
    pub fn new(gateway_url: String, server_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            server_key,
            base_url,
        }
    }
}

//=========================================================================================
// `PaymentGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl PaymentGateway for SnapGateway {
    async fn create_order(
        &self,
        order_reference: &str,
        gross_amount: u64,
    ) -> PortResult<CheckoutOrder> {
        let finish_url = format!("{}/?page=result", self.base_url);
        let payload = json!({
            "transaction_details": {
                "order_id": order_reference,
                "gross_amount": gross_amount,
            },
            "credit_card": {
                "secure": true,
            },
            "callbacks": {
                "finish": finish_url,
            },
        });

        let response = self
            .client
            .post(&self.gateway_url)
            .header("Accept", "application/json")
            .header(
                "Authorization",
                format!("Basic {}", BASE64.encode(&self.server_key)),
            )
            // Points the gateway's asynchronous notification at our webhook.
            .header(
                "X-Override-Notification",
                format!("{}/api/callback", self.base_url),
            )
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Gateway(format!("{}: {}", status, body)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let redirect_url = body
            .get("redirect_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                PortError::Unexpected("Gateway response carried no redirect_url".to_string())
            })?
            .to_string();

        Ok(CheckoutOrder { redirect_url })
    }
}
