//! Payment Gateway Client
//!
//! Thin REST client for the external payment gateway (Razorpay-style API:
//! basic auth with key id/secret, amounts in minor currency units).

use serde::{Deserialize, Serialize};

use super::PaymentError;

/// A created charge intent, handed back to the client so it can drive the
/// gateway's checkout flow
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    pub gateway_order_id: String,
    /// Amount in major units (what the customer sees)
    pub amount: f64,
    pub currency: String,
    /// Public key id the client-side checkout needs
    pub key_id: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    /// Minor units (paise for INR)
    amount: i64,
    currency: String,
    receipt: String,
    notes: OrderNotes,
}

#[derive(Debug, Serialize)]
struct OrderNotes {
    user_id: String,
    item_count: usize,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
    currency: String,
}

#[derive(Clone)]
pub struct PaymentGateway {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
    currency: String,
}

impl PaymentGateway {
    pub fn new(base_url: String, key_id: String, key_secret: String, currency: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            key_id,
            key_secret,
            currency,
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a charge intent for `amount` (major units)
    pub async fn create_order(
        &self,
        amount: f64,
        amount_minor: i64,
        receipt: String,
        user_id: String,
        item_count: usize,
    ) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/v1/orders", self.base_url.trim_end_matches('/'));
        let body = CreateOrderRequest {
            amount: amount_minor,
            currency: self.currency.clone(),
            receipt,
            notes: OrderNotes {
                user_id,
                item_count,
            },
        };

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PaymentError::Gateway(format!("{status}: {text}")));
        }

        let created: CreateOrderResponse = response.json().await?;
        Ok(PaymentIntent {
            gateway_order_id: created.id,
            amount,
            currency: created.currency,
            key_id: self.key_id.clone(),
        })
    }
}
