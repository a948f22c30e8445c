use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::PaymentError;

/// A captured or authorized payment as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAuthorization {
    pub id: String,
    pub status: String,
    /// Redirect-based methods hand back a URL the customer must visit.
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCapture {
    pub id: String,
    pub status: String,
}

/// Seam to the payment gateway. Card bookings pre-authorize then capture;
/// wallet recharges charge immediately. Implemented by the Stripe provider
/// in production and by mocks in tests.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn preauthorize(
        &self,
        amount_cents: i64,
        currency: &str,
        payment_method_id: &str,
        customer_id: Option<&str>,
    ) -> Result<PaymentAuthorization, PaymentError>;

    async fn capture(&self, payment_intent_id: &str) -> Result<PaymentCapture, PaymentError>;

    async fn charge(
        &self,
        amount_cents: i64,
        currency: &str,
        payment_method_id: &str,
        customer_id: Option<&str>,
    ) -> Result<PaymentCapture, PaymentError>;
}
