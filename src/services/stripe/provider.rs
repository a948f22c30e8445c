use std::str::FromStr;

use async_trait::async_trait;
use stripe::{CapturePaymentIntent, Currency, CustomerId, PaymentMethodId};

use crate::errors::PaymentError;
use crate::services::payment::interface::{PaymentAuthorization, PaymentCapture, PaymentGateway};

pub struct StripeProvider {
    pub client: stripe::Client,
}

impl StripeProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: stripe::Client::new(api_key.into()),
        }
    }

    fn build_intent<'a>(
        amount_cents: i64,
        currency: &str,
        payment_method_id: &'a str,
        customer_id: Option<&'a str>,
    ) -> Result<stripe::CreatePaymentIntent<'a>, PaymentError> {
        let currency = Currency::from_str(&currency.to_lowercase()).unwrap_or(Currency::USD);
        let mut create_intent = stripe::CreatePaymentIntent::new(amount_cents, currency);

        create_intent.payment_method = Some(
            PaymentMethodId::from_str(payment_method_id).map_err(|_| PaymentError::Declined {
                reason: "Invalid payment method id".to_string(),
            })?,
        );
        if let Some(customer_id) = customer_id {
            create_intent.customer =
                Some(CustomerId::from_str(customer_id).map_err(|_| PaymentError::Declined {
                    reason: "Invalid customer id".to_string(),
                })?);
        }
        create_intent.confirm = Some(true);

        Ok(create_intent)
    }
}

fn map_stripe_error(err: stripe::StripeError) -> PaymentError {
    match err {
        stripe::StripeError::Stripe(request_error) => PaymentError::Declined {
            reason: request_error
                .message
                .clone()
                .unwrap_or_else(|| format!("{:?}", request_error.error_type)),
        },
        other => PaymentError::GatewayUnreachable(other.to_string()),
    }
}

#[async_trait]
impl PaymentGateway for StripeProvider {
    async fn preauthorize(
        &self,
        amount_cents: i64,
        currency: &str,
        payment_method_id: &str,
        customer_id: Option<&str>,
    ) -> Result<PaymentAuthorization, PaymentError> {
        let mut create_intent =
            Self::build_intent(amount_cents, currency, payment_method_id, customer_id)?;
        // Manual capture: funds are held now and captured only once the
        // booking is ready to persist.
        create_intent.capture_method = Some(stripe::PaymentIntentCaptureMethod::Manual);

        let intent = stripe::PaymentIntent::create(&self.client, create_intent)
            .await
            .map_err(map_stripe_error)?;

        if intent.status != stripe::PaymentIntentStatus::RequiresCapture {
            return Err(PaymentError::Declined {
                reason: format!(
                    "Payment intent is not in a capturable state: {:?}",
                    intent.status
                ),
            });
        }

        Ok(PaymentAuthorization {
            id: intent.id.to_string(),
            status: intent.status.to_string(),
            redirect_url: intent
                .next_action
                .as_ref()
                .and_then(|action| action.redirect_to_url.as_ref())
                .and_then(|redirect| redirect.url.clone()),
        })
    }

    async fn capture(&self, payment_intent_id: &str) -> Result<PaymentCapture, PaymentError> {
        let captured_intent = stripe::PaymentIntent::capture(
            &self.client,
            payment_intent_id,
            CapturePaymentIntent::default(),
        )
        .await
        .map_err(map_stripe_error)?;

        Ok(PaymentCapture {
            id: captured_intent.id.to_string(),
            status: captured_intent.status.to_string(),
        })
    }

    async fn charge(
        &self,
        amount_cents: i64,
        currency: &str,
        payment_method_id: &str,
        customer_id: Option<&str>,
    ) -> Result<PaymentCapture, PaymentError> {
        let create_intent =
            Self::build_intent(amount_cents, currency, payment_method_id, customer_id)?;

        let intent = stripe::PaymentIntent::create(&self.client, create_intent)
            .await
            .map_err(map_stripe_error)?;

        if intent.status != stripe::PaymentIntentStatus::Succeeded {
            return Err(PaymentError::Declined {
                reason: format!("Payment did not succeed: {:?}", intent.status),
            });
        }

        Ok(PaymentCapture {
            id: intent.id.to_string(),
            status: intent.status.to_string(),
        })
    }
}
