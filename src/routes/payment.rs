use actix_web::{web, HttpRequest, HttpResponse, Responder};
use stripe::{EventObject, EventType, Webhook};

use crate::config::AppConfig;

pub async fn handle_stripe_webhook(
    req: HttpRequest,
    payload: web::Bytes,
    config: web::Data<AppConfig>,
) -> impl Responder {
    // Get the Stripe-Signature header
    let signature = match req.headers().get("stripe-signature") {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            return HttpResponse::BadRequest().body("Missing stripe-signature header");
        }
    };

    let Some(webhook_secret) = config.stripe_webhook_secret.as_deref() else {
        log::error!("Stripe webhook received but STRIPE_WEBHOOK_SECRET is not configured");
        return HttpResponse::BadRequest().body("Webhook not configured");
    };

    // Verify the webhook signature and parse the event
    let payload_str = match String::from_utf8(payload.to_vec()) {
        Ok(s) => s,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid payload encoding");
        }
    };

    let event = match Webhook::construct_event(&payload_str, signature, webhook_secret) {
        Ok(event) => event,
        Err(e) => {
            log::warn!("Webhook error: {:?}", e);
            return HttpResponse::BadRequest().body(format!("Webhook error: {}", e));
        }
    };

    // Check the event type and handle accordingly
    match event.type_ {
        EventType::PaymentIntentSucceeded => {
            if let EventObject::PaymentIntent(payment_intent) = event.data.object {
                log::info!("Payment succeeded: {}", payment_intent.id);
                HttpResponse::Ok().json(serde_json::json!({ "received": true }))
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        EventType::PaymentIntentPaymentFailed => {
            if let EventObject::PaymentIntent(payment_intent) = event.data.object {
                // Bookings are only persisted after capture, so a failed
                // intent here has nothing to unwind; it is logged for the
                // support trail.
                log::warn!("Payment failed: {}", payment_intent.id);
                HttpResponse::Ok().json(serde_json::json!({ "received": true }))
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        EventType::ChargeSucceeded => {
            if let EventObject::Charge(charge) = event.data.object {
                log::info!("Charge succeeded: {}", charge.id);
                HttpResponse::Ok().json(serde_json::json!({ "received": true }))
            } else {
                HttpResponse::BadRequest().body("Invalid charge object")
            }
        }

        // Handle other event types as needed
        _ => {
            log::debug!("Unhandled event type: {:?}", event.type_);
            HttpResponse::Ok().json(serde_json::json!({ "received": true }))
        }
    }
}
