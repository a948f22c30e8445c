use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, PaymentError, PersistenceError};
use crate::services::booking_service::BookingService;
use crate::services::catalog::Catalog;
use crate::services::wizard::{StepDefinition, WizardSessions, WizardState, WizardUpdate};

#[derive(Deserialize)]
pub struct CreateSessionInput {
    pub booking_type: crate::models::booking::BookingType,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub steps: Vec<StepDefinition>,
    pub state: WizardState,
}

fn session_response(session_id: Uuid, state: WizardState) -> SessionResponse {
    SessionResponse {
        session_id,
        steps: state.steps().to_vec(),
        state,
    }
}

fn parse_session_id(raw: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw).map_err(|_| HttpResponse::BadRequest().body("Invalid session id"))
}

pub async fn create_session(
    sessions: web::Data<WizardSessions>,
    catalog: web::Data<Catalog>,
    input: web::Json<CreateSessionInput>,
) -> impl Responder {
    let (id, state) = sessions.create(input.booking_type, &catalog);
    log::info!("Opened {:?} wizard session {}", input.booking_type, id);
    HttpResponse::Ok().json(session_response(id, state))
}

pub async fn get_session(
    sessions: web::Data<WizardSessions>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_session_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.get(&id) {
        Some(state) => HttpResponse::Ok().json(session_response(id, state)),
        None => HttpResponse::NotFound().body("Session not found"),
    }
}

pub async fn update_fields(
    sessions: web::Data<WizardSessions>,
    catalog: web::Data<Catalog>,
    path: web::Path<String>,
    input: web::Json<WizardUpdate>,
) -> impl Responder {
    let id = match parse_session_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let update = input.into_inner();

    match sessions.with_state(&id, |state| {
        state.apply_update(update, &catalog);
        state.clone()
    }) {
        Some(state) => HttpResponse::Ok().json(session_response(id, state)),
        None => HttpResponse::NotFound().body("Session not found"),
    }
}

pub async fn advance_step(
    sessions: web::Data<WizardSessions>,
    catalog: web::Data<Catalog>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_session_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.with_state(&id, |state| state.advance(&catalog)) {
        Some(Ok(current_step)) => {
            HttpResponse::Ok().json(serde_json::json!({ "current_step": current_step }))
        }
        Some(Err(validation)) => HttpResponse::UnprocessableEntity().json(validation),
        None => HttpResponse::NotFound().body("Session not found"),
    }
}

pub async fn back_step(
    sessions: web::Data<WizardSessions>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_session_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.with_state(&id, |state| state.retreat()) {
        Some(current_step) => {
            HttpResponse::Ok().json(serde_json::json!({ "current_step": current_step }))
        }
        None => HttpResponse::NotFound().body("Session not found"),
    }
}

pub async fn goto_step(
    sessions: web::Data<WizardSessions>,
    path: web::Path<(String, usize)>,
) -> impl Responder {
    let (raw_id, step) = path.into_inner();
    let id = match parse_session_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.with_state(&id, |state| state.jump_to(step)) {
        Some(Ok(current_step)) => {
            HttpResponse::Ok().json(serde_json::json!({ "current_step": current_step }))
        }
        Some(Err(validation)) => HttpResponse::UnprocessableEntity().json(validation),
        None => HttpResponse::NotFound().body("Session not found"),
    }
}

pub async fn close_session(
    sessions: web::Data<WizardSessions>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_session_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Closing the modal discards the session; any in-flight submission's
    // eventual result is simply dropped.
    if sessions.remove(&id) {
        HttpResponse::Ok().body("Session closed")
    } else {
        HttpResponse::NotFound().body("Session not found")
    }
}

pub async fn submit(
    sessions: web::Data<WizardSessions>,
    booking_service: web::Data<BookingService>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_session_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Mark the session in-flight and snapshot it under the map entry, so
    // the external calls below run without holding the lock. The flag is
    // the re-submission guard: a second click lands here and bounces.
    let snapshot = match sessions.with_state(&id, |state| {
        if state.submitting {
            return Err(BookingError::SubmissionInFlight);
        }
        let validation = state.validate_all(booking_service.catalog());
        if !validation.is_empty() {
            return Err(BookingError::Validation(validation));
        }
        state.submitting = true;
        Ok(state.clone())
    }) {
        None => return HttpResponse::NotFound().body("Session not found"),
        Some(Err(err)) => return booking_error_response(err),
        Some(Ok(snapshot)) => snapshot,
    };

    match booking_service.submit(&snapshot).await {
        Ok(booking) => {
            log::info!("Booking {} submitted", booking.booking_reference);
            // Terminal state: the wizard resets to step one, cleared.
            sessions.with_state(&id, |state| state.reset(booking_service.catalog()));
            HttpResponse::Ok().json(booking)
        }
        Err(err) => {
            // Keep the entered data so the customer can retry.
            sessions.with_state(&id, |state| state.submitting = false);
            booking_error_response(err)
        }
    }
}

pub fn booking_error_response(err: BookingError) -> HttpResponse {
    match err {
        BookingError::Validation(validation) => {
            HttpResponse::UnprocessableEntity().json(validation)
        }
        BookingError::SubmissionInFlight => {
            HttpResponse::Conflict().body("A submission is already in progress")
        }
        BookingError::Configuration(e) => {
            log::error!("Booking configuration error: {}", e);
            HttpResponse::InternalServerError().body("Booking configuration error")
        }
        BookingError::Payment(PaymentError::Declined { reason }) => HttpResponse::PaymentRequired()
            .json(serde_json::json!({ "error": "payment_declined", "reason": reason })),
        BookingError::Payment(PaymentError::InsufficientFunds {
            balance_cents,
            amount_cents,
        }) => HttpResponse::PaymentRequired().json(serde_json::json!({
            "error": "insufficient_funds",
            "balance_cents": balance_cents,
            "amount_cents": amount_cents,
        })),
        BookingError::Payment(PaymentError::GatewayUnreachable(detail)) => {
            log::error!("Payment gateway unreachable: {}", detail);
            HttpResponse::BadGateway().body("Payment gateway unreachable, please retry")
        }
        BookingError::Persistence(PersistenceError::ReconciliationRequired {
            payment_ref, ..
        }) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "reconciliation_required",
            "payment_ref": payment_ref,
            "message": "Payment was captured but the booking could not be recorded; support has been notified",
        })),
        BookingError::Persistence(PersistenceError::Database(detail)) => {
            log::error!("Booking persistence failed: {}", detail);
            HttpResponse::InternalServerError().body("Failed to save booking")
        }
    }
}
