use actix_web::{web, HttpResponse, Responder};

use crate::services::flight_service::FlightService;

/// Flight-status prefill for the wizard's flight step. Lookup failures are
/// not errors from the customer's point of view; the client just skips the
/// prefill.
pub async fn get_flight_status(
    flight_service: web::Data<FlightService>,
    path: web::Path<String>,
) -> impl Responder {
    let flight_number = path.into_inner();

    match flight_service.lookup(&flight_number).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().body("Flight not found"),
    }
}
