use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::services::store::interface::BookingStore;

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

pub async fn get_booking_by_reference(
    store: web::Data<dyn BookingStore>,
    path: web::Path<String>,
) -> impl Responder {
    let reference = path.into_inner();

    match store.find_by_reference(&reference).await {
        Ok(Some(booking)) => HttpResponse::Ok().json(booking),
        Ok(None) => HttpResponse::NotFound().body("Booking not found"),
        Err(e) => {
            log::error!("Error fetching booking {}: {}", reference, e);
            HttpResponse::InternalServerError().body("Failed to fetch booking")
        }
    }
}

pub async fn get_bookings_by_email(
    store: web::Data<dyn BookingStore>,
    query: web::Query<EmailQuery>,
) -> impl Responder {
    let Some(email) = query.email.clone().filter(|e| !e.trim().is_empty()) else {
        return HttpResponse::BadRequest().body("email query parameter is required");
    };

    match store.find_by_email(&email).await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(e) => {
            log::error!("Error fetching bookings for {}: {}", email, e);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}
