use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::models::booking::{BookingStatus, DriverAssignment};
use crate::models::vehicle::VehiclePricingOverride;
use crate::services::store::interface::BookingStore;

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusUpdateInput {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct VehiclePricingInput {
    pub base_price: f64,
    pub per_km_rate: f64,
}

pub async fn list_bookings(
    store: web::Data<dyn BookingStore>,
    query: web::Query<StatusQuery>,
) -> impl Responder {
    let status = match query.status.as_deref() {
        Some(raw) => match BookingStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return HttpResponse::BadRequest().body(format!("Unknown status: {}", raw));
            }
        },
        None => None,
    };

    match store.list(status).await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(e) => {
            log::error!("Error listing bookings: {}", e);
            HttpResponse::InternalServerError().body("Failed to list bookings")
        }
    }
}

pub async fn update_booking_status(
    store: web::Data<dyn BookingStore>,
    path: web::Path<String>,
    input: web::Json<StatusUpdateInput>,
) -> impl Responder {
    let booking_id = path.into_inner();
    let input = input.into_inner();

    let Some(status) = BookingStatus::parse(&input.status) else {
        return HttpResponse::BadRequest().body(format!("Unknown status: {}", input.status));
    };

    match store.update_status(&booking_id, status, input.notes).await {
        Ok(true) => HttpResponse::Ok().body("Booking status updated"),
        Ok(false) => HttpResponse::NotFound().body("Booking not found"),
        Err(e) => {
            log::error!("Error updating booking {}: {}", booking_id, e);
            HttpResponse::InternalServerError().body("Failed to update booking")
        }
    }
}

pub async fn assign_driver(
    store: web::Data<dyn BookingStore>,
    path: web::Path<String>,
    input: web::Json<DriverAssignment>,
) -> impl Responder {
    let booking_id = path.into_inner();

    match store.assign_driver(&booking_id, &input).await {
        Ok(true) => HttpResponse::Ok().body("Driver assigned"),
        Ok(false) => HttpResponse::NotFound().body("Booking not found"),
        Err(e) => {
            log::error!("Error assigning driver to {}: {}", booking_id, e);
            HttpResponse::InternalServerError().body("Failed to assign driver")
        }
    }
}

/// Persist a pricing override. Applied to the live catalog on the next
/// startup; the handler only records it.
pub async fn update_vehicle_pricing(
    store: web::Data<dyn BookingStore>,
    path: web::Path<String>,
    input: web::Json<VehiclePricingInput>,
) -> impl Responder {
    let vehicle_id = path.into_inner();

    if input.base_price < 0.0 || input.per_km_rate < 0.0 {
        return HttpResponse::BadRequest().body("Prices must be non-negative");
    }

    let pricing = VehiclePricingOverride {
        id: None,
        vehicle_id: vehicle_id.clone(),
        base_price: input.base_price,
        per_km_rate: input.per_km_rate,
        updated_at: None,
    };

    match store.upsert_vehicle_pricing(&pricing).await {
        Ok(()) => HttpResponse::Ok().body("Vehicle pricing updated"),
        Err(e) => {
            log::error!("Error updating pricing for {}: {}", vehicle_id, e);
            HttpResponse::InternalServerError().body("Failed to update vehicle pricing")
        }
    }
}
