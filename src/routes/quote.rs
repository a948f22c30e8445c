use std::collections::HashMap;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::models::booking::PriceBreakdown;
use crate::models::location::RoutePoint;
use crate::services::catalog::Catalog;
use crate::services::pricing_service::PricingService;
use crate::services::route_service::{RouteEstimate, RouteService};

#[derive(Deserialize)]
pub struct QuoteInput {
    pub origin: RoutePoint,
    pub destination: RoutePoint,
    pub vehicle_id: String,
    #[serde(default)]
    pub extras: Vec<String>,
    #[serde(default)]
    pub quantities: HashMap<String, u32>,
    #[serde(default)]
    pub round_trip: bool,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub estimate: RouteEstimate,
    pub pricing: PriceBreakdown,
}

/// Price a route without opening a wizard session. Degraded estimates are
/// flagged rather than rejected so the caller can label them conservative.
pub async fn create_quote(
    catalog: web::Data<Catalog>,
    route_service: web::Data<RouteService>,
    config: web::Data<AppConfig>,
    input: web::Json<QuoteInput>,
) -> impl Responder {
    let input = input.into_inner();

    let estimate = route_service
        .estimate(&catalog, &input.origin, &input.destination)
        .await;

    match PricingService::calculate(
        &catalog,
        estimate.distance_km,
        &input.vehicle_id,
        &input.extras,
        &input.quantities,
        input.round_trip,
        &config.currency,
    ) {
        Ok(pricing) => HttpResponse::Ok().json(QuoteResponse { estimate, pricing }),
        Err(e) => {
            log::warn!("Quote rejected: {}", e);
            HttpResponse::BadRequest().body(format!("Unknown {} id", e.kind))
        }
    }
}
