use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::services::catalog::Catalog;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn get_airports(
    catalog: web::Data<Catalog>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let q = query.q.as_deref().unwrap_or("");
    HttpResponse::Ok().json(catalog.search_airports(q))
}

pub async fn get_destinations(
    catalog: web::Data<Catalog>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let q = query.q.as_deref().unwrap_or("");
    HttpResponse::Ok().json(catalog.search_destinations(q))
}

pub async fn get_vehicles(catalog: web::Data<Catalog>) -> impl Responder {
    HttpResponse::Ok().json(catalog.vehicles())
}

pub async fn get_extras(catalog: web::Data<Catalog>) -> impl Responder {
    HttpResponse::Ok().json(catalog.extras())
}
