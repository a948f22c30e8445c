use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::routes::wizard::booking_error_response;
use crate::services::wallet_service::WalletService;

#[derive(Deserialize)]
pub struct RechargeInput {
    pub amount_cents: i64,
    pub payment_method_id: String,
    pub customer_id: Option<String>,
}

pub async fn get_wallet(
    wallet_service: web::Data<WalletService>,
    path: web::Path<String>,
) -> impl Responder {
    let account_id = path.into_inner();

    match wallet_service.balance(&account_id).await {
        Ok(Some(account)) => HttpResponse::Ok().json(account),
        Ok(None) => HttpResponse::NotFound().body("Wallet not found"),
        Err(e) => {
            log::error!("Error fetching wallet {}: {}", account_id, e);
            HttpResponse::InternalServerError().body("Failed to fetch wallet")
        }
    }
}

pub async fn recharge(
    wallet_service: web::Data<WalletService>,
    path: web::Path<String>,
    input: web::Json<RechargeInput>,
) -> impl Responder {
    let account_id = path.into_inner();
    let input = input.into_inner();

    match wallet_service
        .recharge(
            &account_id,
            input.amount_cents,
            &input.payment_method_id,
            input.customer_id.as_deref(),
        )
        .await
    {
        Ok(account) => HttpResponse::Ok().json(account),
        Err(err) => booking_error_response(err),
    }
}
