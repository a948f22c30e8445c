use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use recharge_travels_api::config::AppConfig;
use recharge_travels_api::db;
use recharge_travels_api::routes;
use recharge_travels_api::services::booking_service::BookingService;
use recharge_travels_api::services::catalog;
use recharge_travels_api::services::flight_service::FlightService;
use recharge_travels_api::services::payment::interface::PaymentGateway;
use recharge_travels_api::services::route_service::RouteService;
use recharge_travels_api::services::store::interface::{BookingStore, WalletLedger};
use recharge_travels_api::services::store::mongo_store::{MongoBookingStore, MongoWalletLedger};
use recharge_travels_api::services::stripe::provider::StripeProvider;
use recharge_travels_api::services::wallet_service::WalletService;
use recharge_travels_api::services::wizard::WizardSessions;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let config = AppConfig::from_env();
    if config.demo_mode {
        println!("Demo mode: external lookups disabled");
    }

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    println!("Got MongoDB URI, attempting connection...");
    let mongo_client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let stripe_key = std::env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set");
    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeProvider::new(stripe_key));

    let catalog = Arc::new(catalog::load_catalog(&mongo_client).await);
    println!(
        "Catalog loaded: {} airports, {} destinations, {} vehicles, {} extras",
        catalog.airports().len(),
        catalog.destinations().len(),
        catalog.vehicles().len(),
        catalog.extras().len()
    );

    let route_service = Arc::new(RouteService::new(config.clone()));
    let flight_service = Arc::new(FlightService::new(config.clone()));

    let store: Arc<dyn BookingStore> = Arc::new(MongoBookingStore::new(mongo_client.clone()));
    let ledger: Arc<dyn WalletLedger> = Arc::new(MongoWalletLedger::new(mongo_client.clone()));

    let booking_service = BookingService::new(
        catalog.clone(),
        route_service.clone(),
        gateway.clone(),
        store.clone(),
        ledger.clone(),
        config.currency.clone(),
    );
    let wallet_service = WalletService::new(gateway.clone(), ledger.clone(), config.currency.clone());
    let sessions = web::Data::new(WizardSessions::new());

    println!("Starting HTTP server...");

    let config_data = web::Data::new(config);
    let catalog_data = web::Data::from(catalog);
    let route_service_data = web::Data::from(route_service);
    let flight_service_data = web::Data::from(flight_service);
    let store_data: web::Data<dyn BookingStore> = web::Data::from(store);
    let booking_service_data = web::Data::new(booking_service);
    let wallet_service_data = web::Data::new(wallet_service);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(web::Data::new(mongo_client.clone()))
            .app_data(config_data.clone())
            .app_data(catalog_data.clone())
            .app_data(route_service_data.clone())
            .app_data(flight_service_data.clone())
            .app_data(store_data.clone())
            .app_data(booking_service_data.clone())
            .app_data(wallet_service_data.clone())
            .app_data(sessions.clone())
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
