pub mod booking_service;
pub mod catalog;
pub mod flight_service;
pub mod payment;
pub mod pricing_service;
pub mod route_service;
pub mod store;
pub mod stripe;
pub mod wallet_service;
pub mod wizard;
