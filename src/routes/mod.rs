pub mod admin;
pub mod bookings;
pub mod catalog;
pub mod flight;
pub mod health;
pub mod payment;
pub mod quote;
pub mod wallet;
pub mod wizard;

use actix_web::web;

/// The full route tree, shared by the binary and the integration tests so
/// they can never drift apart.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check)).service(
        web::scope("/api")
            .route("/airports", web::get().to(catalog::get_airports))
            .route("/destinations", web::get().to(catalog::get_destinations))
            .route("/vehicles", web::get().to(catalog::get_vehicles))
            .route("/extras", web::get().to(catalog::get_extras))
            .route("/quote", web::post().to(quote::create_quote))
            .route(
                "/flights/{flight_number}",
                web::get().to(flight::get_flight_status),
            )
            .service(
                web::scope("/wizard")
                    .route("", web::post().to(wizard::create_session))
                    .route("/{id}", web::get().to(wizard::get_session))
                    .route("/{id}", web::put().to(wizard::update_fields))
                    .route("/{id}", web::delete().to(wizard::close_session))
                    .route("/{id}/advance", web::post().to(wizard::advance_step))
                    .route("/{id}/back", web::post().to(wizard::back_step))
                    .route("/{id}/goto/{step}", web::post().to(wizard::goto_step))
                    .route("/{id}/submit", web::post().to(wizard::submit)),
            )
            .service(
                web::scope("/bookings")
                    .route("", web::get().to(bookings::get_bookings_by_email))
                    .route(
                        "/{reference}",
                        web::get().to(bookings::get_booking_by_reference),
                    ),
            )
            .service(
                web::scope("/wallet")
                    .route("/{account_id}", web::get().to(wallet::get_wallet))
                    .route("/{account_id}/recharge", web::post().to(wallet::recharge)),
            )
            .service(
                web::scope("/admin")
                    .route("/bookings", web::get().to(admin::list_bookings))
                    .route(
                        "/bookings/{id}/status",
                        web::put().to(admin::update_booking_status),
                    )
                    .route(
                        "/bookings/{id}/driver",
                        web::put().to(admin::assign_driver),
                    )
                    .route(
                        "/vehicles/{id}/pricing",
                        web::put().to(admin::update_vehicle_pricing),
                    ),
            )
            .route(
                "/stripe/webhook",
                web::post().to(payment::handle_stripe_webhook),
            ),
    );
}
