mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;
use std::sync::atomic::Ordering;

use common::TestApp;

/// Drives a fresh wizard session through every step up to (but excluding)
/// submission, returning the session id. Expands inline so it works with
/// the opaque test-service type.
macro_rules! drive_to_payment {
    ($app:expr, $payment:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/wizard")
            .set_json(&json!({ "booking_type": "airport-transfer" }))
            .to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service($app, req).await).await;
        let id = body["session_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/wizard/{}", id))
            .set_json(&json!({
                "route": {
                    "origin": { "type": "airport", "code": "CMB" },
                    "destination": { "type": "named", "name": "Kandy City" },
                    "pickup_date": "2025-03-10",
                    "pickup_time": "14:30",
                    "adults": 2
                },
                "vehicle_id": "sedan",
                "customer": {
                    "first_name": "Amara",
                    "last_name": "Perera",
                    "email": "amara@example.com",
                    "phone": "+94 77 123 4567",
                    "country": "Sri Lanka"
                },
                "payment": { "method": $payment, "terms_accepted": true }
            }))
            .to_request();
        assert_eq!(test::call_service($app, req).await.status(), 200);
        id
    }};
}

#[actix_rt::test]
#[serial]
async fn test_submitted_booking_is_retrievable_by_reference_and_email() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let id = drive_to_payment!(&app, json!({ "method": "cash" }));
    let req = test::TestRequest::post()
        .uri(&format!("/api/wizard/{}/submit", id))
        .to_request();
    let booking: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    let reference = booking["booking_reference"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/bookings/{}", reference))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let fetched: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(fetched["booking_reference"], reference.as_str());
    assert_eq!(fetched["vehicle_name"], "Premium Sedan");

    let req = test::TestRequest::get()
        .uri("/api/bookings?email=amara@example.com")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let list: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[actix_rt::test]
#[serial]
async fn test_bookings_query_requires_email() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/bookings").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_unknown_reference_is_not_found() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/bookings/ATNOPE0000")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_rt::test]
#[serial]
async fn test_card_booking_captures_and_confirms() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let id = drive_to_payment!(
        &app,
        json!({ "method": "card", "payment_method_id": "pm_visa" })
    );
    let req = test::TestRequest::post()
        .uri(&format!("/api/wizard/{}/submit", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let booking: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["payment_status"], "paid");
    assert_eq!(booking["transaction_id"], "pi_test_1");
    assert_eq!(test_app.gateway.preauthorize_calls.load(Ordering::SeqCst), 1);
    assert_eq!(test_app.gateway.capture_calls.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
#[serial]
async fn test_declined_card_keeps_wizard_state_for_retry() {
    let test_app = TestApp::declining();
    let app = test::init_service(test_app.create_app()).await;

    let id = drive_to_payment!(
        &app,
        json!({ "method": "card", "payment_method_id": "pm_visa" })
    );
    let req = test::TestRequest::post()
        .uri(&format!("/api/wizard/{}/submit", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 402);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "payment_declined");
    // No booking was recorded.
    assert!(test_app.store.bookings.lock().unwrap().is_empty());

    // The session keeps its data so the customer can retry without
    // re-entering anything.
    let req = test::TestRequest::get()
        .uri(&format!("/api/wizard/{}", id))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["state"]["submitting"], false);
    assert_eq!(body["state"]["fields"]["customer"]["first_name"], "Amara");
}

#[actix_rt::test]
#[serial]
async fn test_wallet_booking_debits_balance() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    // Fund the wallet first.
    let req = test::TestRequest::post()
        .uri("/api/wallet/acct_1/recharge")
        .set_json(&json!({ "amount_cents": 20000, "payment_method_id": "pm_visa" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let id = drive_to_payment!(&app, json!({ "method": "wallet", "account_id": "acct_1" }));
    let req = test::TestRequest::post()
        .uri(&format!("/api/wizard/{}/submit", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let booking: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(booking["payment_status"], "paid");

    // $80 booking against the $200 recharge.
    let req = test::TestRequest::get().uri("/api/wallet/acct_1").to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["balance_cents"], 12000);
}

#[actix_rt::test]
#[serial]
async fn test_wallet_booking_with_insufficient_funds_is_rejected() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/wallet/acct_2/recharge")
        .set_json(&json!({ "amount_cents": 1000, "payment_method_id": "pm_visa" }))
        .to_request();
    test::call_service(&app, req).await;

    let id = drive_to_payment!(&app, json!({ "method": "wallet", "account_id": "acct_2" }));
    let req = test::TestRequest::post()
        .uri(&format!("/api/wizard/{}/submit", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 402);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "insufficient_funds");

    // Balance untouched, nothing persisted.
    let req = test::TestRequest::get().uri("/api/wallet/acct_2").to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["balance_cents"], 1000);
    assert!(test_app.store.bookings.lock().unwrap().is_empty());
}

#[actix_rt::test]
#[serial]
async fn test_admin_listing_and_status_updates() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let id = drive_to_payment!(&app, json!({ "method": "cash" }));
    let req = test::TestRequest::post()
        .uri(&format!("/api/wizard/{}/submit", id))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/admin/bookings?status=pending")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let list: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let booking_id = list[0]["_id"]["$oid"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/admin/bookings?status=nonsense")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/bookings/{}/status", booking_id))
        .set_json(&json!({ "status": "confirmed", "notes": "paid at desk" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/bookings/{}/driver", booking_id))
        .set_json(&json!({
            "driver_id": "drv_9",
            "driver_name": "Nuwan Silva",
            "driver_phone": "+94 71 555 0101",
            "vehicle_id": "veh_12"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::get()
        .uri("/api/admin/bookings?status=assigned")
        .to_request();
    let list: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["assigned_driver_name"], "Nuwan Silva");
}

#[actix_rt::test]
#[serial]
async fn test_admin_vehicle_pricing_is_recorded() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri("/api/admin/vehicles/sedan/pricing")
        .set_json(&json!({ "base_price": 25.0, "per_km_rate": 0.6 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
    assert_eq!(test_app.store.pricing_overrides.lock().unwrap().len(), 1);

    let req = test::TestRequest::put()
        .uri("/api/admin/vehicles/sedan/pricing")
        .set_json(&json!({ "base_price": -1.0, "per_km_rate": 0.6 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}
