use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use recharge_travels_api::config::AppConfig;
use recharge_travels_api::errors::{BookingError, PaymentError, PersistenceError};
use recharge_travels_api::models::booking::{BookingStatus, DriverAssignment, TransferBooking};
use recharge_travels_api::models::vehicle::VehiclePricingOverride;
use recharge_travels_api::models::wallet::WalletAccount;
use recharge_travels_api::routes;
use recharge_travels_api::services::booking_service::BookingService;
use recharge_travels_api::services::catalog::Catalog;
use recharge_travels_api::services::flight_service::FlightService;
use recharge_travels_api::services::payment::interface::{
    PaymentAuthorization, PaymentCapture, PaymentGateway,
};
use recharge_travels_api::services::route_service::RouteService;
use recharge_travels_api::services::store::interface::{BookingStore, WalletLedger};
use recharge_travels_api::services::wallet_service::WalletService;
use recharge_travels_api::services::wizard::WizardSessions;

/// Gateway double standing in for Stripe. Counts calls so tests can assert
/// which payment paths actually ran.
#[derive(Default)]
pub struct MockGateway {
    pub preauthorize_calls: AtomicUsize,
    pub capture_calls: AtomicUsize,
    pub charge_calls: AtomicUsize,
    pub decline: bool,
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn preauthorize(
        &self,
        _amount_cents: i64,
        _currency: &str,
        _payment_method_id: &str,
        _customer_id: Option<&str>,
    ) -> Result<PaymentAuthorization, PaymentError> {
        self.preauthorize_calls.fetch_add(1, Ordering::SeqCst);
        if self.decline {
            return Err(PaymentError::Declined {
                reason: "card declined".to_string(),
            });
        }
        Ok(PaymentAuthorization {
            id: "pi_test_1".to_string(),
            status: "requires_capture".to_string(),
            redirect_url: None,
        })
    }

    async fn capture(&self, payment_intent_id: &str) -> Result<PaymentCapture, PaymentError> {
        self.capture_calls.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentCapture {
            id: payment_intent_id.to_string(),
            status: "succeeded".to_string(),
        })
    }

    async fn charge(
        &self,
        _amount_cents: i64,
        _currency: &str,
        _payment_method_id: &str,
        _customer_id: Option<&str>,
    ) -> Result<PaymentCapture, PaymentError> {
        self.charge_calls.fetch_add(1, Ordering::SeqCst);
        if self.decline {
            return Err(PaymentError::Declined {
                reason: "card declined".to_string(),
            });
        }
        Ok(PaymentCapture {
            id: "pi_charge_1".to_string(),
            status: "succeeded".to_string(),
        })
    }
}

/// In-memory persistence double.
#[derive(Default)]
pub struct MemoryStore {
    pub bookings: Mutex<Vec<TransferBooking>>,
    pub pricing_overrides: Mutex<Vec<VehiclePricingOverride>>,
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert_booking(
        &self,
        booking: &TransferBooking,
    ) -> Result<TransferBooking, PersistenceError> {
        let mut stored = booking.clone();
        stored.id = Some(ObjectId::new());
        self.bookings.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TransferBooking>, PersistenceError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.booking_reference == reference)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<TransferBooking>, PersistenceError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.customer.email == email)
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<TransferBooking>, PersistenceError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| status.map(|s| b.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
        notes: Option<String>,
    ) -> Result<bool, PersistenceError> {
        let mut bookings = self.bookings.lock().unwrap();
        for booking in bookings.iter_mut() {
            if booking.id.map(|id| id.to_hex()).as_deref() == Some(booking_id) {
                booking.status = status;
                booking.status_notes = notes;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn assign_driver(
        &self,
        booking_id: &str,
        assignment: &DriverAssignment,
    ) -> Result<bool, PersistenceError> {
        let mut bookings = self.bookings.lock().unwrap();
        for booking in bookings.iter_mut() {
            if booking.id.map(|id| id.to_hex()).as_deref() == Some(booking_id) {
                booking.assigned_driver_id = Some(assignment.driver_id.clone());
                booking.assigned_driver_name = Some(assignment.driver_name.clone());
                booking.driver_phone = Some(assignment.driver_phone.clone());
                booking.assigned_vehicle_id = Some(assignment.vehicle_id.clone());
                booking.status = BookingStatus::Assigned;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn upsert_vehicle_pricing(
        &self,
        pricing: &VehiclePricingOverride,
    ) -> Result<(), PersistenceError> {
        self.pricing_overrides.lock().unwrap().push(pricing.clone());
        Ok(())
    }
}

/// In-memory wallet double. Accounts exist once credited.
#[derive(Default)]
pub struct MemoryLedger {
    pub balances: Mutex<std::collections::HashMap<String, i64>>,
}

#[async_trait]
impl WalletLedger for MemoryLedger {
    async fn account(&self, account_id: &str) -> Result<Option<WalletAccount>, PersistenceError> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(account_id)
            .map(|balance| account(account_id, *balance)))
    }

    async fn credit(
        &self,
        account_id: &str,
        amount_cents: i64,
        _reference: &str,
    ) -> Result<WalletAccount, PersistenceError> {
        let mut balances = self.balances.lock().unwrap();
        let balance = balances.entry(account_id.to_string()).or_insert(0);
        *balance += amount_cents;
        Ok(account(account_id, *balance))
    }

    async fn reserve_and_debit(
        &self,
        account_id: &str,
        amount_cents: i64,
        _reference: &str,
    ) -> Result<WalletAccount, BookingError> {
        let mut balances = self.balances.lock().unwrap();
        let Some(balance) = balances.get_mut(account_id) else {
            return Err(
                PersistenceError::Database(format!("Wallet account not found: {}", account_id))
                    .into(),
            );
        };
        if *balance < amount_cents {
            return Err(PaymentError::InsufficientFunds {
                balance_cents: *balance,
                amount_cents,
            }
            .into());
        }
        *balance -= amount_cents;
        Ok(account(account_id, *balance))
    }
}

fn account(account_id: &str, balance_cents: i64) -> WalletAccount {
    WalletAccount {
        id: None,
        account_id: account_id.to_string(),
        balance_cents,
        currency: "USD".to_string(),
        created_at: None,
        updated_at: None,
    }
}

pub struct TestApp {
    pub gateway: Arc<MockGateway>,
    pub store: Arc<MemoryStore>,
    pub ledger: Arc<MemoryLedger>,
    pub sessions: web::Data<WizardSessions>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway(MockGateway::default())
    }

    pub fn declining() -> Self {
        Self::with_gateway(MockGateway {
            decline: true,
            ..Default::default()
        })
    }

    pub fn with_gateway(gateway: MockGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            store: Arc::new(MemoryStore::default()),
            ledger: Arc::new(MemoryLedger::default()),
            sessions: web::Data::new(WizardSessions::new()),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let config = AppConfig::offline();
        let catalog = Arc::new(Catalog::builtin());
        let route_service = Arc::new(RouteService::new(config.clone()));
        let flight_service = Arc::new(FlightService::new(config.clone()));

        let gateway: Arc<dyn PaymentGateway> = self.gateway.clone();
        let store: Arc<dyn BookingStore> = self.store.clone();
        let ledger: Arc<dyn WalletLedger> = self.ledger.clone();

        let booking_service = BookingService::new(
            catalog.clone(),
            route_service.clone(),
            gateway.clone(),
            store.clone(),
            ledger.clone(),
            config.currency.clone(),
        );
        let wallet_service = WalletService::new(gateway, ledger, config.currency.clone());
        let store_data: web::Data<dyn BookingStore> = web::Data::from(store);

        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(web::Data::new(config))
            .app_data(web::Data::from(catalog))
            .app_data(web::Data::from(route_service))
            .app_data(web::Data::from(flight_service))
            .app_data(store_data)
            .app_data(web::Data::new(booking_service))
            .app_data(web::Data::new(wallet_service))
            .app_data(self.sessions.clone())
            .configure(routes::configure)
    }
}
