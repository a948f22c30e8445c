use std::sync::Arc;

use mongodb::bson::DateTime;
use rand::{distributions::Alphanumeric, Rng};

use crate::errors::{BookingError, PersistenceError, ValidationErrors};
use crate::models::booking::{
    BookingStatus, BookingType, CustomerInfo, FlightDetails, PaymentStatus, RouteSnapshot,
    TransferBooking,
};
use crate::services::catalog::Catalog;
use crate::services::payment::interface::PaymentGateway;
use crate::services::pricing_service::PricingService;
use crate::services::route_service::RouteService;
use crate::services::store::interface::{BookingStore, WalletLedger};
use crate::services::wizard::{PaymentMethod, WizardState};

/// Assembles validated wizard state into an immutable booking record,
/// sequencing payment strictly before persistence.
#[derive(Clone)]
pub struct BookingService {
    catalog: Arc<Catalog>,
    routes: Arc<RouteService>,
    gateway: Arc<dyn PaymentGateway>,
    store: Arc<dyn BookingStore>,
    ledger: Arc<dyn WalletLedger>,
    currency: String,
}

impl BookingService {
    pub fn new(
        catalog: Arc<Catalog>,
        routes: Arc<RouteService>,
        gateway: Arc<dyn PaymentGateway>,
        store: Arc<dyn BookingStore>,
        ledger: Arc<dyn WalletLedger>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            routes,
            gateway,
            store,
            ledger,
            currency: currency.into(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /// Submit a completed wizard. Every step is revalidated here because
    /// completed steps can be revisited and edited after their gate passed.
    pub async fn submit(&self, state: &WizardState) -> Result<TransferBooking, BookingError> {
        let validation = state.validate_all(&self.catalog);
        if !validation.is_empty() {
            return Err(BookingError::Validation(validation));
        }

        let route_fields = &state.fields.route;
        let (Some(origin), Some(destination)) =
            (route_fields.origin.as_ref(), route_fields.destination.as_ref())
        else {
            let mut errors = ValidationErrors::default();
            errors.push("route", "Route endpoints are required");
            return Err(BookingError::Validation(errors));
        };

        let estimate = self.routes.estimate(&self.catalog, origin, destination).await;

        let extras = &state.fields.extras;
        let vehicle_id = state.fields.vehicle_id.as_deref().unwrap_or_default();
        let pricing = PricingService::calculate(
            &self.catalog,
            estimate.distance_km,
            vehicle_id,
            &extras.selected,
            &extras.quantities,
            route_fields.round_trip,
            &self.currency,
        )?;
        let total_cents = (pricing.total * 100.0).round() as i64;

        let Some(method) = state.fields.payment.method.clone() else {
            let mut errors = ValidationErrors::default();
            errors.push("payment.method", "Select a payment method");
            return Err(BookingError::Validation(errors));
        };

        let booking_reference = generate_booking_reference(state.booking_type);

        // Payment first. A failed payment must never leave a booking
        // behind, so persistence only happens after this point.
        let (payment_status, status, transaction_id) = match &method {
            PaymentMethod::Cash => (PaymentStatus::Pending, BookingStatus::Pending, None),
            PaymentMethod::Card {
                payment_method_id,
                customer_id,
            } => {
                let authorization = self
                    .gateway
                    .preauthorize(
                        total_cents,
                        &self.currency,
                        payment_method_id,
                        customer_id.as_deref(),
                    )
                    .await?;
                let capture = self.gateway.capture(&authorization.id).await?;
                (
                    PaymentStatus::Paid,
                    BookingStatus::Confirmed,
                    Some(capture.id),
                )
            }
            PaymentMethod::Wallet { account_id } => {
                self.ledger
                    .reserve_and_debit(account_id, total_cents, &booking_reference)
                    .await?;
                (
                    PaymentStatus::Paid,
                    BookingStatus::Confirmed,
                    Some(format!("wallet:{}", account_id)),
                )
            }
        };

        let vehicle = self.catalog.vehicle(vehicle_id).ok_or_else(|| {
            crate::errors::ConfigurationError {
                kind: "vehicle",
                id: vehicle_id.to_string(),
            }
        })?;

        let now = DateTime::now();
        let flight = if state.fields.flight.flight_number.trim().is_empty() {
            None
        } else {
            Some(FlightDetails {
                flight_number: state.fields.flight.flight_number.clone(),
                airline: state.fields.flight.airline.clone(),
                arrival_time: state.fields.flight.arrival_time.clone(),
            })
        };

        let booking = TransferBooking {
            id: None,
            booking_reference: booking_reference.clone(),
            booking_type: state.booking_type,
            route: RouteSnapshot {
                origin: origin.clone(),
                destination: destination.clone(),
                distance_km: estimate.distance_km,
                duration_minutes: estimate.duration_minutes,
                degraded: estimate.degraded,
            },
            round_trip: route_fields.round_trip,
            pickup_date: route_fields.pickup_date.clone(),
            pickup_time: route_fields.pickup_time.clone(),
            return_date: route_fields.return_date.clone(),
            return_time: route_fields.return_time.clone(),
            adults: route_fields.adults,
            children: route_fields.children,
            infants: route_fields.infants,
            flight,
            vehicle_id: vehicle.id.clone(),
            vehicle_name: vehicle.name.clone(),
            extras: extras.selected.clone(),
            child_seats: extras.child_seats(),
            customer: CustomerInfo {
                first_name: state.fields.customer.first_name.clone(),
                last_name: state.fields.customer.last_name.clone(),
                email: state.fields.customer.email.clone(),
                phone: state.fields.customer.phone.clone(),
                country: state.fields.customer.country.clone(),
            },
            special_requests: state.fields.customer.special_requests.clone(),
            pricing,
            payment_method: method.name().to_string(),
            payment_status,
            transaction_id: transaction_id.clone(),
            status,
            status_notes: None,
            assigned_driver_id: None,
            assigned_driver_name: None,
            driver_phone: None,
            assigned_vehicle_id: None,
            created_at: Some(now),
            updated_at: Some(now),
        };

        match self.store.insert_booking(&booking).await {
            Ok(stored) => Ok(stored),
            Err(err) if payment_status == PaymentStatus::Paid => {
                // Money moved but the record did not: the one failure that
                // cannot be retried blindly. Reported distinctly so the
                // operational channel can reconcile by hand.
                let payment_ref = transaction_id.unwrap_or_else(|| booking_reference.clone());
                log::error!(
                    "RECONCILIATION REQUIRED: payment {} captured for booking {} but persistence failed: {}",
                    payment_ref,
                    booking_reference,
                    err
                );
                Err(PersistenceError::ReconciliationRequired {
                    payment_ref,
                    detail: err.to_string(),
                }
                .into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Booking references look like `AT<millis base36><4 random>`, matching the
/// confirmation emails and the admin dashboard search box.
pub fn generate_booking_reference(booking_type: BookingType) -> String {
    let prefix = match booking_type {
        BookingType::AirportTransfer => "AT",
        BookingType::PrivateTour => "PT",
        BookingType::CustomItinerary => "CI",
    };

    let timestamp = to_base36(chrono::Utc::now().timestamp_millis().max(0) as u64);
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();

    format!("{}{}{}", prefix, timestamp, suffix)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}
