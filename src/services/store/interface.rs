use async_trait::async_trait;

use crate::errors::{BookingError, PersistenceError};
use crate::models::booking::{BookingStatus, DriverAssignment, TransferBooking};
use crate::models::vehicle::VehiclePricingOverride;
use crate::models::wallet::WalletAccount;

/// The persistence collaborator for bookings and catalog configuration.
/// One abstraction: everything goes through this seam (or `WalletLedger`),
/// never through ad-hoc database calls in handlers.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Single create call; returns the record with its generated id.
    async fn insert_booking(
        &self,
        booking: &TransferBooking,
    ) -> Result<TransferBooking, PersistenceError>;

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TransferBooking>, PersistenceError>;

    async fn find_by_email(&self, email: &str) -> Result<Vec<TransferBooking>, PersistenceError>;

    async fn list(
        &self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<TransferBooking>, PersistenceError>;

    /// Returns false when no booking matched the id.
    async fn update_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
        notes: Option<String>,
    ) -> Result<bool, PersistenceError>;

    async fn assign_driver(
        &self,
        booking_id: &str,
        assignment: &DriverAssignment,
    ) -> Result<bool, PersistenceError>;

    async fn upsert_vehicle_pricing(
        &self,
        pricing: &VehiclePricingOverride,
    ) -> Result<(), PersistenceError>;
}

/// Wallet balances and their audit trail.
#[async_trait]
pub trait WalletLedger: Send + Sync {
    async fn account(&self, account_id: &str) -> Result<Option<WalletAccount>, PersistenceError>;

    /// Credit the account, creating it if needed.
    async fn credit(
        &self,
        account_id: &str,
        amount_cents: i64,
        reference: &str,
    ) -> Result<WalletAccount, PersistenceError>;

    /// Check balance and debit as ONE atomic operation. A check-then-debit
    /// pair would race when two bookings fire concurrently; the conditional
    /// update cannot.
    async fn reserve_and_debit(
        &self,
        account_id: &str,
        amount_cents: i64,
        reference: &str,
    ) -> Result<WalletAccount, BookingError>;
}
