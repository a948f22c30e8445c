use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::errors::{BookingError, PaymentError, PersistenceError};
use crate::models::booking::{BookingStatus, DriverAssignment, TransferBooking};
use crate::models::vehicle::VehiclePricingOverride;
use crate::models::wallet::{LedgerEntry, LedgerEntryKind, WalletAccount};
use crate::services::store::interface::{BookingStore, WalletLedger};

pub struct MongoBookingStore {
    client: Arc<Client>,
}

impl MongoBookingStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn bookings(&self) -> Collection<TransferBooking> {
        self.client.database("Transfers").collection("Bookings")
    }

    fn vehicle_pricing(&self) -> Collection<VehiclePricingOverride> {
        self.client.database("Transfers").collection("VehiclePricing")
    }

    fn parse_booking_id(booking_id: &str) -> Result<ObjectId, PersistenceError> {
        ObjectId::parse_str(booking_id)
            .map_err(|_| PersistenceError::Database(format!("Invalid booking id: {}", booking_id)))
    }
}

#[async_trait]
impl BookingStore for MongoBookingStore {
    async fn insert_booking(
        &self,
        booking: &TransferBooking,
    ) -> Result<TransferBooking, PersistenceError> {
        let result = self.bookings().insert_one(booking).await?;

        let mut stored = booking.clone();
        stored.id = result.inserted_id.as_object_id();
        Ok(stored)
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TransferBooking>, PersistenceError> {
        let filter = doc! { "booking_reference": reference };
        Ok(self.bookings().find_one(filter).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<TransferBooking>, PersistenceError> {
        let filter = doc! { "customer.email": email };
        let cursor = self.bookings().find(filter).sort(doc! { "created_at": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list(
        &self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<TransferBooking>, PersistenceError> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };
        let cursor = self.bookings().find(filter).sort(doc! { "created_at": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
        notes: Option<String>,
    ) -> Result<bool, PersistenceError> {
        let filter = doc! { "_id": Self::parse_booking_id(booking_id)? };
        let update = doc! {
            "$set": {
                "status": status.as_str(),
                "status_notes": notes.unwrap_or_default(),
                "updated_at": DateTime::now(),
            }
        };

        let result = self.bookings().update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn assign_driver(
        &self,
        booking_id: &str,
        assignment: &DriverAssignment,
    ) -> Result<bool, PersistenceError> {
        let filter = doc! { "_id": Self::parse_booking_id(booking_id)? };
        let update = doc! {
            "$set": {
                "assigned_driver_id": assignment.driver_id.as_str(),
                "assigned_driver_name": assignment.driver_name.as_str(),
                "driver_phone": assignment.driver_phone.as_str(),
                "assigned_vehicle_id": assignment.vehicle_id.as_str(),
                "status": BookingStatus::Assigned.as_str(),
                "updated_at": DateTime::now(),
            }
        };

        let result = self.bookings().update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn upsert_vehicle_pricing(
        &self,
        pricing: &VehiclePricingOverride,
    ) -> Result<(), PersistenceError> {
        let filter = doc! { "vehicle_id": pricing.vehicle_id.as_str() };
        let update = doc! {
            "$set": {
                "vehicle_id": pricing.vehicle_id.as_str(),
                "base_price": pricing.base_price,
                "per_km_rate": pricing.per_km_rate,
                "updated_at": DateTime::now(),
            }
        };

        self.vehicle_pricing()
            .update_one(filter, update)
            .upsert(true)
            .await?;
        Ok(())
    }
}

pub struct MongoWalletLedger {
    client: Arc<Client>,
}

impl MongoWalletLedger {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn accounts(&self) -> Collection<WalletAccount> {
        self.client.database("Wallet").collection("Accounts")
    }

    fn ledger(&self) -> Collection<LedgerEntry> {
        self.client.database("Wallet").collection("Ledger")
    }

    async fn record_entry(
        &self,
        account_id: &str,
        amount_cents: i64,
        kind: LedgerEntryKind,
        reference: &str,
    ) {
        let entry = LedgerEntry {
            id: None,
            account_id: account_id.to_string(),
            amount_cents,
            kind,
            reference: reference.to_string(),
            created_at: Some(DateTime::now()),
        };

        // The balance update has already landed; a failed audit entry is
        // logged for manual follow-up rather than unwinding the movement.
        if let Err(e) = self.ledger().insert_one(&entry).await {
            log::error!(
                "Ledger entry not recorded for {} ({} cents, ref {}): {}",
                account_id,
                amount_cents,
                reference,
                e
            );
        }
    }
}

#[async_trait]
impl WalletLedger for MongoWalletLedger {
    async fn account(&self, account_id: &str) -> Result<Option<WalletAccount>, PersistenceError> {
        let filter = doc! { "account_id": account_id };
        Ok(self.accounts().find_one(filter).await?)
    }

    async fn credit(
        &self,
        account_id: &str,
        amount_cents: i64,
        reference: &str,
    ) -> Result<WalletAccount, PersistenceError> {
        let filter = doc! { "account_id": account_id };
        let update = doc! {
            "$inc": { "balance_cents": amount_cents },
            "$set": { "updated_at": DateTime::now() },
            "$setOnInsert": {
                "account_id": account_id,
                "currency": "USD",
                "created_at": DateTime::now(),
            },
        };

        let account = self
            .accounts()
            .find_one_and_update(filter, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| {
                PersistenceError::Database(format!("Wallet upsert returned nothing for {}", account_id))
            })?;

        self.record_entry(account_id, amount_cents, LedgerEntryKind::Recharge, reference)
            .await;
        Ok(account)
    }

    async fn reserve_and_debit(
        &self,
        account_id: &str,
        amount_cents: i64,
        reference: &str,
    ) -> Result<WalletAccount, BookingError> {
        // The balance check and the debit are one conditional update, so
        // two concurrent bookings can never both spend the same funds.
        let filter = doc! {
            "account_id": account_id,
            "balance_cents": { "$gte": amount_cents },
        };
        let update = doc! {
            "$inc": { "balance_cents": -amount_cents },
            "$set": { "updated_at": DateTime::now() },
        };

        let updated = self
            .accounts()
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(PersistenceError::from)?;

        match updated {
            Some(account) => {
                self.record_entry(account_id, -amount_cents, LedgerEntryKind::Debit, reference)
                    .await;
                Ok(account)
            }
            None => match self.account(account_id).await? {
                Some(account) => Err(PaymentError::InsufficientFunds {
                    balance_cents: account.balance_cents,
                    amount_cents,
                }
                .into()),
                None => Err(PersistenceError::Database(format!(
                    "Wallet account not found: {}",
                    account_id
                ))
                .into()),
            },
        }
    }
}
