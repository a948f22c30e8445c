use std::sync::Arc;

use crate::errors::{BookingError, PersistenceError, ValidationErrors};
use crate::models::wallet::WalletAccount;
use crate::services::payment::interface::PaymentGateway;
use crate::services::store::interface::WalletLedger;

/// Wallet recharge flow: charge the gateway, then credit the ledger. The
/// two calls are sequenced, never parallel, and a credit failure after a
/// successful charge is reported as a reconciliation case.
#[derive(Clone)]
pub struct WalletService {
    gateway: Arc<dyn PaymentGateway>,
    ledger: Arc<dyn WalletLedger>,
    currency: String,
}

impl WalletService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        ledger: Arc<dyn WalletLedger>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            ledger,
            currency: currency.into(),
        }
    }

    pub async fn balance(
        &self,
        account_id: &str,
    ) -> Result<Option<WalletAccount>, PersistenceError> {
        self.ledger.account(account_id).await
    }

    pub async fn recharge(
        &self,
        account_id: &str,
        amount_cents: i64,
        payment_method_id: &str,
        customer_id: Option<&str>,
    ) -> Result<WalletAccount, BookingError> {
        if amount_cents <= 0 {
            let mut errors = ValidationErrors::default();
            errors.push("amount_cents", "Recharge amount must be positive");
            return Err(BookingError::Validation(errors));
        }

        let capture = self
            .gateway
            .charge(amount_cents, &self.currency, payment_method_id, customer_id)
            .await?;

        match self.ledger.credit(account_id, amount_cents, &capture.id).await {
            Ok(account) => Ok(account),
            Err(err) => {
                log::error!(
                    "RECONCILIATION REQUIRED: recharge payment {} captured for wallet {} but credit failed: {}",
                    capture.id,
                    account_id,
                    err
                );
                Err(PersistenceError::ReconciliationRequired {
                    payment_ref: capture.id,
                    detail: err.to_string(),
                }
                .into())
            }
        }
    }
}
