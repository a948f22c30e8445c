use serde::Serialize;
use thiserror::Error;

/// A single field-level problem, surfaced inline next to the offending
/// input. Never fatal: the wizard keeps its state and blocks advancement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn extend(&mut self, other: Vec<FieldError>) {
        self.errors.extend(other);
    }
}

/// An unknown vehicle or extra id reached the pricing layer. This is a data
/// or deployment bug, not user error, and is surfaced generically.
#[derive(Debug, Clone, Error)]
#[error("unknown {kind} id: {id}")]
pub struct ConfigurationError {
    pub kind: &'static str,
    pub id: String,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment declined: {reason}")]
    Declined { reason: String },
    #[error("payment gateway unreachable: {0}")]
    GatewayUnreachable(String),
    #[error("insufficient wallet funds: balance {balance_cents} < {amount_cents}")]
    InsufficientFunds {
        balance_cents: i64,
        amount_cents: i64,
    },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(String),
    /// Payment was captured but the booking never made it to storage. The
    /// money and the record now disagree, so this case is kept distinct for
    /// the operational channel instead of folding into a generic error.
    #[error("reconciliation required: payment {payment_ref} captured but booking not recorded ({detail})")]
    ReconciliationRequired { payment_ref: String, detail: String },
}

impl From<mongodb::error::Error> for PersistenceError {
    fn from(err: mongodb::error::Error) -> Self {
        PersistenceError::Database(err.to_string())
    }
}

/// A route or flight lookup that failed open. Logged, never surfaced as a
/// hard error to the caller.
#[derive(Debug, Clone, Error)]
#[error("lookup degraded, falling back: {reason}")]
pub struct LookupDegraded {
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("a submission for this session is already in progress")]
    SubmissionInFlight,
}
