//! Error types for planpay.

use thiserror::Error;

/// Result type alias for planpay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the payment core.
///
/// Every variant carries a stable machine-readable kind (see [`Error::kind`])
/// so callers can branch without parsing messages.
#[derive(Debug, Error)]
pub enum Error {
    /// Purchase parameters missing, malformed, or disagreeing with the catalog.
    #[error("Invalid purchase request: {0}")]
    Validation(String),

    /// The payment provider refused or failed to create an order.
    ///
    /// Nothing was persisted; the caller may retry order creation.
    #[error("Order creation failed: {0}")]
    OrderCreation(String),

    /// The client-supplied payment signature did not match the recomputed HMAC.
    #[error("Invalid payment signature")]
    InvalidSignature,

    /// A verification named an order this service never issued (or whose
    /// purchase intent has expired from the registry).
    #[error("Unknown order: {0}")]
    UnknownOrder(String),

    /// The authenticated subject does not resolve to a stored account.
    ///
    /// Post-authentication this indicates an upstream provisioning bug.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// A ledger write could not be completed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Missing or invalid bearer token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable kind for this error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::OrderCreation(_) => "order_creation_failed",
            Self::InvalidSignature => "invalid_signature",
            Self::UnknownOrder(_) => "unknown_order",
            Self::AccountNotFound(_) => "account_not_found",
            Self::Persistence(_) => "persistence_error",
            Self::Auth(_) => "auth_error",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }
}
