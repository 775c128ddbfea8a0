//! Unified error type for the crate.
//!
//! Only genuinely exceptional conditions live here. User-level outcomes such as
//! "already approved", "not privileged", or "transaction not found" are ordinary
//! values that the service layer resolves into reply strings - they never travel
//! as errors.

use thiserror::Error;

/// All failure modes that can escape a `paydesk` operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file missing, unreadable, or semantically invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what was wrong
        message: String,
    },

    /// The underlying store is unavailable or rejected an operation. Fatal for
    /// the triggering request only; ingestion and the scheduler log it per event.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Amount is NaN, infinite, or negative.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending value
        amount: f64,
    },

    /// A button action token did not match the `action:message_id:amount` format.
    #[error("Malformed action token: {token}")]
    MalformedToken {
        /// The raw token as received from the transport
        token: String,
    },

    /// Summary delivery to a single recipient failed. Counted per recipient by
    /// the notifier, never aborts the fan-out.
    #[error("Delivery to {recipient} failed: {message}")]
    Delivery {
        /// Notify address the delivery was attempted against
        recipient: String,
        /// Transport-reported reason
        message: String,
    },

    /// I/O error, e.g. while reading the configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
