//! Payment entries.
//!
//! A payment is a single-row insert with no follow-up state: it is created by
//! the ingestion path when a privileged sender posts an amount in the payment
//! group, and the only mutation it ever sees is deletion by id.

use crate::core::clock;
use crate::entities::{Payment, payment};
use crate::errors::{Error, Result};
use chrono::Utc;
use chrono_tz::Tz;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{info, instrument};

/// Inserts a payment for `username`, stamped with the current business date.
#[instrument(skip(db))]
pub async fn record_payment(
    db: &DatabaseConnection,
    username: &str,
    amount: f64,
    tz: Tz,
) -> Result<payment::Model> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    let model = payment::ActiveModel {
        username: Set(username.to_string()),
        amount: Set(amount),
        timestamp: Set(Utc::now()),
        date: Set(clock::business_date_string(tz)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        "Created payment {} for @{}: amount={:.2}",
        model.id, username, amount
    );
    Ok(model)
}

/// Deletes a payment by ledger id. Returns whether a row was removed.
pub async fn delete_payment(db: &DatabaseConnection, id: i64) -> Result<bool> {
    let result = Payment::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
