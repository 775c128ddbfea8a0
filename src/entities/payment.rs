//! Payment entity - one row per amount posted in the payment group.
//!
//! Payments are immutable once created: the ingestion path inserts them for
//! privileged senders and nothing ever updates them afterwards. The `date`
//! column carries the business date (operating-timezone calendar date) fixed at
//! insert time, so daily aggregates never shift when the wall clock crosses
//! midnight UTC.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment, store-assigned and monotonic
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Username of the payer (the privileged sender of the message)
    pub username: String,
    /// Monetary amount, currency-implicit
    pub amount: f64,
    /// When the payment was recorded
    pub timestamp: DateTimeUtc,
    /// Business date (`YYYY-MM-DD`) in the operating timezone, fixed at insert
    pub date: String,
}

/// Payments reference no other tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
