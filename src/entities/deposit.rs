//! Deposit entity - at most one row per source chat message.
//!
//! A row is created with status `pending` when a deposit notice is first seen
//! and only ever updated in place by approve/reject actions. `source_message_id`
//! is UNIQUE, which is what guarantees exactly-once crediting: the daily total
//! sums by status over single rows, never by action count. The amount and the
//! business date are fixed at first write and survive any later status toggles.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval state of a deposit notice.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    /// Notice seen, no privileged action taken yet. Never counted in totals.
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Credited to the daily deposit total.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Explicitly declined; excluded from totals but kept for audit.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl DepositStatus {
    /// Lowercase wire/display form, matching the stored string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Deposit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deposits")]
pub struct Model {
    /// Unique identifier for the deposit record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the originating chat message; the approval key
    #[sea_orm(unique)]
    pub source_message_id: i64,
    /// Monetary amount, fixed at first sighting and never re-parsed
    pub amount: f64,
    /// Current approval state
    pub status: DepositStatus,
    /// Username of the privileged actor who last changed the status
    pub acted_by: Option<String>,
    /// Updated on every status change
    pub timestamp: DateTimeUtc,
    /// Business date fixed at first creation, not recomputed on later actions
    pub date: String,
}

/// Deposits reference no other tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
