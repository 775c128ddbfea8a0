//! Admin entity - the privilege registry.
//!
//! Membership in this table is what grants the right to mutate ledger state.
//! The notify address is captured lazily the first time the user interacts in a
//! context that reveals it (a private chat) and is only used by the daily
//! summary fan-out.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Admin database model, keyed by lowercased username
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    /// Lowercased chat username
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    /// Where the daily summary is delivered; `None` until first observed
    pub notify_address: Option<String>,
}

/// Admins reference no other tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
