//! Database connection and schema creation.
//!
//! Table creation uses SeaORM's `Schema::create_table_from_entity` so the
//! schema always matches the entity definitions without hand-written SQL. The
//! connection is the single serialization point for all ledger state; every
//! component receives it by reference and holds no cache of its own.

use crate::entities::{Admin, Deposit, Payment};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use sea_orm::sea_query::TableCreateStatement;

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/paydesk.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the `SQLite` database.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut payment_table: TableCreateStatement = schema.create_table_from_entity(Payment);
    let mut deposit_table: TableCreateStatement = schema.create_table_from_entity(Deposit);
    let mut admin_table: TableCreateStatement = schema.create_table_from_entity(Admin);

    db.execute(builder.build(payment_table.if_not_exists()))
        .await?;
    db.execute(builder.build(deposit_table.if_not_exists()))
        .await?;
    db.execute(builder.build(admin_table.if_not_exists())).await?;

    Ok(())
}
