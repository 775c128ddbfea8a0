//! Shared helpers for unit tests.

use crate::config::{Settings, create_tables};
use crate::core::{admin, clock};
use crate::errors::Result;
use crate::service::ChatService;
use chrono_tz::Tz;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Timezone every test buckets its dates in.
pub const TEST_TZ: Tz = chrono_tz::Africa::Accra;

/// Initializes tracing for tests, once per process.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Fresh in-memory database with the full schema.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Today's business date under [`TEST_TZ`].
pub fn today() -> String {
    clock::business_date_string(TEST_TZ)
}

/// Settings with fixed chat ids, the "gann0r" bootstrap admin, and the "nova"
/// passcode.
pub fn test_settings() -> Settings {
    Settings {
        database_url: "sqlite::memory:".to_string(),
        payment_chat_id: -1001,
        deposit_chat_id: -1002,
        admin_passcode: "nova".to_string(),
        bootstrap_admins: vec!["gann0r".to_string()],
        currency: "GHS".to_string(),
        timezone: TEST_TZ,
        summary_hour: 20,
        summary_minute: 30,
        dashboard_url: Some("https://dash.example".to_string()),
    }
}

/// A ready service over a fresh database, with the bootstrap admins seeded the
/// way startup does it.
pub async fn seeded_service() -> Result<ChatService> {
    let db = setup_test_db().await?;
    let settings = test_settings();
    admin::seed_admins(&db, &settings.bootstrap_admins).await?;
    Ok(ChatService::new(db, Arc::new(settings)))
}
