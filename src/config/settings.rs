//! Application settings loaded from a TOML file.
//!
//! The settings file names the two source chat groups, the bootstrap admin set,
//! the shared admin passcode, and the operating timezone that buckets every
//! aggregate. A `.env` file is loaded via `dotenvy` before the environment is
//! consulted; `DATABASE_URL` overrides the file value when present.

use crate::errors::{Error, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::{fs, path::Path};

/// Top-level application settings.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// SQLite connection string
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Chat group whose messages become payment entries
    pub payment_chat_id: i64,
    /// Chat group whose messages become deposit approval candidates
    pub deposit_chat_id: i64,
    /// Shared secret required to grant privilege
    pub admin_passcode: String,
    /// Usernames seeded into the privilege registry at startup; must be non-empty
    pub bootstrap_admins: Vec<String>,
    /// Currency marker recognized by the amount extractor
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Fixed operating timezone used for business dates and the daily summary
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Local wall-clock hour (0-23) at which the daily summary fires
    #[serde(default = "default_summary_hour")]
    pub summary_hour: u32,
    /// Local wall-clock minute (0-59) at which the daily summary fires
    #[serde(default = "default_summary_minute")]
    pub summary_minute: u32,
    /// Optional dashboard link appended to stats replies and summaries
    #[serde(default)]
    pub dashboard_url: Option<String>,
}

fn default_database_url() -> String {
    "sqlite://data/paydesk.sqlite?mode=rwc".to_string()
}

fn default_currency() -> String {
    "GHS".to_string()
}

fn default_timezone() -> Tz {
    chrono_tz::Africa::Accra
}

const fn default_summary_hour() -> u32 {
    20
}

const fn default_summary_minute() -> u32 {
    30
}

impl Settings {
    /// Rejects settings a running system could not operate under.
    fn validate(&self) -> Result<()> {
        if self.bootstrap_admins.is_empty() {
            return Err(Error::Config {
                message: "bootstrap_admins must contain at least one username".to_string(),
            });
        }
        if self.admin_passcode.is_empty() {
            return Err(Error::Config {
                message: "admin_passcode must not be empty".to_string(),
            });
        }
        if self.summary_hour > 23 || self.summary_minute > 59 {
            return Err(Error::Config {
                message: format!(
                    "summary time {:02}:{:02} is not a valid wall-clock time",
                    self.summary_hour, self.summary_minute
                ),
            });
        }
        Ok(())
    }
}

/// Loads and validates settings from a TOML file, applying the `DATABASE_URL`
/// environment override when set.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    // Pull in a .env file if one exists so the override below sees it.
    dotenvy::dotenv().ok();
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {path_ref:?}: {e}"),
    })?;
    let mut settings: Settings = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse TOML from settings file {path_ref:?}: {e}"),
    })?;
    if let Ok(url) = std::env::var("DATABASE_URL") {
        settings.database_url = url;
    }
    settings.validate()?;
    Ok(settings)
}
