/// Database connection and table creation
pub mod database;

/// Settings file loading and validation
pub mod settings;

pub use database::{create_connection, create_tables, get_database_url};
pub use settings::{Settings, load_settings};
