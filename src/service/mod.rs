//! Transport-facing layer.
//!
//! The chat transport adapter is an external collaborator: it delivers inbound
//! events (plain messages, button presses, parsed commands) as the plain
//! structs defined here and renders whatever this layer returns - reply text,
//! button descriptors, alert answers. Nothing in this module knows which chat
//! network is on the other side.

/// Button-action path and the action-token codec
pub mod actions;
/// Command entry points
pub mod commands;
/// Message-ingestion path for the two source groups
pub mod ingest;

use crate::config::Settings;
use crate::core::ledger::{self, ApiResponse, DashboardSnapshot};
use crate::errors::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub use actions::{ActionButtons, ActionToken, ButtonFeedback, ButtonSpec};

/// Shared context for all inbound handling: the store connection and the
/// application settings, injected once at startup.
pub struct ChatService {
    db: DatabaseConnection,
    settings: Arc<Settings>,
}

impl ChatService {
    /// Creates the service context.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: Arc<Settings>) -> Self {
        Self { db, settings }
    }

    /// The store connection, for adapters that need direct aggregate reads.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The loaded application settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read-only aggregate snapshot for the presentation adapter.
    pub async fn snapshot(&self) -> Result<DashboardSnapshot> {
        ledger::dashboard_snapshot(&self.db, &self.settings).await
    }

    /// Snapshot wrapped in the `{success, error}` envelope; store failures are
    /// folded into the envelope instead of escaping to the adapter.
    pub async fn snapshot_response(&self) -> ApiResponse {
        match self.snapshot().await {
            Ok(snapshot) => ApiResponse::ok(snapshot),
            Err(e) => ApiResponse::failure(e.to_string()),
        }
    }
}

/// A plain message (text or caption) delivered by the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Sender's chat username, when they have one
    pub sender_username: Option<String>,
    /// Transport-level sender identifier
    pub sender_id: i64,
    /// Which chat group the message arrived in
    pub chat_id: i64,
    /// Message text, or the caption for media messages
    pub text: String,
    /// The message's own identifier; the deposit approval key
    pub message_id: i64,
}

/// A button press delivered by the transport.
#[derive(Debug, Clone)]
pub struct ButtonPress {
    /// Pressing user's chat username
    pub actor_username: Option<String>,
    /// Transport-level identifier of the pressing user
    pub actor_id: i64,
    /// The raw action token attached to the pressed button
    pub token: String,
}

/// Who invoked a command, and where a summary could reach them.
#[derive(Debug, Clone, Default)]
pub struct Actor {
    /// Chat username, when set
    pub username: Option<String>,
    /// Private-chat address, when the command arrived in a context that
    /// reveals one; captured opportunistically for privileged users
    pub notify_address: Option<String>,
}

impl Actor {
    /// Convenience constructor for a username-only actor.
    #[must_use]
    pub fn named(username: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            notify_address: None,
        }
    }
}

/// What the transport should send back for an inbound message.
#[derive(Debug, Clone)]
pub struct MessageReply {
    /// Reply text, plain or lightly marked up
    pub text: String,
    /// Approve/reject buttons to attach, for deposit notices
    pub buttons: Option<ActionButtons>,
}
