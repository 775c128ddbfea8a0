//! Privilege registry.
//!
//! Membership in the admin table is the entire privilege model: a member may
//! mutate ledger state and view aggregates, a non-member may not. Usernames are
//! normalized (leading `@` stripped, lowercased) before every lookup so checks
//! are case-insensitive. Grant and revoke no-ops are reported as outcomes, not
//! errors - the service layer turns them into informational replies.

use crate::entities::{Admin, admin};
use crate::errors::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{debug, info, instrument};

/// Result of a grant attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Username added to the registry
    Granted,
    /// Username was already a member; no mutation
    AlreadyPrivileged,
    /// Secret did not match the configured passcode; no mutation
    WrongPasscode,
    /// The requester is not privileged; no mutation
    RequesterNotPrivileged,
}

/// Result of a revoke attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// Username removed from the registry
    Revoked,
    /// Username was not a member; no mutation
    NotPrivileged,
    /// The requester is not privileged; no mutation
    RequesterNotPrivileged,
}

/// Canonical registry key for a username as typed in chat.
#[must_use]
pub fn normalize(username: &str) -> String {
    username.trim_start_matches('@').to_lowercase()
}

/// Ensures every bootstrap username is present in the registry.
///
/// Existing members keep their stored notify address; this only fills gaps, so
/// it is safe to run on every startup.
#[instrument(skip(db))]
pub async fn seed_admins(db: &DatabaseConnection, usernames: &[String]) -> Result<()> {
    for username in usernames {
        let key = normalize(username);
        if Admin::find_by_id(key.clone()).one(db).await?.is_none() {
            admin::ActiveModel {
                username: Set(key.clone()),
                notify_address: Set(None),
            }
            .insert(db)
            .await?;
            info!("Seeded bootstrap admin @{}", key);
        }
    }
    Ok(())
}

/// Case-insensitive membership test; absent or empty username is never privileged.
pub async fn is_privileged(db: &DatabaseConnection, username: Option<&str>) -> Result<bool> {
    let Some(name) = username else {
        return Ok(false);
    };
    if name.is_empty() {
        return Ok(false);
    }
    Ok(Admin::find_by_id(normalize(name)).one(db).await?.is_some())
}

/// Adds `username` to the registry if the requester is privileged and the
/// secret matches the configured passcode.
#[instrument(skip(db, secret, expected_secret))]
pub async fn grant(
    db: &DatabaseConnection,
    username: &str,
    requester: Option<&str>,
    secret: &str,
    expected_secret: &str,
) -> Result<GrantOutcome> {
    if !is_privileged(db, requester).await? {
        debug!("Grant refused: requester {:?} not privileged", requester);
        return Ok(GrantOutcome::RequesterNotPrivileged);
    }
    if secret != expected_secret {
        debug!("Grant refused: wrong passcode from {:?}", requester);
        return Ok(GrantOutcome::WrongPasscode);
    }
    let key = normalize(username);
    if Admin::find_by_id(key.clone()).one(db).await?.is_some() {
        return Ok(GrantOutcome::AlreadyPrivileged);
    }
    admin::ActiveModel {
        username: Set(key.clone()),
        notify_address: Set(None),
    }
    .insert(db)
    .await?;
    info!("Granted privilege to @{} by {:?}", key, requester);
    Ok(GrantOutcome::Granted)
}

/// Removes `username` from the registry if the requester is privileged.
#[instrument(skip(db))]
pub async fn revoke(
    db: &DatabaseConnection,
    username: &str,
    requester: Option<&str>,
) -> Result<RevokeOutcome> {
    if !is_privileged(db, requester).await? {
        debug!("Revoke refused: requester {:?} not privileged", requester);
        return Ok(RevokeOutcome::RequesterNotPrivileged);
    }
    let key = normalize(username);
    let result = Admin::delete_by_id(key.clone()).exec(db).await?;
    if result.rows_affected > 0 {
        info!("Revoked privilege from @{} by {:?}", key, requester);
        Ok(RevokeOutcome::Revoked)
    } else {
        Ok(RevokeOutcome::NotPrivileged)
    }
}

/// Stores the notify address for a registry member.
///
/// Idempotent and opportunistic: called whenever a privileged user is observed
/// interacting in a context that reveals their address. Non-members are ignored
/// so a later grant does not inherit a stale address. Returns whether a write
/// happened.
pub async fn capture_address(
    db: &DatabaseConnection,
    username: &str,
    address: &str,
) -> Result<bool> {
    let key = normalize(username);
    match Admin::find_by_id(key.clone()).one(db).await? {
        Some(model) if model.notify_address.as_deref() == Some(address) => Ok(false),
        Some(model) => {
            let mut active: admin::ActiveModel = model.into();
            active.notify_address = Set(Some(address.to_string()));
            active.update(db).await?;
            info!("Captured notify address for @{}", key);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// All registry members, for listing and for the summary fan-out.
pub async fn list_admins(db: &DatabaseConnection) -> Result<Vec<admin::Model>> {
    Admin::find().all(db).await.map_err(Into::into)
}
