//! Deposit approval state machine.
//!
//! Per-source-message state: `pending -> approved`, `pending -> rejected`, and
//! `approved <-> rejected` as the deliberate undo path. Repeating the action a
//! record is already in is a reported no-op, not a failure. The read and the
//! conditional write happen inside one database transaction, so the previous
//! status observed is the one the write is based on; if two conflicting actions
//! race, the last committed write wins by design.

use crate::core::clock;
use crate::entities::{Deposit, DepositStatus, deposit};
use crate::errors::{Error, Result};
use chrono::Utc;
use chrono_tz::Tz;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info, instrument};

/// The two button actions a privileged user can take on a deposit notice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepositAction {
    /// Credit the deposit to the daily total
    Approve,
    /// Exclude the deposit from the daily total
    Reject,
}

impl DepositAction {
    /// The status this action drives the record to.
    #[must_use]
    pub const fn target(self) -> DepositStatus {
        match self {
            Self::Approve => DepositStatus::Approved,
            Self::Reject => DepositStatus::Rejected,
        }
    }

    /// Wire form used in action tokens.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// What an approve/reject attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The record transitioned to `status`
    Applied {
        /// The new status
        status: DepositStatus,
    },
    /// The record was already in the requested state; nothing changed
    AlreadyInState {
        /// The unchanged status
        status: DepositStatus,
        /// Who put it there
        acted_by: Option<String>,
    },
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

async fn find_by_message<C: ConnectionTrait>(
    conn: &C,
    message_id: i64,
) -> Result<Option<deposit::Model>> {
    Deposit::find()
        .filter(deposit::Column::SourceMessageId.eq(message_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Records a deposit notice as `pending` if no record exists for the message.
///
/// The amount and the business date are fixed here, at first sighting, and are
/// never re-parsed on later status changes. Re-delivery of an already-recorded
/// notice returns the existing row untouched.
#[instrument(skip(db))]
pub async fn record_notice(
    db: &DatabaseConnection,
    message_id: i64,
    amount: f64,
    tz: Tz,
) -> Result<deposit::Model> {
    validate_amount(amount)?;
    let txn = db.begin().await?;
    if let Some(existing) = find_by_message(&txn, message_id).await? {
        txn.commit().await?;
        debug!("Deposit notice {} already recorded", message_id);
        return Ok(existing);
    }
    let inserted = deposit::ActiveModel {
        source_message_id: Set(message_id),
        amount: Set(amount),
        status: Set(DepositStatus::Pending),
        acted_by: Set(None),
        timestamp: Set(Utc::now()),
        date: Set(clock::business_date_string(tz)),
        ..Default::default()
    }
    .insert(&txn)
    .await;
    let model = match inserted {
        Ok(model) => model,
        // Lost a creation race with a concurrent delivery of the same notice;
        // the winner's row is the record.
        Err(e) if is_unique_violation(&e) => match find_by_message(&txn, message_id).await? {
            Some(existing) => {
                txn.commit().await?;
                debug!("Deposit notice {} recorded concurrently", message_id);
                return Ok(existing);
            }
            None => return Err(e.into()),
        },
        Err(e) => return Err(e.into()),
    };
    txn.commit().await?;
    info!(
        "Recorded pending deposit notice {}: amount={:.2}",
        message_id, amount
    );
    Ok(model)
}

/// Applies an approve/reject action against the record for `message_id`.
///
/// Read-check-write runs inside a single database transaction: the previous
/// status is read, the no-op case returns it unchanged, and the transition
/// otherwise updates the row in place with the acting user and a fresh
/// timestamp. A press on a message that was never recorded (the notice predates
/// the record, or was lost) creates the record directly in the target state,
/// using the amount carried in the action payload.
#[instrument(skip(db))]
pub async fn apply_action(
    db: &DatabaseConnection,
    message_id: i64,
    amount: f64,
    action: DepositAction,
    actor: &str,
    tz: Tz,
) -> Result<ActionOutcome> {
    validate_amount(amount)?;
    let target = action.target();
    let txn = db.begin().await?;

    // `None` after this block means the record was just created in the target
    // state; `Some` is a pre-existing row the transition rules apply to.
    let existing = match find_by_message(&txn, message_id).await? {
        Some(existing) => Some(existing),
        None => {
            let inserted = deposit::ActiveModel {
                source_message_id: Set(message_id),
                amount: Set(amount),
                status: Set(target),
                acted_by: Set(Some(actor.to_string())),
                timestamp: Set(Utc::now()),
                date: Set(clock::business_date_string(tz)),
                ..Default::default()
            }
            .insert(&txn)
            .await;
            match inserted {
                Ok(_) => None,
                // Lost a creation race with a concurrent first action; fall
                // through to the transition rules against the winner's row.
                Err(e) if is_unique_violation(&e) => {
                    match find_by_message(&txn, message_id).await? {
                        Some(existing) => Some(existing),
                        None => return Err(e.into()),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    let outcome = match existing {
        None => ActionOutcome::Applied { status: target },
        Some(existing) if existing.status == target => {
            debug!(
                "Deposit {} already {} by {:?}",
                message_id,
                target.as_str(),
                existing.acted_by
            );
            ActionOutcome::AlreadyInState {
                status: existing.status,
                acted_by: existing.acted_by,
            }
        }
        Some(existing) => {
            // Amount and business date stay fixed at first write.
            let mut active: deposit::ActiveModel = existing.into();
            active.status = Set(target);
            active.acted_by = Set(Some(actor.to_string()));
            active.timestamp = Set(Utc::now());
            active.update(&txn).await?;
            ActionOutcome::Applied { status: target }
        }
    };

    txn.commit().await?;
    if let ActionOutcome::Applied { status } = outcome {
        info!(
            "Deposit {} -> {} by @{}, amount={:.2}",
            message_id,
            status.as_str(),
            actor,
            amount
        );
    }
    Ok(outcome)
}

/// Current record for a source message, if any.
pub async fn get_by_message_id(
    db: &DatabaseConnection,
    message_id: i64,
) -> Result<Option<deposit::Model>> {
    find_by_message(db, message_id).await
}

/// Deletes a deposit record by ledger id. Returns whether a row was removed.
pub async fn delete_deposit(db: &DatabaseConnection, id: i64) -> Result<bool> {
    let result = Deposit::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_TZ, setup_test_db};

    #[tokio::test]
    async fn test_record_notice_creates_pending_once() -> Result<()> {
        let db = setup_test_db().await?;
        let first = record_notice(&db, 501, 120.0, TEST_TZ).await?;
        assert_eq!(first.status, DepositStatus::Pending);
        assert_eq!(first.acted_by, None);

        // Re-delivery changes nothing, including the amount.
        let again = record_notice(&db, 501, 999.0, TEST_TZ).await?;
        assert_eq!(again.id, first.id);
        assert_eq!(again.amount, 120.0);

        assert_eq!(Deposit::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_unseen_message_creates_single_approved_record() -> Result<()> {
        let db = setup_test_db().await?;
        let outcome = apply_action(&db, 501, 120.0, DepositAction::Approve, "bob", TEST_TZ).await?;
        assert_eq!(
            outcome,
            ActionOutcome::Applied {
                status: DepositStatus::Approved
            }
        );

        let record = get_by_message_id(&db, 501).await?.unwrap();
        assert_eq!(record.status, DepositStatus::Approved);
        assert_eq!(record.acted_by.as_deref(), Some("bob"));
        assert_eq!(record.amount, 120.0);
        assert_eq!(Deposit::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_repeat_approve_is_reported_noop() -> Result<()> {
        let db = setup_test_db().await?;
        apply_action(&db, 501, 120.0, DepositAction::Approve, "bob", TEST_TZ).await?;

        let outcome =
            apply_action(&db, 501, 120.0, DepositAction::Approve, "carol", TEST_TZ).await?;
        assert_eq!(
            outcome,
            ActionOutcome::AlreadyInState {
                status: DepositStatus::Approved,
                acted_by: Some("bob".to_string()),
            }
        );

        // Carol's attempt must not have touched the record.
        let record = get_by_message_id(&db, 501).await?.unwrap();
        assert_eq!(record.acted_by.as_deref(), Some("bob"));
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_then_reject_toggles() -> Result<()> {
        let db = setup_test_db().await?;
        apply_action(&db, 42, 50.0, DepositAction::Approve, "bob", TEST_TZ).await?;

        let outcome = apply_action(&db, 42, 50.0, DepositAction::Reject, "carol", TEST_TZ).await?;
        assert_eq!(
            outcome,
            ActionOutcome::Applied {
                status: DepositStatus::Rejected
            }
        );

        let record = get_by_message_id(&db, 42).await?.unwrap();
        assert_eq!(record.status, DepositStatus::Rejected);
        assert_eq!(record.acted_by.as_deref(), Some("carol"));
        // Still exactly one row for the message.
        assert_eq!(Deposit::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_amount_fixed_at_first_write_across_toggles() -> Result<()> {
        let db = setup_test_db().await?;
        record_notice(&db, 7, 120.0, TEST_TZ).await?;

        // Later actions carry a different amount in the payload; it is ignored.
        apply_action(&db, 7, 500.0, DepositAction::Approve, "bob", TEST_TZ).await?;
        apply_action(&db, 7, 500.0, DepositAction::Reject, "bob", TEST_TZ).await?;
        apply_action(&db, 7, 500.0, DepositAction::Approve, "bob", TEST_TZ).await?;

        let record = get_by_message_id(&db, 7).await?.unwrap();
        assert_eq!(record.amount, 120.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_business_date_fixed_at_creation() -> Result<()> {
        let db = setup_test_db().await?;
        let created = record_notice(&db, 9, 10.0, TEST_TZ).await?;
        apply_action(&db, 9, 10.0, DepositAction::Approve, "bob", TEST_TZ).await?;
        let after = get_by_message_id(&db, 9).await?.unwrap();
        assert_eq!(after.date, created.date);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_amounts_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            let result = record_notice(&db, 1, bad, TEST_TZ).await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_notices_never_surface_store_errors() -> Result<()> {
        let db = setup_test_db().await?;
        let (a, b) = tokio::join!(
            record_notice(&db, 501, 120.0, TEST_TZ),
            record_notice(&db, 501, 120.0, TEST_TZ),
        );
        let (a, b) = (a?, b?);
        assert_eq!(a.id, b.id);
        assert_eq!(Deposit::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_first_actions_yield_one_row_and_no_errors() -> Result<()> {
        let db = setup_test_db().await?;
        let (a, b) = tokio::join!(
            apply_action(&db, 501, 120.0, DepositAction::Approve, "bob", TEST_TZ),
            apply_action(&db, 501, 120.0, DepositAction::Approve, "carol", TEST_TZ),
        );
        // Both presses resolve to an outcome, never a store error.
        let (a, b) = (a?, b?);
        assert!(matches!(
            a,
            ActionOutcome::Applied { .. } | ActionOutcome::AlreadyInState { .. }
        ));
        assert!(matches!(
            b,
            ActionOutcome::Applied { .. } | ActionOutcome::AlreadyInState { .. }
        ));

        let rows = Deposit::find().all(&db).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DepositStatus::Approved);
        assert!(matches!(rows[0].acted_by.as_deref(), Some("bob" | "carol")));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_deposit_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let record = record_notice(&db, 11, 30.0, TEST_TZ).await?;
        assert!(delete_deposit(&db, record.id).await?);
        assert!(!delete_deposit(&db, record.id).await?);
        Ok(())
    }
}
