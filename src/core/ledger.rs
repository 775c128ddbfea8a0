//! Daily aggregates over both ledger tables.
//!
//! Every function here computes fresh from the store on each call - the
//! dashboard polls frequently and the numbers must never lag a just-committed
//! mutation, so there is deliberately no caching layer. Deposits only count
//! while their status is `approved`; pending and rejected rows are invisible to
//! every total.

use crate::config::Settings;
use crate::core::{clock, deposit as deposit_core, payment as payment_core};
use crate::entities::{Deposit, DepositStatus, Payment, deposit, payment};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;

/// The two kinds of ledger transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Direct entry from the payment group
    Payment,
    /// Approved entry from the deposit group
    Deposit,
}

impl TransactionKind {
    /// Display/wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Deposit => "deposit",
        }
    }

    /// Parses the user-typed kind argument of the delete command.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "payment" => Some(Self::Payment),
            "deposit" => Some(Self::Deposit),
            _ => None,
        }
    }
}

/// One merged entry of the recent-transaction view.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// Ledger id within its own table
    pub id: i64,
    /// Payer for payments, approving actor for deposits
    pub actor: String,
    /// Amount credited
    pub amount: f64,
    /// When the entry was recorded (last status change for deposits)
    pub timestamp: DateTime<Utc>,
    /// Which table the entry came from
    pub kind: TransactionKind,
}

/// Per-user aggregate used by the leaderboards.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct UserStat {
    /// The grouped username
    pub username: String,
    /// Number of transactions
    pub count: i64,
    /// Summed amount
    pub total: f64,
}

/// Sum of all payment amounts for the business date; `0.0` when none.
pub async fn total_payments(db: &DatabaseConnection, date: &str) -> Result<f64> {
    let total: Option<Option<f64>> = Payment::find()
        .select_only()
        .column_as(payment::Column::Amount.sum(), "total")
        .filter(payment::Column::Date.eq(date))
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or(0.0))
}

/// Sum of approved deposit amounts for the business date; `0.0` when none.
pub async fn total_approved_deposits(db: &DatabaseConnection, date: &str) -> Result<f64> {
    let total: Option<Option<f64>> = Deposit::find()
        .select_only()
        .column_as(deposit::Column::Amount.sum(), "total")
        .filter(deposit::Column::Date.eq(date))
        .filter(deposit::Column::Status.eq(DepositStatus::Approved))
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or(0.0))
}

/// Merges the date's payments and approved deposits into one view, newest
/// first, truncated to `limit`.
pub async fn recent_transactions(
    db: &DatabaseConnection,
    date: &str,
    limit: usize,
) -> Result<Vec<LedgerEntry>> {
    let payments = Payment::find()
        .filter(payment::Column::Date.eq(date))
        .order_by_desc(payment::Column::Timestamp)
        .all(db)
        .await?;
    let deposits = Deposit::find()
        .filter(deposit::Column::Date.eq(date))
        .filter(deposit::Column::Status.eq(DepositStatus::Approved))
        .order_by_desc(deposit::Column::Timestamp)
        .all(db)
        .await?;

    let mut entries: Vec<LedgerEntry> = payments
        .into_iter()
        .map(|p| LedgerEntry {
            id: p.id,
            actor: p.username,
            amount: p.amount,
            timestamp: p.timestamp,
            kind: TransactionKind::Payment,
        })
        .chain(deposits.into_iter().map(|d| LedgerEntry {
            id: d.id,
            actor: d.acted_by.unwrap_or_default(),
            amount: d.amount,
            timestamp: d.timestamp,
            kind: TransactionKind::Deposit,
        }))
        .collect();

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(limit);
    Ok(entries)
}

/// Payments grouped by payer and approved deposits grouped by approver, each
/// `(username, count, total)` sorted by total descending.
pub async fn user_leaderboard(
    db: &DatabaseConnection,
    date: &str,
) -> Result<(Vec<UserStat>, Vec<UserStat>)> {
    let mut payment_stats: Vec<UserStat> = Payment::find()
        .select_only()
        .column(payment::Column::Username)
        .column_as(payment::Column::Id.count(), "count")
        .column_as(payment::Column::Amount.sum(), "total")
        .filter(payment::Column::Date.eq(date))
        .group_by(payment::Column::Username)
        .into_model()
        .all(db)
        .await?;

    let mut deposit_stats: Vec<UserStat> = Deposit::find()
        .select_only()
        .column_as(deposit::Column::ActedBy, "username")
        .column_as(deposit::Column::Id.count(), "count")
        .column_as(deposit::Column::Amount.sum(), "total")
        .filter(deposit::Column::Date.eq(date))
        .filter(deposit::Column::Status.eq(DepositStatus::Approved))
        .filter(deposit::Column::ActedBy.is_not_null())
        .group_by(deposit::Column::ActedBy)
        .into_model()
        .all(db)
        .await?;

    payment_stats.sort_by(|a, b| b.total.total_cmp(&a.total));
    deposit_stats.sort_by(|a, b| b.total.total_cmp(&a.total));
    Ok((payment_stats, deposit_stats))
}

/// Deletes a transaction of the given kind by its ledger id. Returns whether a
/// row was removed; deleting again reports not-found via `false`.
pub async fn delete_transaction(
    db: &DatabaseConnection,
    id: i64,
    kind: TransactionKind,
) -> Result<bool> {
    match kind {
        TransactionKind::Payment => payment_core::delete_payment(db, id).await,
        TransactionKind::Deposit => deposit_core::delete_deposit(db, id).await,
    }
}

/// How many merged transactions the dashboard shows.
const SNAPSHOT_TRANSACTION_LIMIT: usize = 20;

/// One row of the dashboard's transaction list, with a pre-formatted local time.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    /// Ledger id within its own table
    pub id: i64,
    /// Payer or approving actor
    pub user: String,
    /// Amount credited
    pub amount: f64,
    /// Local wall-clock time, e.g. `04:15 PM`
    pub time: String,
    /// Which table the entry came from
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Read-only aggregate snapshot consumed by the presentation adapter.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Human-readable business date, e.g. `Saturday, August 30, 2025`
    pub date: String,
    /// Local wall-clock render time
    pub time: String,
    /// Today's payment total
    pub total_payments: f64,
    /// Today's approved-deposit total
    pub total_deposits: f64,
    /// Merged recent transactions, newest first
    pub transactions: Vec<TransactionView>,
    /// Payment leaderboard, by total descending
    pub payment_leaders: Vec<UserStat>,
    /// Deposit-approver leaderboard, by total descending
    pub deposit_leaders: Vec<UserStat>,
}

/// JSON envelope around the snapshot for the structured dashboard endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    /// Whether the snapshot was computed
    pub success: bool,
    /// Failure description when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The snapshot payload, flattened into the envelope
    #[serde(flatten)]
    pub data: Option<DashboardSnapshot>,
}

impl ApiResponse {
    /// Wraps a computed snapshot.
    #[must_use]
    pub const fn ok(snapshot: DashboardSnapshot) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(snapshot),
        }
    }

    /// Wraps a failure, e.g. when the store is unavailable.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            data: None,
        }
    }
}

/// Builds the full dashboard snapshot for the current business date.
pub async fn dashboard_snapshot(
    db: &DatabaseConnection,
    settings: &Settings,
) -> Result<DashboardSnapshot> {
    let tz = settings.timezone;
    let date = clock::business_date_string(tz);
    let now = clock::now_in(tz);

    let total_payments = total_payments(db, &date).await?;
    let total_deposits = total_approved_deposits(db, &date).await?;
    let entries = recent_transactions(db, &date, SNAPSHOT_TRANSACTION_LIMIT).await?;
    let (payment_leaders, deposit_leaders) = user_leaderboard(db, &date).await?;

    let transactions = entries
        .into_iter()
        .map(|e| TransactionView {
            id: e.id,
            user: e.actor,
            amount: e.amount,
            time: clock::format_local_time(e.timestamp, tz),
            kind: e.kind,
        })
        .collect();

    Ok(DashboardSnapshot {
        date: now.format("%A, %B %d, %Y").to_string(),
        time: now.format("%I:%M:%S %p").to_string(),
        total_payments,
        total_deposits,
        transactions,
        payment_leaders,
        deposit_leaders,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::deposit::DepositAction;
    use crate::test_utils::{TEST_TZ, setup_test_db, today};

    #[tokio::test]
    async fn test_totals_default_to_zero() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(total_payments(&db, &today()).await?, 0.0);
        assert_eq!(total_approved_deposits(&db, &today()).await?, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_total_sums_todays_entries() -> Result<()> {
        let db = setup_test_db().await?;
        payment_core::record_payment(&db, "alice", 45.0, TEST_TZ).await?;
        payment_core::record_payment(&db, "bob", 5.5, TEST_TZ).await?;
        assert_eq!(total_payments(&db, &today()).await?, 50.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_only_approved_deposits_count() -> Result<()> {
        let db = setup_test_db().await?;
        deposit_core::record_notice(&db, 1, 100.0, TEST_TZ).await?;
        deposit_core::apply_action(&db, 2, 40.0, DepositAction::Approve, "bob", TEST_TZ).await?;
        deposit_core::apply_action(&db, 3, 70.0, DepositAction::Reject, "bob", TEST_TZ).await?;

        // Pending (1) and rejected (3) are invisible.
        assert_eq!(total_approved_deposits(&db, &today()).await?, 40.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_rejecting_approved_deposit_removes_it_from_total() -> Result<()> {
        let db = setup_test_db().await?;
        deposit_core::apply_action(&db, 9, 120.0, DepositAction::Approve, "bob", TEST_TZ).await?;
        assert_eq!(total_approved_deposits(&db, &today()).await?, 120.0);

        deposit_core::apply_action(&db, 9, 120.0, DepositAction::Reject, "bob", TEST_TZ).await?;
        assert_eq!(total_approved_deposits(&db, &today()).await?, 0.0);

        // And the undo path restores it.
        deposit_core::apply_action(&db, 9, 120.0, DepositAction::Approve, "carol", TEST_TZ).await?;
        assert_eq!(total_approved_deposits(&db, &today()).await?, 120.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_recent_transactions_merge_sort_and_limit() -> Result<()> {
        let db = setup_test_db().await?;
        payment_core::record_payment(&db, "alice", 10.0, TEST_TZ).await?;
        deposit_core::apply_action(&db, 1, 20.0, DepositAction::Approve, "bob", TEST_TZ).await?;
        payment_core::record_payment(&db, "carol", 30.0, TEST_TZ).await?;

        let all = recent_transactions(&db, &today(), 100).await?;
        assert_eq!(all.len(), 3);
        // Newest first across both kinds.
        assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert_eq!(all[0].actor, "carol");
        assert_eq!(all[0].kind, TransactionKind::Payment);

        // Deposits display the approving actor.
        let deposit_entry = all
            .iter()
            .find(|e| e.kind == TransactionKind::Deposit)
            .unwrap();
        assert_eq!(deposit_entry.actor, "bob");

        let limited = recent_transactions(&db, &today(), 2).await?;
        assert_eq!(limited.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_totals_match_recent_transactions_sum() -> Result<()> {
        let db = setup_test_db().await?;
        payment_core::record_payment(&db, "alice", 45.0, TEST_TZ).await?;
        payment_core::record_payment(&db, "alice", 5.0, TEST_TZ).await?;
        deposit_core::apply_action(&db, 1, 120.0, DepositAction::Approve, "bob", TEST_TZ).await?;
        deposit_core::apply_action(&db, 2, 60.0, DepositAction::Approve, "bob", TEST_TZ).await?;
        deposit_core::apply_action(&db, 2, 60.0, DepositAction::Reject, "bob", TEST_TZ).await?;
        deposit_core::record_notice(&db, 3, 999.0, TEST_TZ).await?;

        let entries = recent_transactions(&db, &today(), usize::MAX).await?;
        let entry_sum: f64 = entries.iter().map(|e| e.amount).sum();
        let totals =
            total_payments(&db, &today()).await? + total_approved_deposits(&db, &today()).await?;
        assert_eq!(entry_sum, totals);
        assert_eq!(totals, 170.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_leaderboard_groups_and_sorts() -> Result<()> {
        let db = setup_test_db().await?;
        payment_core::record_payment(&db, "alice", 10.0, TEST_TZ).await?;
        payment_core::record_payment(&db, "alice", 15.0, TEST_TZ).await?;
        payment_core::record_payment(&db, "bob", 100.0, TEST_TZ).await?;
        deposit_core::apply_action(&db, 1, 80.0, DepositAction::Approve, "carol", TEST_TZ).await?;
        deposit_core::apply_action(&db, 2, 5.0, DepositAction::Approve, "dan", TEST_TZ).await?;

        let (payments, deposits) = user_leaderboard(&db, &today()).await?;

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].username, "bob");
        assert_eq!(payments[0].count, 1);
        assert_eq!(payments[0].total, 100.0);
        assert_eq!(payments[1].username, "alice");
        assert_eq!(payments[1].count, 2);
        assert_eq!(payments[1].total, 25.0);

        assert_eq!(deposits.len(), 2);
        assert_eq!(deposits[0].username, "carol");
        assert_eq!(deposits[1].username, "dan");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_removes_from_aggregates() -> Result<()> {
        let db = setup_test_db().await?;
        let p = payment_core::record_payment(&db, "alice", 45.0, TEST_TZ).await?;
        assert_eq!(total_payments(&db, &today()).await?, 45.0);

        assert!(delete_transaction(&db, p.id, TransactionKind::Payment).await?);
        assert_eq!(total_payments(&db, &today()).await?, 0.0);
        assert!(recent_transactions(&db, &today(), 10).await?.is_empty());

        // Second delete reports not-found.
        assert!(!delete_transaction(&db, p.id, TransactionKind::Payment).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_snapshot_matches_aggregates() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = crate::test_utils::test_settings();
        payment_core::record_payment(&db, "alice", 45.0, TEST_TZ).await?;
        deposit_core::apply_action(&db, 1, 120.0, DepositAction::Approve, "bob", TEST_TZ).await?;

        let snapshot = dashboard_snapshot(&db, &settings).await?;
        assert_eq!(snapshot.total_payments, 45.0);
        assert_eq!(snapshot.total_deposits, 120.0);
        assert_eq!(snapshot.transactions.len(), 2);
        assert_eq!(snapshot.payment_leaders.len(), 1);
        assert_eq!(snapshot.deposit_leaders.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_api_response_shapes() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = crate::test_utils::test_settings();
        payment_core::record_payment(&db, "alice", 45.0, TEST_TZ).await?;

        let ok = ApiResponse::ok(dashboard_snapshot(&db, &settings).await?);
        let value: serde_json::Value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("error").is_none());
        assert_eq!(value["total_payments"], 45.0);
        assert_eq!(value["transactions"][0]["type"], "payment");

        let failure = ApiResponse::failure("store unavailable");
        let value: serde_json::Value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "store unavailable");
        assert!(value.get("total_payments").is_none());
        Ok(())
    }

    #[test]
    fn test_transaction_kind_parse() {
        assert_eq!(TransactionKind::parse("payment"), Some(TransactionKind::Payment));
        assert_eq!(TransactionKind::parse("Deposit"), Some(TransactionKind::Deposit));
        assert_eq!(TransactionKind::parse("refund"), None);
    }
}
