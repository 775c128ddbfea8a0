//! Command entry points.
//!
//! Each method takes the invoking `Actor` and returns the reply text the
//! transport should send back. Privilege checks live here, not in the
//! transport: a non-privileged invoker of a gated command gets a refusal
//! string, never an error. Whenever a privileged actor interacts through a
//! context that reveals a private address, it is captured for the daily
//! summary fan-out.

use crate::core::admin::{self, GrantOutcome, RevokeOutcome};
use crate::core::{clock, ledger};
use crate::core::ledger::TransactionKind;
use crate::errors::Result;
use crate::service::{Actor, ChatService};
use std::fmt::Write as _;
use tracing::instrument;

/// Default entry count for the history command.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

impl ChatService {
    async fn is_actor_privileged(&self, actor: &Actor) -> Result<bool> {
        admin::is_privileged(&self.db, actor.username.as_deref()).await
    }

    /// Stores the actor's address when they are privileged and one is known.
    async fn touch(&self, actor: &Actor) -> Result<()> {
        if let (Some(username), Some(address)) = (&actor.username, &actor.notify_address) {
            if self.is_actor_privileged(actor).await? {
                admin::capture_address(&self.db, username, address).await?;
            }
        }
        Ok(())
    }

    /// Greeting with the command list. Also the moment a freshly granted
    /// admin's address becomes known.
    pub async fn start(&self, actor: &Actor) -> Result<String> {
        self.touch(actor).await?;
        Ok("👋 Hello! I track payments and deposits for your groups.\n\n\
            Commands:\n\
            /stats - View today's statistics\n\
            /history - View recent transactions\n\
            /userstats - View individual user statistics\n\
            /delete <id> <type> - Delete transaction\n\
            /addadmin <username> <passcode> - Add privileged user\n\
            /removeadmin <username> - Remove privileged user\n\
            /listadmins - List all privileged users"
            .to_string())
    }

    /// Today's totals. Open to anyone; the numbers are the same ones the
    /// public dashboard shows.
    #[instrument(skip(self, actor))]
    pub async fn show_stats(&self, actor: &Actor) -> Result<String> {
        self.touch(actor).await?;
        let date = clock::business_date_string(self.settings.timezone);
        let total_payments = ledger::total_payments(&self.db, &date).await?;
        let total_deposits = ledger::total_approved_deposits(&self.db, &date).await?;
        let currency = &self.settings.currency;
        let mut message = format!(
            "📊 *Today's Statistics*\n\n\
             💰 Total Payments: {currency} {total_payments:.2}\n\
             📥 Total Deposits: {currency} {total_deposits:.2}"
        );
        if let Some(url) = &self.settings.dashboard_url {
            let _ = write!(message, "\n\n🔗 Full Dashboard: {url}");
        }
        Ok(message)
    }

    /// Today's merged transactions, newest first, truncated to `limit`.
    /// Privileged only.
    #[instrument(skip(self, actor))]
    pub async fn show_history(&self, actor: &Actor, limit: usize) -> Result<String> {
        if !self.is_actor_privileged(actor).await? {
            return Ok("❌ You don't have permission to view history.".to_string());
        }
        self.touch(actor).await?;
        let date = clock::business_date_string(self.settings.timezone);
        let entries = ledger::recent_transactions(&self.db, &date, limit).await?;
        if entries.is_empty() {
            return Ok("📋 No transactions today.".to_string());
        }
        let currency = &self.settings.currency;
        let mut message = "📋 *Recent Transactions (Today)*\n\n".to_string();
        for entry in entries {
            let emoji = match entry.kind {
                TransactionKind::Payment => "💰",
                TransactionKind::Deposit => "📥",
            };
            let _ = write!(
                message,
                "{emoji} *{}* #{}\n   User: @{}\n   Amount: {currency} {:.2}\n   Time: {}\n\n",
                entry.kind.as_str().to_uppercase(),
                entry.id,
                entry.actor,
                entry.amount,
                clock::format_local_time(entry.timestamp, self.settings.timezone)
            );
        }
        if let Some(url) = &self.settings.dashboard_url {
            let _ = write!(message, "🔗 Full Dashboard: {url}");
        }
        Ok(message)
    }

    /// Per-user leaderboards for today. Privileged only.
    #[instrument(skip(self, actor))]
    pub async fn show_user_stats(&self, actor: &Actor) -> Result<String> {
        if !self.is_actor_privileged(actor).await? {
            return Ok("❌ You don't have permission to view statistics.".to_string());
        }
        self.touch(actor).await?;
        let date = clock::business_date_string(self.settings.timezone);
        let (payment_stats, deposit_stats) = ledger::user_leaderboard(&self.db, &date).await?;
        let currency = &self.settings.currency;

        let mut message = "📊 *User Statistics (Today)*\n\n".to_string();
        if !payment_stats.is_empty() {
            message.push_str("💰 *PAYMENTS*\n");
            for stat in &payment_stats {
                let _ = writeln!(
                    message,
                    "• @{}: {} transactions, {currency} {:.2}",
                    stat.username, stat.count, stat.total
                );
            }
            message.push('\n');
        }
        if !deposit_stats.is_empty() {
            message.push_str("📥 *DEPOSITS APPROVED*\n");
            for stat in &deposit_stats {
                let _ = writeln!(
                    message,
                    "• @{}: {} approvals, {currency} {:.2}",
                    stat.username, stat.count, stat.total
                );
            }
        }
        if payment_stats.is_empty() && deposit_stats.is_empty() {
            message.push_str("No activity today.");
        }
        Ok(message)
    }

    /// Deletes one transaction by id and kind, then reports the corrected
    /// totals. Privileged only.
    #[instrument(skip(self, actor))]
    pub async fn delete_transaction(
        &self,
        actor: &Actor,
        id: i64,
        kind: &str,
    ) -> Result<String> {
        self.touch(actor).await?;
        if !self.is_actor_privileged(actor).await? {
            return Ok("❌ You don't have permission to delete transactions.".to_string());
        }
        let Some(kind) = TransactionKind::parse(kind) else {
            return Ok("❌ Type must be 'payment' or 'deposit'".to_string());
        };
        let label = match kind {
            TransactionKind::Payment => "Payment",
            TransactionKind::Deposit => "Deposit",
        };
        if !ledger::delete_transaction(&self.db, id, kind).await? {
            return Ok(format!("❌ {label} #{id} not found."));
        }
        let date = clock::business_date_string(self.settings.timezone);
        let total_payments = ledger::total_payments(&self.db, &date).await?;
        let total_deposits = ledger::total_approved_deposits(&self.db, &date).await?;
        let currency = &self.settings.currency;
        Ok(format!(
            "✅ {label} #{id} deleted.\n\n\
             💰 Payment Total: {currency} {total_payments:.2}\n\
             📥 Deposit Total: {currency} {total_deposits:.2}"
        ))
    }

    /// Adds a privileged user, gated on membership plus the shared passcode.
    #[instrument(skip(self, actor, secret))]
    pub async fn grant_admin(&self, actor: &Actor, username: &str, secret: &str) -> Result<String> {
        self.touch(actor).await?;
        let outcome = admin::grant(
            &self.db,
            username,
            actor.username.as_deref(),
            secret,
            &self.settings.admin_passcode,
        )
        .await?;
        let key = admin::normalize(username);
        Ok(match outcome {
            GrantOutcome::Granted => format!(
                "✅ @{key} has been added as a privileged user.\n\n\
                 💡 They need to message me privately to receive daily summaries."
            ),
            GrantOutcome::AlreadyPrivileged => format!("⚠️ @{key} is already a privileged user."),
            GrantOutcome::WrongPasscode => "❌ Incorrect passcode!".to_string(),
            GrantOutcome::RequesterNotPrivileged => {
                "❌ You don't have permission to add admins.".to_string()
            }
        })
    }

    /// Removes a privileged user. Privileged only.
    #[instrument(skip(self, actor))]
    pub async fn revoke_admin(&self, actor: &Actor, username: &str) -> Result<String> {
        self.touch(actor).await?;
        let outcome = admin::revoke(&self.db, username, actor.username.as_deref()).await?;
        let key = admin::normalize(username);
        Ok(match outcome {
            RevokeOutcome::Revoked => format!("✅ @{key} has been removed."),
            RevokeOutcome::NotPrivileged => format!("⚠️ @{key} is not a privileged user."),
            RevokeOutcome::RequesterNotPrivileged => {
                "❌ You don't have permission to remove admins.".to_string()
            }
        })
    }

    /// Lists all privileged users. Privileged only.
    #[instrument(skip(self, actor))]
    pub async fn list_admins(&self, actor: &Actor) -> Result<String> {
        self.touch(actor).await?;
        if !self.is_actor_privileged(actor).await? {
            return Ok("❌ You don't have permission to view admins.".to_string());
        }
        let admins = admin::list_admins(&self.db).await?;
        if admins.is_empty() {
            return Ok("No privileged users found.".to_string());
        }
        let list = admins
            .iter()
            .map(|a| format!("• @{}", a.username))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(format!("👥 *Privileged Users:*\n\n{list}"))
    }
}
