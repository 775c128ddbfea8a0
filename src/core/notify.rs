//! Daily summary rendering, fan-out, and scheduling.
//!
//! Once per civil day, at the configured local wall-clock time, the day's
//! totals are read once and delivered independently to every admin with a known
//! notify address. One failed delivery never blocks the rest - failures are
//! logged and counted. The scheduler is a single tokio task with its own
//! start/stop lifecycle, decoupled from request handling; it shares nothing
//! with the rest of the system except the store.

use crate::config::Settings;
use crate::core::{admin, clock, ledger};
use crate::errors::Result;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Destination-agnostic delivery of a summary message. The chat transport
/// adapter implements this against its own send API.
pub trait SummarySink: Send + Sync {
    /// Delivers `message` to one recipient address.
    fn deliver(
        &self,
        address: &str,
        message: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Per-run delivery accounting, informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryReport {
    /// Recipients the summary reached
    pub sent: usize,
    /// Recipients whose delivery failed
    pub failed: usize,
    /// Privileged users with no known address yet; they get no retry, only the
    /// next day's run after they are next observed interacting
    pub missing_address: usize,
}

/// Renders the daily summary text.
#[must_use]
pub fn render_summary(
    date: &str,
    total_payments: f64,
    total_deposits: f64,
    currency: &str,
    dashboard_url: Option<&str>,
) -> String {
    let mut message = format!(
        "📋 *Daily Summary - {date}*\n\n\
         💰 Total Payments: {currency} {total_payments:.2}\n\
         📥 Total Deposits: {currency} {total_deposits:.2}"
    );
    if let Some(url) = dashboard_url {
        message.push_str(&format!("\n\n🔗 View Full Dashboard: {url}"));
    }
    message
}

/// Reads today's totals once, then fans the rendered summary out to every
/// admin with a known address. Per-recipient failures are isolated.
pub async fn send_daily_summary<S: SummarySink>(
    db: &DatabaseConnection,
    settings: &Settings,
    sink: &S,
) -> Result<SummaryReport> {
    let date = clock::business_date_string(settings.timezone);
    let total_payments = ledger::total_payments(db, &date).await?;
    let total_deposits = ledger::total_approved_deposits(db, &date).await?;
    let message = render_summary(
        &date,
        total_payments,
        total_deposits,
        &settings.currency,
        settings.dashboard_url.as_deref(),
    );

    // One-shot read before the fan-out begins; the store is not held across
    // deliveries.
    let admins = admin::list_admins(db).await?;

    let mut report = SummaryReport::default();
    for record in admins {
        match record.notify_address {
            Some(address) => match sink.deliver(&address, &message).await {
                Ok(()) => {
                    info!("Daily summary sent to @{}", record.username);
                    report.sent += 1;
                }
                Err(e) => {
                    warn!("Failed to send summary to @{}: {}", record.username, e);
                    report.failed += 1;
                }
            },
            None => report.missing_address += 1,
        }
    }

    info!(
        "Daily summary complete: {} sent, {} failed, {} without address",
        report.sent, report.failed, report.missing_address
    );
    Ok(report)
}

/// Time to sleep until the next `hour:minute` wall-clock occurrence after `now`
/// in `now`'s timezone. Skipped or ambiguous local times (DST transitions) roll
/// forward to the next day that maps cleanly.
#[must_use]
pub fn until_next_fire(now: DateTime<Tz>, hour: u32, minute: u32) -> Duration {
    let tz = now.timezone();
    let mut date = now.date_naive();
    for _ in 0..4 {
        if let Some(naive) = date.and_hms_opt(hour, minute, 0) {
            if let Some(fire) = tz.from_local_datetime(&naive).earliest() {
                if fire > now {
                    return (fire - now).to_std().unwrap_or(Duration::ZERO);
                }
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    // Unreachable for any valid configured time; fall back to a day.
    Duration::from_secs(24 * 60 * 60)
}

/// Handle to the running daily-summary task.
pub struct SummaryScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SummaryScheduler {
    /// Spawns the scheduler task. It sleeps until the configured local time,
    /// runs the fan-out, and repeats. Store errors are logged per run and never
    /// terminate the loop.
    #[must_use]
    pub fn start<S>(db: DatabaseConnection, settings: Arc<Settings>, sink: S) -> Self
    where
        S: SummarySink + 'static,
    {
        let (shutdown, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            info!(
                "Daily summary scheduler started: fires at {:02}:{:02} {}",
                settings.summary_hour, settings.summary_minute, settings.timezone
            );
            loop {
                let wait = until_next_fire(
                    clock::now_in(settings.timezone),
                    settings.summary_hour,
                    settings.summary_minute,
                );
                tokio::select! {
                    () = tokio::time::sleep(wait) => {
                        if let Err(e) = send_daily_summary(&db, &settings, &sink).await {
                            warn!("Daily summary run failed: {}", e);
                        }
                    }
                    _ = rx.changed() => break,
                }
            }
            info!("Daily summary scheduler stopped");
        });
        Self { shutdown, handle }
    }

    /// Signals the task to stop and waits for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
