//! Button-action path.
//!
//! Every deposit notice carries two buttons whose payloads are `ActionToken`s
//! in the fixed `action:message_id:amount` format. A press is authorized,
//! parsed, applied through the state machine, and answered with feedback plus
//! an updated button pair whose labels reflect the new status.

use crate::core::{admin, deposit};
use crate::core::deposit::{ActionOutcome, DepositAction};
use crate::entities::DepositStatus;
use crate::errors::{Error, Result};
use crate::service::{ButtonPress, ChatService};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Decoded button payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionToken {
    /// Approve or reject
    pub action: DepositAction,
    /// Source message the action targets
    pub message_id: i64,
    /// Amount carried in the payload; used only when the notice was never
    /// recorded, otherwise the stored first-write amount wins
    pub amount: f64,
}

impl ActionToken {
    /// Builds the token for one action against one notice.
    #[must_use]
    pub const fn new(action: DepositAction, message_id: i64, amount: f64) -> Self {
        Self {
            action,
            message_id,
            amount,
        }
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.action.as_str(),
            self.message_id,
            self.amount
        )
    }
}

impl FromStr for ActionToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::MalformedToken {
            token: s.to_string(),
        };
        let mut parts = s.splitn(3, ':');
        let action = match parts.next() {
            Some("approve") => DepositAction::Approve,
            Some("reject") => DepositAction::Reject,
            _ => return Err(malformed()),
        };
        let message_id = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        let amount = parts
            .next()
            .and_then(|p| p.parse::<f64>().ok())
            .filter(|a| a.is_finite() && *a >= 0.0)
            .ok_or_else(malformed)?;
        Ok(Self {
            action,
            message_id,
            amount,
        })
    }
}

/// One rendered button: a label and the token the transport must attach.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSpec {
    /// User-visible label
    pub label: String,
    /// Payload returned on press
    pub token: String,
}

/// The approve/reject button pair for a deposit notice.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionButtons {
    /// Approve button
    pub approve: ButtonSpec,
    /// Reject button
    pub reject: ButtonSpec,
}

impl ActionButtons {
    /// Renders the pair for a notice in the given status; the acted side's
    /// label switches to past tense.
    #[must_use]
    pub fn for_status(message_id: i64, amount: f64, status: DepositStatus) -> Self {
        let approve_label = if status == DepositStatus::Approved {
            "✅ Approved"
        } else {
            "✅ Approve"
        };
        let reject_label = if status == DepositStatus::Rejected {
            "❌ Rejected"
        } else {
            "❌ Reject"
        };
        Self {
            approve: ButtonSpec {
                label: approve_label.to_string(),
                token: ActionToken::new(DepositAction::Approve, message_id, amount).to_string(),
            },
            reject: ButtonSpec {
                label: reject_label.to_string(),
                token: ActionToken::new(DepositAction::Reject, message_id, amount).to_string(),
            },
        }
    }
}

/// What the transport should show the pressing user.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonFeedback {
    /// Short answer text
    pub answer: String,
    /// Whether the answer should interrupt (alert) rather than toast
    pub show_alert: bool,
    /// Replacement button pair when the status changed
    pub updated_buttons: Option<ActionButtons>,
}

impl ButtonFeedback {
    fn alert(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            show_alert: true,
            updated_buttons: None,
        }
    }
}

impl ChatService {
    /// Handles an approve/reject press end to end: privilege gate, token
    /// decode, state transition, feedback. Unauthorized and no-op outcomes are
    /// answered privately to the actor and cause no state change.
    pub async fn handle_button(&self, press: &ButtonPress) -> Result<ButtonFeedback> {
        let username = press.actor_username.as_deref();
        if !admin::is_privileged(&self.db, username).await? {
            warn!("Unauthorized button press by {:?}", username);
            return Ok(ButtonFeedback::alert(
                "❌ You are not authorized to perform this action.",
            ));
        }
        // Privileged implies a present username.
        let Some(actor) = username.map(admin::normalize) else {
            return Ok(ButtonFeedback::alert(
                "❌ You are not authorized to perform this action.",
            ));
        };

        let token: ActionToken = match press.token.parse() {
            Ok(token) => token,
            Err(e) => {
                warn!("Bad action token from @{}: {}", actor, e);
                return Ok(ButtonFeedback::alert("❌ Error processing request"));
            }
        };
        debug!(
            "Button press by @{}: {} message_id={} amount={}",
            actor,
            token.action.as_str(),
            token.message_id,
            token.amount
        );

        let outcome = deposit::apply_action(
            &self.db,
            token.message_id,
            token.amount,
            token.action,
            &actor,
            self.settings.timezone,
        )
        .await?;

        Ok(match outcome {
            ActionOutcome::Applied { status } => {
                let answer = if status == DepositStatus::Approved {
                    "✅ Deposit approved!"
                } else {
                    "❌ Deposit rejected!"
                };
                ButtonFeedback {
                    answer: answer.to_string(),
                    show_alert: false,
                    updated_buttons: Some(ActionButtons::for_status(
                        token.message_id,
                        token.amount,
                        status,
                    )),
                }
            }
            ActionOutcome::AlreadyInState { status, acted_by } => ButtonFeedback::alert(format!(
                "❌ Already {} by @{}",
                status.as_str(),
                acted_by.as_deref().unwrap_or("unknown")
            )),
        })
    }
}
