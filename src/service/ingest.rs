//! Message-ingestion path for the two source groups.
//!
//! Only two chats matter: the payment group, where amounts from privileged
//! senders become payment entries, and the deposit group, where any amount
//! becomes a pending deposit notice awaiting an approve/reject decision.
//! Everything else is ignored without a reply.

use crate::core::{admin, deposit, extract, payment};
use crate::entities::DepositStatus;
use crate::errors::Result;
use crate::service::{ActionButtons, ChatService, InboundMessage, MessageReply};
use tracing::{debug, info};

impl ChatService {
    /// Routes one inbound message. Returns the reply to send, or `None` when
    /// the message warrants no response at all.
    pub async fn handle_message(&self, msg: &InboundMessage) -> Result<Option<MessageReply>> {
        let Some(amount) = extract::extract_amount(&msg.text, &self.settings.currency) else {
            debug!("No amount in message {} from chat {}", msg.message_id, msg.chat_id);
            return Ok(None);
        };

        if msg.chat_id == self.settings.payment_chat_id {
            // Non-privileged senders are ignored silently, not refused.
            let username = msg.sender_username.as_deref();
            if !admin::is_privileged(&self.db, username).await? {
                info!(
                    "Ignoring payment-group amount from non-privileged sender {:?}",
                    username
                );
                return Ok(None);
            }
            let sender = admin::normalize(username.unwrap_or_default());
            let model =
                payment::record_payment(&self.db, &sender, amount, self.settings.timezone).await?;
            info!("Recorded payment {} from @{}", model.id, sender);
            return Ok(Some(MessageReply {
                text: "✅".to_string(),
                buttons: None,
            }));
        }

        if msg.chat_id == self.settings.deposit_chat_id {
            let record = deposit::record_notice(
                &self.db,
                msg.message_id,
                amount,
                self.settings.timezone,
            )
            .await?;
            info!(
                "Deposit notice {}: message_id={} amount={:.2} status={}",
                record.id,
                record.source_message_id,
                record.amount,
                record.status.as_str()
            );
            return Ok(Some(MessageReply {
                text: "Choose action:".to_string(),
                buttons: Some(ActionButtons::for_status(
                    msg.message_id,
                    record.amount,
                    DepositStatus::Pending,
                )),
            }));
        }

        debug!("Amount in unwatched chat {}, ignoring", msg.chat_id);
        Ok(None)
    }
}
