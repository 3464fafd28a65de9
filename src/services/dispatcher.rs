use sqlx::PgPool;

use crate::configuration::ChatSettings;
use crate::db;
use crate::errors::ChatError;
use crate::models;

// Notification previews are cosmetic; the stored message is never truncated.
const PREVIEW_LIMIT: usize = 140;

/// MessageDispatcher - validates membership, persists the message, bumps
/// conversation recency and fans notifications out to the other
/// participants.
///
/// Message durability is the primary guarantee: the message and the
/// recency bump commit together, the fan-out afterwards is best-effort.
pub struct MessageDispatcher<'a> {
    pg: &'a PgPool,
    notify_sender: bool,
}

impl<'a> MessageDispatcher<'a> {
    pub fn new(pg: &'a PgPool, settings: &ChatSettings) -> Self {
        Self {
            pg,
            notify_sender: settings.notify_sender,
        }
    }

    pub async fn send(
        &self,
        caller: &models::Account,
        conversation_id: i32,
        content: &str,
    ) -> Result<models::Message, ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::invalid("Message must not be empty."));
        }

        let participants = db::conversation::fetch_participants(self.pg, conversation_id).await?;
        if participants.is_empty() {
            return Err(ChatError::not_found("Conversation not found."));
        }
        if !participants.iter().any(|p| p.user_id == caller.id) {
            return Err(ChatError::forbidden(
                "You are not a participant of this conversation.",
            ));
        }

        let mut tx = self.pg.begin().await?;
        let message = db::message::insert(&mut *tx, conversation_id, caller, content).await?;
        db::conversation::touch_last_message(&mut *tx, conversation_id, message.created_at).await?;
        tx.commit().await?;

        self.fan_out(caller, &message, &participants).await;

        Ok(message)
    }

    /// One notification per recipient, plus an optional "message sent" row
    /// for the sender. Failures are logged and swallowed: the message is
    /// already durable and the feed is only a hint for the polling client.
    async fn fan_out(
        &self,
        sender: &models::Account,
        message: &models::Message,
        participants: &[models::Participant],
    ) {
        let preview = preview(&message.content);
        let link = conversation_link(message.conversation_id);

        for participant in participants {
            let is_sender = participant.user_id == sender.id;
            if is_sender && !self.notify_sender {
                continue;
            }

            let title = if is_sender {
                "Message sent".to_string()
            } else {
                format!("New message from {} {}", sender.first_name, sender.last_name)
            };

            let notification = db::notification::NewNotification {
                user_id: Some(participant.user_id),
                branch_id: participant.branch_id,
                kind: models::KIND_CHAT.to_string(),
                category: "message".to_string(),
                title,
                message: preview.clone(),
                link: link.clone(),
            };

            if let Err(err) = db::notification::insert(self.pg, notification).await {
                tracing::error!(
                    "Failed to create chat notification for user {}: {:?}",
                    participant.user_id,
                    err
                );
            }
        }
    }
}

pub fn conversation_link(conversation_id: i32) -> String {
    format!("/chat/conversations/{}", conversation_id)
}

/// Truncated notification body, char-boundary safe.
pub fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_LIMIT {
        return content.to_string();
    }

    let truncated: String = content.chars().take(PREVIEW_LIMIT).collect();
    format!("{truncated}...")
}
