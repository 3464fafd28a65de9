use sqlx::PgPool;

use crate::db;
use crate::errors::ChatError;
use crate::models;

/// ConversationResolver - idempotent pairing of two accounts.
///
/// Lookup is authoritative; creation races between two resolver calls for
/// the same pair land on the `conversation_pair_unique` constraint and are
/// resolved by retrying the lookup.
pub struct ConversationResolver<'a> {
    pg: &'a PgPool,
}

impl<'a> ConversationResolver<'a> {
    pub fn new(pg: &'a PgPool) -> Self {
        Self { pg }
    }

    pub async fn find_or_create(
        &self,
        caller: &models::Account,
        recipient_id: i32,
    ) -> Result<i32, ChatError> {
        if recipient_id == caller.id {
            return Err(ChatError::invalid(
                "Cannot start a conversation with yourself.",
            ));
        }

        let recipient = db::account::fetch(self.pg, recipient_id)
            .await?
            .ok_or_else(|| ChatError::not_found("Recipient not found."))?;

        if let Some(conversation) =
            db::conversation::fetch_by_pair(self.pg, caller.id, recipient.id).await?
        {
            return Ok(conversation.id);
        }

        match db::conversation::insert_with_participants(self.pg, caller, &recipient).await {
            Ok(conversation) => {
                tracing::info!(
                    "Created conversation {} for pair ({}, {})",
                    conversation.id,
                    caller.id,
                    recipient.id
                );
                Ok(conversation.id)
            }
            Err(err) if is_unique_violation(&err) => {
                // a concurrent resolver won the insert; its row is ours too
                db::conversation::fetch_by_pair(self.pg, caller.id, recipient.id)
                    .await?
                    .map(|conversation| conversation.id)
                    .ok_or_else(|| ChatError::Storage(sqlx::Error::RowNotFound))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
