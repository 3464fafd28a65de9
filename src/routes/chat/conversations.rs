use crate::db;
use crate::errors::ChatError;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::ConversationResolver;
use crate::views;
use actix_web::{get, post, web, Responder};
use serde::Serialize;
use serde_valid::Validate;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Serialize)]
struct ConversationsPayload {
    conversations: Vec<views::chat::ConversationSummary>,
}

#[derive(Serialize)]
struct ConversationCreated {
    conversation_id: i32,
}

/// GET /chat/conversations
/// Conversation list for the logged-in user, newest activity first, with
/// per-conversation unread counts. Polled by the client.
#[tracing::instrument(name = "List conversations.", skip_all)]
#[get("/conversations")]
pub async fn list(
    user: web::ReqData<Arc<models::Account>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ChatError> {
    let conversations = db::conversation::summaries_for_user(pg_pool.get_ref(), user.id).await?;

    Ok(JsonResponse::build()
        .set_payload(ConversationsPayload { conversations })
        .ok())
}

/// POST /chat/conversations
/// Finds or creates the single conversation with the recipient.
#[tracing::instrument(name = "Find or create conversation.", skip_all)]
#[post("/conversations")]
pub async fn create(
    user: web::ReqData<Arc<models::Account>>,
    form: web::Json<forms::CreateConversation>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ChatError> {
    form.validate()
        .map_err(|err| ChatError::InvalidArgument(err.to_string()))?;

    let conversation_id = ConversationResolver::new(pg_pool.get_ref())
        .find_or_create(user.as_ref(), form.recipient_id)
        .await?;

    Ok(JsonResponse::build()
        .set_payload(ConversationCreated { conversation_id })
        .ok())
}
