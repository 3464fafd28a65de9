use crate::configuration::Settings;
use crate::db;
use crate::errors::ChatError;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::dispatcher::conversation_link;
use crate::services::MessageDispatcher;
use crate::views;
use actix_web::{delete, get, post, web, Responder};
use serde::Serialize;
use serde_valid::Validate;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Serialize)]
struct MessagesPayload {
    messages: Vec<views::chat::MessageView>,
}

#[derive(Serialize)]
struct SentPayload {
    message: views::chat::MessageView,
}

async fn check_membership(
    pool: &PgPool,
    conversation_id: i32,
    user_id: i32,
) -> Result<models::Conversation, ChatError> {
    let conversation = db::conversation::fetch(pool, conversation_id)
        .await?
        .ok_or_else(|| ChatError::not_found("Conversation not found."))?;

    db::conversation::fetch_participant(pool, conversation.id, user_id)
        .await?
        .ok_or_else(|| ChatError::forbidden("You are not a participant of this conversation."))?;

    Ok(conversation)
}

/// GET /chat/conversations/{id}/messages
/// Full history, oldest first. Fetching advances the caller's read marker
/// and clears this conversation's chat notifications from the bell, so the
/// two unread mechanisms stay in step.
#[tracing::instrument(name = "Get messages.", skip_all)]
#[get("/conversations/{id}/messages")]
pub async fn list(
    user: web::ReqData<Arc<models::Account>>,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ChatError> {
    let conversation = check_membership(pg_pool.get_ref(), path.0, user.id).await?;

    let messages = db::message::fetch_ordered(pg_pool.get_ref(), conversation.id).await?;

    db::conversation::advance_last_read(pg_pool.get_ref(), conversation.id, user.id).await?;
    db::notification::mark_conversation_read(
        pg_pool.get_ref(),
        user.id,
        user.branch_id,
        &conversation_link(conversation.id),
    )
    .await?;

    Ok(JsonResponse::build()
        .set_payload(MessagesPayload { messages })
        .ok())
}

/// POST /chat/conversations/{id}/messages
#[tracing::instrument(name = "Send message.", skip_all)]
#[post("/conversations/{id}/messages")]
pub async fn send(
    user: web::ReqData<Arc<models::Account>>,
    path: web::Path<(i32,)>,
    form: web::Json<forms::SendMessage>,
    pg_pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> Result<impl Responder, ChatError> {
    form.validate()
        .map_err(|err| ChatError::InvalidArgument(err.to_string()))?;

    let message = MessageDispatcher::new(pg_pool.get_ref(), &settings.chat)
        .send(user.as_ref(), path.0, &form.message)
        .await?;

    let message = views::chat::MessageView::from_sent(message, user.as_ref());

    Ok(JsonResponse::build()
        .set_payload(SentPayload { message })
        .ok())
}

/// DELETE /chat/conversations/{id}/messages
/// Destructive, participant-only: clears the history but keeps the
/// conversation.
#[tracing::instrument(name = "Delete conversation history.", skip_all)]
#[delete("/conversations/{id}/messages")]
pub async fn delete(
    user: web::ReqData<Arc<models::Account>>,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ChatError> {
    let conversation = check_membership(pg_pool.get_ref(), path.0, user.id).await?;

    let removed = db::message::delete_all(pg_pool.get_ref(), conversation.id).await?;
    tracing::info!(
        "User {} cleared {} messages from conversation {}",
        user.id,
        removed,
        conversation.id
    );

    Ok(JsonResponse::<()>::build()
        .set_message("Conversation history deleted.")
        .ok())
}
