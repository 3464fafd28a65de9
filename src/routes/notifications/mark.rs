use crate::db;
use crate::errors::ChatError;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{post, web, Responder};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct MarkAllQuery {
    #[serde(rename = "type", default)]
    pub filter: models::NotificationFilter,
}

/// POST /notifications/read_all?type=all|alerts|chat
/// One bulk upsert; safe to issue redundantly from a polling client.
#[tracing::instrument(name = "Mark all notifications read.", skip_all)]
#[post("/read_all")]
pub async fn read_all(
    user: web::ReqData<Arc<models::Account>>,
    query: web::Query<MarkAllQuery>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ChatError> {
    let marked =
        db::notification::mark_all_read(pg_pool.get_ref(), user.id, user.branch_id, query.filter)
            .await?;
    tracing::debug!("Marked {} notifications read for user {}", marked, user.id);

    Ok(JsonResponse::<()>::build().ok())
}

/// POST /notifications/{id}/read
/// Idempotent; only touches the caller's own read state.
#[tracing::instrument(name = "Mark notification read.", skip_all)]
#[post("/{id}/read")]
pub async fn read_one(
    user: web::ReqData<Arc<models::Account>>,
    path: web::Path<(i64,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ChatError> {
    let marked =
        db::notification::mark_read(pg_pool.get_ref(), path.0, user.id, user.branch_id).await?;

    if !marked {
        return Err(ChatError::not_found("Notification not found."));
    }

    Ok(JsonResponse::<()>::build().ok())
}
