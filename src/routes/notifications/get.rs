use crate::db;
use crate::errors::ChatError;
use crate::helpers::JsonResponse;
use crate::models;
use crate::views;
use actix_web::{get, web, Responder};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type", default)]
    pub filter: models::NotificationFilter,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
struct NotificationsPayload {
    notifications: Vec<views::notification::NotificationView>,
}

#[derive(Serialize)]
struct SummaryPayload {
    summary: views::notification::Summary,
}

/// GET /notifications/summary
/// Unread counts for the bell badge; polled every few seconds, so the
/// query must stay an indexed, idempotent read.
#[tracing::instrument(name = "Notification summary.", skip_all)]
#[get("/summary")]
pub async fn summary(
    user: web::ReqData<Arc<models::Account>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ChatError> {
    let summary = db::notification::summary(pg_pool.get_ref(), user.id, user.branch_id).await?;

    Ok(JsonResponse::build()
        .set_payload(SummaryPayload { summary })
        .ok())
}

/// GET /notifications?type=all|alerts|chat&limit=N
/// Unread first, then newest first.
#[tracing::instrument(name = "List notifications.", skip_all)]
#[get("")]
pub async fn list(
    user: web::ReqData<Arc<models::Account>>,
    query: web::Query<ListQuery>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ChatError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let notifications = db::notification::fetch_visible(
        pg_pool.get_ref(),
        user.id,
        user.branch_id,
        query.filter,
        limit,
    )
    .await?;

    Ok(JsonResponse::build()
        .set_payload(NotificationsPayload { notifications })
        .ok())
}
