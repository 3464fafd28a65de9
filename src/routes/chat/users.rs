use crate::db;
use crate::errors::ChatError;
use crate::helpers::JsonResponse;
use crate::models;
use crate::views;
use actix_web::{get, web, Responder};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Serialize)]
struct UsersPayload {
    users: Vec<views::chat::UserView>,
}

/// GET /chat/users
/// Directory of accounts a chat can be started with, all branches, caller
/// excluded.
#[tracing::instrument(name = "List chat users.", skip_all)]
#[get("/users")]
pub async fn list(
    user: web::ReqData<Arc<models::Account>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ChatError> {
    let users = db::account::fetch_directory(pg_pool.get_ref(), user.id).await?;

    Ok(JsonResponse::build().set_payload(UsersPayload { users }).ok())
}
