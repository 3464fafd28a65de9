use sqlx::PgPool;
use tracing::Instrument;

use crate::models;
use crate::views;

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::Account>, sqlx::Error> {
    sqlx::query_as::<_, models::Account>(
        r#"SELECT id, first_name, last_name, role, branch_id FROM account WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Directory for the "start a chat" picker: everyone except the caller,
/// across all branches.
pub async fn fetch_directory(
    pool: &PgPool,
    excluding_user: i32,
) -> Result<Vec<views::chat::UserView>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch the account directory.");
    sqlx::query_as::<_, views::chat::UserView>(
        r#"
        SELECT id AS user_id, first_name, last_name, role, branch_id
        FROM account
        WHERE id <> $1
        ORDER BY first_name, last_name
        "#,
    )
    .bind(excluding_user)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}
