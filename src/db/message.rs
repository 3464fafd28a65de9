use sqlx::PgPool;
use tracing::Instrument;

use crate::models;
use crate::views;

/// Append-only insert; the timestamp is server-assigned so ordering within
/// a conversation is total. Runs on the dispatcher's transaction.
pub async fn insert<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    conversation_id: i32,
    sender: &models::Account,
    content: &str,
) -> Result<models::Message, sqlx::Error> {
    sqlx::query_as::<_, models::Message>(
        r#"
        INSERT INTO message (conversation_id, sender_id, branch_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id, conversation_id, sender_id, branch_id, content, created_at
        "#,
    )
    .bind(conversation_id)
    .bind(sender.id)
    .bind(sender.branch_id)
    .bind(content)
    .fetch_one(executor)
    .await
}

/// Full history, oldest first, ties broken by insertion order. No
/// pagination: bounded history per conversation is an accepted limit here.
pub async fn fetch_ordered(
    pool: &PgPool,
    conversation_id: i32,
) -> Result<Vec<views::chat::MessageView>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch conversation messages.");
    sqlx::query_as::<_, views::chat::MessageView>(
        r#"
        SELECT
            m.id AS message_id,
            m.conversation_id,
            m.sender_id AS sender_user_id,
            m.content AS message_content,
            m.created_at,
            a.first_name,
            a.last_name
        FROM message m
        JOIN account a ON a.id = m.sender_id
        WHERE m.conversation_id = $1
        ORDER BY m.created_at ASC, m.id ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}

/// Destructive participant-only action: clears history, keeps the
/// conversation itself.
pub async fn delete_all(pool: &PgPool, conversation_id: i32) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM message WHERE conversation_id = $1"#)
        .bind(conversation_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
