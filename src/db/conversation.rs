use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;

use crate::models;
use crate::views;

fn ordered_pair(a: i32, b: i32) -> (i32, i32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::Conversation>, sqlx::Error> {
    sqlx::query_as::<_, models::Conversation>(
        r#"
        SELECT id, user_low_id, user_high_id, last_message_at, created_at
        FROM conversation
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Authoritative lookup of the single conversation between two accounts,
/// in either argument order.
pub async fn fetch_by_pair(
    pool: &PgPool,
    user_a: i32,
    user_b: i32,
) -> Result<Option<models::Conversation>, sqlx::Error> {
    let (low, high) = ordered_pair(user_a, user_b);
    sqlx::query_as::<_, models::Conversation>(
        r#"
        SELECT id, user_low_id, user_high_id, last_message_at, created_at
        FROM conversation
        WHERE user_low_id = $1 AND user_high_id = $2
        "#,
    )
    .bind(low)
    .bind(high)
    .fetch_optional(pool)
    .await
}

/// Creates the conversation and both participant rows (branch ids
/// snapshotted from the accounts) in one transaction. A concurrent creator
/// for the same pair surfaces as a unique violation on
/// `conversation_pair_unique`; the resolver handles the retry.
pub async fn insert_with_participants(
    pool: &PgPool,
    user_a: &models::Account,
    user_b: &models::Account,
) -> Result<models::Conversation, sqlx::Error> {
    let query_span = tracing::info_span!("Create conversation with participants.");
    let (low, high) = if user_a.id < user_b.id {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    };

    async {
        let mut tx = pool.begin().await?;

        let conversation = sqlx::query_as::<_, models::Conversation>(
            r#"
            INSERT INTO conversation (user_low_id, user_high_id)
            VALUES ($1, $2)
            RETURNING id, user_low_id, user_high_id, last_message_at, created_at
            "#,
        )
        .bind(low.id)
        .bind(high.id)
        .fetch_one(&mut *tx)
        .await?;

        for account in [low, high] {
            sqlx::query(
                r#"INSERT INTO participant (conversation_id, user_id, branch_id) VALUES ($1, $2, $3)"#,
            )
            .bind(conversation.id)
            .bind(account.id)
            .bind(account.branch_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(conversation)
    }
    .instrument(query_span)
    .await
}

pub async fn fetch_participants(
    pool: &PgPool,
    conversation_id: i32,
) -> Result<Vec<models::Participant>, sqlx::Error> {
    sqlx::query_as::<_, models::Participant>(
        r#"
        SELECT conversation_id, user_id, branch_id, last_read_at
        FROM participant
        WHERE conversation_id = $1
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_participant(
    pool: &PgPool,
    conversation_id: i32,
    user_id: i32,
) -> Result<Option<models::Participant>, sqlx::Error> {
    sqlx::query_as::<_, models::Participant>(
        r#"
        SELECT conversation_id, user_id, branch_id, last_read_at
        FROM participant
        WHERE conversation_id = $1 AND user_id = $2
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Recency bump; last-writer-wins is fine, this only drives list sorting.
pub async fn touch_last_message<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    conversation_id: i32,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(r#"UPDATE conversation SET last_message_at = $2 WHERE id = $1"#)
        .bind(conversation_id)
        .bind(at)
        .execute(executor)
        .await?;
    Ok(())
}

/// Advances the caller's read marker; feeds the per-conversation unread
/// counts, independent of the bell's notification read state.
pub async fn advance_last_read(
    pool: &PgPool,
    conversation_id: i32,
    user_id: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE participant
        SET last_read_at = NOW() at time zone 'utc'
        WHERE conversation_id = $1 AND user_id = $2
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Conversation list for one user: peer identity, branch name, last
/// message preview and unread count, newest conversation first.
pub async fn summaries_for_user(
    pool: &PgPool,
    user_id: i32,
) -> Result<Vec<views::chat::ConversationSummary>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch conversation summaries.");
    sqlx::query_as::<_, views::chat::ConversationSummary>(
        r#"
        SELECT
            c.id AS conversation_id,
            c.last_message_at,
            a.first_name,
            a.last_name,
            b.name AS branch_name,
            (SELECT m.content
             FROM message m
             WHERE m.conversation_id = c.id
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT 1) AS last_message,
            (SELECT COUNT(*)
             FROM message m
             WHERE m.conversation_id = c.id
               AND m.sender_id <> $1
               AND m.created_at > COALESCE(me.last_read_at, 'epoch'::timestamptz)) AS unread_count
        FROM conversation c
        JOIN participant me ON me.conversation_id = c.id AND me.user_id = $1
        JOIN participant peer ON peer.conversation_id = c.id AND peer.user_id <> $1
        JOIN account a ON a.id = peer.user_id
        JOIN branch b ON b.id = peer.branch_id
        ORDER BY c.last_message_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}
