use sqlx::PgPool;
use tracing::Instrument;

use crate::models::NotificationFilter;
use crate::views;

/// Payload for a notification row about to be created. `user_id = None`
/// makes it branch-wide.
#[derive(Debug)]
pub struct NewNotification {
    pub user_id: Option<i32>,
    pub branch_id: i32,
    pub kind: String,
    pub category: String,
    pub title: String,
    pub message: String,
    pub link: String,
}

// Visibility rule shared by every query here: a row targets the caller
// directly or their whole branch, and always stays within their branch.
const VISIBLE: &str = "(n.user_id IS NULL OR n.user_id = $1) AND n.branch_id = $2";

pub async fn insert(pool: &PgPool, notification: NewNotification) -> Result<i64, sqlx::Error> {
    let query_span = tracing::info_span!("Insert notification.");
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO notification (user_id, branch_id, kind, category, title, message, link)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(notification.user_id)
    .bind(notification.branch_id)
    .bind(&notification.kind)
    .bind(&notification.category)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.link)
    .fetch_one(pool)
    .instrument(query_span)
    .await?;

    Ok(row.0)
}

/// Bell feed: unread first, then newest first.
pub async fn fetch_visible(
    pool: &PgPool,
    user_id: i32,
    branch_id: i32,
    filter: NotificationFilter,
    limit: i64,
) -> Result<Vec<views::notification::NotificationView>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch notifications.");
    let sql = format!(
        r#"
        SELECT
            n.id AS notification_id,
            n.kind,
            n.category,
            n.title,
            n.message,
            n.link,
            n.created_at,
            COALESCE(r.is_read, FALSE) AS is_read
        FROM notification n
        LEFT JOIN notification_read_state r
            ON r.notification_id = n.id AND r.user_id = $1
        WHERE {VISIBLE}
          AND ($3 = 'all'
               OR ($3 = 'chat' AND n.kind = 'chat')
               OR ($3 = 'alerts' AND n.kind <> 'chat'))
        ORDER BY COALESCE(r.is_read, FALSE) ASC, n.created_at DESC, n.id DESC
        LIMIT $4
        "#
    );

    sqlx::query_as::<_, views::notification::NotificationView>(&sql)
        .bind(user_id)
        .bind(branch_id)
        .bind(filter.as_str())
        .bind(limit)
        .fetch_all(pool)
        .instrument(query_span)
        .await
}

/// Unread counts for the bell badge; absent read state counts as unread.
pub async fn summary(
    pool: &PgPool,
    user_id: i32,
    branch_id: i32,
) -> Result<views::notification::Summary, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch notification summary.");
    let sql = format!(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE n.kind = 'chat') AS chat,
            COUNT(*) FILTER (WHERE n.kind <> 'chat') AS alerts
        FROM notification n
        LEFT JOIN notification_read_state r
            ON r.notification_id = n.id AND r.user_id = $1
        WHERE {VISIBLE}
          AND (r.is_read IS NULL OR r.is_read = FALSE)
        "#
    );

    sqlx::query_as::<_, views::notification::Summary>(&sql)
        .bind(user_id)
        .bind(branch_id)
        .fetch_one(pool)
        .instrument(query_span)
        .await
}

/// Idempotent read-state upsert, gated on visibility in the same
/// statement. Zero rows affected means the notification does not exist or
/// is not visible to the caller.
pub async fn mark_read(
    pool: &PgPool,
    notification_id: i64,
    user_id: i32,
    branch_id: i32,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO notification_read_state (notification_id, user_id, is_read, read_at)
        SELECT n.id, $1, TRUE, NOW() at time zone 'utc'
        FROM notification n
        WHERE n.id = $3 AND {VISIBLE}
        ON CONFLICT (notification_id, user_id)
        DO UPDATE SET is_read = TRUE, read_at = NOW() at time zone 'utc'
        "#
    );

    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(branch_id)
        .bind(notification_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Bulk mark-read in one statement so concurrent polling never observes a
/// partially marked feed.
pub async fn mark_all_read(
    pool: &PgPool,
    user_id: i32,
    branch_id: i32,
    filter: NotificationFilter,
) -> Result<u64, sqlx::Error> {
    let query_span = tracing::info_span!("Mark all notifications read.");
    let sql = format!(
        r#"
        INSERT INTO notification_read_state (notification_id, user_id, is_read, read_at)
        SELECT n.id, $1, TRUE, NOW() at time zone 'utc'
        FROM notification n
        LEFT JOIN notification_read_state r
            ON r.notification_id = n.id AND r.user_id = $1
        WHERE {VISIBLE}
          AND (r.is_read IS NULL OR r.is_read = FALSE)
          AND ($3 = 'all'
               OR ($3 = 'chat' AND n.kind = 'chat')
               OR ($3 = 'alerts' AND n.kind <> 'chat'))
        ON CONFLICT (notification_id, user_id)
        DO UPDATE SET is_read = TRUE, read_at = NOW() at time zone 'utc'
        "#
    );

    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(branch_id)
        .bind(filter.as_str())
        .execute(pool)
        .instrument(query_span)
        .await?;

    Ok(result.rows_affected())
}

/// Opening a conversation also clears its chat notifications from the
/// bell, keeping both unread mechanisms consistent.
pub async fn mark_conversation_read(
    pool: &PgPool,
    user_id: i32,
    branch_id: i32,
    link: &str,
) -> Result<u64, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO notification_read_state (notification_id, user_id, is_read, read_at)
        SELECT n.id, $1, TRUE, NOW() at time zone 'utc'
        FROM notification n
        LEFT JOIN notification_read_state r
            ON r.notification_id = n.id AND r.user_id = $1
        WHERE {VISIBLE}
          AND (r.is_read IS NULL OR r.is_read = FALSE)
          AND n.kind = 'chat'
          AND n.link = $3
        ON CONFLICT (notification_id, user_id)
        DO UPDATE SET is_read = TRUE, read_at = NOW() at time zone 'utc'
        "#
    );

    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(branch_id)
        .bind(link)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
