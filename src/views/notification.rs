use chrono::{DateTime, Utc};
use serde::Serialize;

/// Bell-feed entry, read flag resolved against the caller's read state.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct NotificationView {
    #[serde(rename = "NotificationID")]
    pub notification_id: i64,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "IsRead")]
    pub is_read: bool,
}

/// Unread counts for the bell badge, polled by the client.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Summary {
    pub total: i64,
    pub chat: i64,
    pub alerts: i64,
}
