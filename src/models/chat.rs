use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Two-party conversation. The pair is stored normalized (low account id
/// first) so the storage layer can enforce one conversation per unordered
/// pair; `last_message_at` is only a recency hint for list sorting.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: i32,
    pub user_low_id: i32,
    pub user_high_id: i32,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Membership row, exactly two per conversation. `branch_id` is a snapshot
/// taken when the conversation was created; `last_read_at` drives the
/// per-conversation unread counts.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Participant {
    pub conversation_id: i32,
    pub user_id: i32,
    pub branch_id: i32,
    pub last_read_at: Option<DateTime<Utc>>,
}

/// Immutable once created. Ordering within a conversation is
/// `created_at, id`: server-assigned, ties broken by insertion order.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i32,
    pub sender_id: i32,
    pub branch_id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
