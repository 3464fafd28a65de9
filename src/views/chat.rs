use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models;

/// One row of the conversation list: the peer's identity plus recency and
/// unread data. Field names follow the frontend contract.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ConversationSummary {
    #[serde(rename = "ConversationID")]
    pub conversation_id: i32,
    #[serde(rename = "LastMessageTimestamp")]
    pub last_message_at: DateTime<Utc>,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "BranchName")]
    pub branch_name: String,
    #[serde(rename = "LastMessage")]
    pub last_message: Option<String>,
    #[serde(rename = "UnreadCount")]
    pub unread_count: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MessageView {
    #[serde(rename = "MessageID")]
    pub message_id: i64,
    #[serde(rename = "ConversationID")]
    pub conversation_id: i32,
    #[serde(rename = "SenderUserID")]
    pub sender_user_id: i32,
    #[serde(rename = "MessageContent")]
    pub message_content: String,
    #[serde(rename = "Timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
}

impl MessageView {
    /// View of a message we just stored, before any re-fetch. The sender is
    /// the authenticated caller, so the names come straight from the context.
    pub fn from_sent(message: models::Message, sender: &models::Account) -> Self {
        Self {
            message_id: message.id,
            conversation_id: message.conversation_id,
            sender_user_id: message.sender_id,
            message_content: message.content,
            created_at: message.created_at,
            first_name: sender.first_name.clone(),
            last_name: sender.last_name.clone(),
        }
    }
}

/// Directory entry for the "start a chat" picker.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserView {
    #[serde(rename = "UserID")]
    pub user_id: i32,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "BranchID")]
    pub branch_id: i32,
}
