use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const KIND_CHAT: &str = "chat";

/// Notification content is immutable. `user_id = NULL` means branch-wide;
/// per-user read state lives in `NotificationReadState`, never here.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: Option<i32>,
    pub branch_id: i32,
    pub kind: String,
    pub category: String,
    pub title: String,
    pub message: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

/// Join-table read state: one notification row can serve many readers.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationReadState {
    pub notification_id: i64,
    pub user_id: i32,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

/// Bell-feed tab filter. `Alerts` is everything that is not chat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFilter {
    #[default]
    All,
    Alerts,
    Chat,
}

impl NotificationFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Alerts => "alerts",
            Self::Chat => "chat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Query {
        #[serde(rename = "type", default)]
        filter: NotificationFilter,
    }

    #[test]
    fn filter_deserializes_from_query_values() {
        let q: Query = serde_json::from_str(r#"{"type":"chat"}"#).unwrap();
        assert_eq!(q.filter, NotificationFilter::Chat);

        let q: Query = serde_json::from_str(r#"{"type":"alerts"}"#).unwrap();
        assert_eq!(q.filter, NotificationFilter::Alerts);

        let q: Query = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(q.filter, NotificationFilter::All);
    }

    #[test]
    fn filter_round_trips_as_str() {
        for (filter, expected) in [
            (NotificationFilter::All, "all"),
            (NotificationFilter::Alerts, "alerts"),
            (NotificationFilter::Chat, "chat"),
        ] {
            assert_eq!(filter.as_str(), expected);
        }
    }
}
