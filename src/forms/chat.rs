use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct CreateConversation {
    #[validate(minimum = 1)]
    pub recipient_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct SendMessage {
    #[validate(min_length = 1)]
    #[validate(max_length = 2000)]
    pub message: String,
}
