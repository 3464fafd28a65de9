use serde_derive::{Deserialize, Serialize};

use crate::models;

/// Profile returned by the auth service for a validated session token.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountForm {
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub branch_id: i32,
}

impl TryInto<models::Account> for AccountForm {
    type Error = String;

    fn try_into(self) -> Result<models::Account, Self::Error> {
        match self.role.as_str() {
            models::ROLE_ADMIN | models::ROLE_STAFF => {}
            other => return Err(format!("unknown role {other:?}")),
        }

        Ok(models::Account {
            id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            branch_id: self.branch_id,
        })
    }
}
