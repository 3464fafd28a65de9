use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_STAFF: &str = "Staff";

/// Authenticated caller identity. Owned by the accounts subsystem and
/// attached to every request by the authentication middleware; chat reads
/// it, never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub branch_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Branch {
    pub id: i32,
    pub name: String,
}
