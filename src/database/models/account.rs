use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Comma-separated, e.g. `ROLE_USER,ROLE_ADMIN`
    pub roles: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn role_list(&self) -> Vec<String> {
        self.roles
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            username: self.username.clone(),
            email: self.email.clone(),
            roles: self.role_list(),
        }
    }
}

/// Public view of an account; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: String,
}
