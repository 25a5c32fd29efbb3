//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;

/// Administrator account
///
/// Not serializable: the password hash must never reach a client.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// New user creation payload, carrying the plain-text password
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// User login credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginCredentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginCredentials {
    /// Both fields, if present and non-empty
    pub fn complete(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some((username, password))
            }
            _ => None,
        }
    }
}
