//! Operator account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An operator account row. `password` holds the argon2 hash and never
/// leaves the service; serialize [`SanitizedUser`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// User representation safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizedUser {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
}

impl From<User> for SanitizedUser {
    fn from(user: User) -> Self {
        SanitizedUser {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Input for creating an operator account. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
}
