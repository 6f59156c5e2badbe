//! Row types for the five persisted tables.
//!
//! Relationships are plain foreign-key columns; joins happen in the
//! repository, never through back-pointers on these structs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Stored as given. Never written to an outbound view.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of the `books` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// "This user authored this book."
///
/// Either reference becomes `None` once the user or book it pointed at has
/// been deleted; the link row itself is kept.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BookAuthor {
    pub id: i64,
    pub book_id: Option<i64>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// "This user borrowed this book." Same dangling-reference rules as [`BookAuthor`].
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BookBorrow {
    pub id: i64,
    pub book_id: Option<i64>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_view_never_carries_password() {
        let now = Utc::now();
        let user = User {
            id: 1,
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "hunter2".into(),
            role_id: 2,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
