//! Inbound schemas and composed outbound views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Book, User};
use crate::enums::DEFAULT_ROLE;
use crate::validation::{FieldKind, FieldSpec, Schema};

/// Body of `POST /book`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub description: String,
    pub year: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BookInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            year,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Schema for BookInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("id", FieldKind::Integer),
        FieldSpec::required("title", FieldKind::Text),
        FieldSpec::required("description", FieldKind::Text),
        FieldSpec::required("year", FieldKind::SmallInteger),
        FieldSpec::optional("created_at", FieldKind::Timestamp),
        FieldSpec::optional("updated_at", FieldKind::Timestamp),
    ];
}

/// Body of `POST /user`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserInput {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// The role to store, falling back to [`DEFAULT_ROLE`].
    pub fn role_id(&self) -> i64 {
        self.role_id.unwrap_or(DEFAULT_ROLE.id())
    }
}

impl Schema for UserInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("id", FieldKind::Integer),
        FieldSpec::required("username", FieldKind::Text),
        FieldSpec::required("email", FieldKind::Text),
        FieldSpec::required("password", FieldKind::Text),
        FieldSpec::optional("role_id", FieldKind::Integer),
        FieldSpec::optional("created_at", FieldKind::Timestamp),
        FieldSpec::optional("updated_at", FieldKind::Timestamp),
    ];
}

/// Body of `POST /book-author` and `POST /book-borrow`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LinkInput {
    pub book_id: i64,
    pub user_id: i64,
}

impl Schema for LinkInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("book_id", FieldKind::Integer),
        FieldSpec::required("user_id", FieldKind::Integer),
    ];
}

/// A user together with full records of the books they wrote and borrowed.
/// The two lists are independent and may share books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub authored_books: Vec<Book>,
    pub borrowed_books: Vec<Book>,
}

/// A book together with the users who wrote and borrowed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub authors: Vec<User>,
    pub borrowers: Vec<User>,
}
