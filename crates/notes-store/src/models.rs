//! Database models for the storage layer.
//!
//! These types map directly to database rows and are used for
//! sqlx queries. Row types also double as the JSON representation
//! returned by the HTTP API, so their serde attributes define the
//! wire field names.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ==================== Note Models ====================

/// Database row for the `notes` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub published: bool,
    /// Used for both `created_at` and `updated_at`.
    pub created_at: DateTime<Utc>,
}

impl NewNote {
    /// Create a new note input with a fresh id, stamped with the current time.
    pub fn new(title: String, content: String, category: Option<String>, published: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            category,
            published,
            created_at: Utc::now(),
        }
    }
}

/// Partial update for a note. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
}

impl NoteChanges {
    /// Whether no field would change (only `updated_at` gets refreshed).
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.published.is_none()
    }
}

/// Pagination window for listing notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub page: u32,
    /// Maximum number of rows per page.
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Row offset for this page: `(page - 1) * limit`.
    ///
    /// `None` when the product does not fit a Postgres `BIGINT`.
    pub fn checked_offset(&self) -> Option<i64> {
        (i64::from(self.page.max(1)) - 1).checked_mul(i64::from(self.limit))
    }

    /// Row offset, saturating at `i64::MAX` (a page past every row).
    pub fn offset(&self) -> i64 {
        self.checked_offset().unwrap_or(i64::MAX)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE, Self::DEFAULT_LIMIT)
    }
}

// ==================== User Models ====================

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Value stored in the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive: accepts `USER`, `user`, `Admin`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("user") {
            Ok(Self::User)
        } else if s.eq_ignore_ascii_case("admin") {
            Ok(Self::Admin)
        } else {
            Err(UnknownRole(s.to_string()))
        }
    }
}

/// Database row for the `users` table.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

impl NewUser {
    /// Create a new user input with a freshly generated UUID.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        full_name: String,
        role: Role,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            full_name,
            role,
        }
    }
}

/// Partial update for a user. Not exposed over HTTP.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
}
