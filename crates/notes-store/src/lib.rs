//! notes-store: Storage layer for the notes API
//!
//! This crate provides:
//! - PostgreSQL storage for notes and user accounts
//! - Embedded, idempotent schema migrations
//! - Type-safe database operations via sqlx, each bounded by a timeout
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_store::{NewNote, Page, Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! let note = store
//!     .insert_note(&NewNote::new("Title".into(), "Body".into(), None, false))
//!     .await?;
//! let first_page = store.list_notes(Page::default()).await?;
//! ```

pub mod error;
pub mod models;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use store::{DatabaseTarget, Store, StoreConfig};
