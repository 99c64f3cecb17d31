//! Error types for the customer store.
//!
//! Every store operation fails with one of a small set of kinds so the UI can
//! show a precise footer message instead of a generic database error.

use thiserror::Error;

/// Errors surfaced by [`CustomerStore`](super::CustomerStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be opened or its schema prepared.
    #[error("customer store unavailable: {0}")]
    Unavailable(String),

    /// An update or delete targeted an id that no longer exists.
    #[error("no customer with id {id}")]
    NotFound { id: i64 },

    /// A filter/sort attribute outside the name/email/phone allow-list.
    #[error("unknown customer field '{0}' (expected name, email, or phone)")]
    InvalidField(String),

    /// Any other statement failure from SQLite.
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
