//! Storage seam for notes.
//!
//! Handlers only see [`NoteStore`]; the production implementation lives in
//! [`crate::spanner`]. Every failure is reported as a [`StoreError`] whose
//! variant records what kind of infrastructure problem occurred. Callers log
//! the variant and answer with a generic message.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewNote, Note};

#[cfg(test)]
pub mod memory;

/// Infrastructure failure raised by a [`NoteStore`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or refused the session
    #[error("store unavailable: {0:#}")]
    Unavailable(anyhow::Error),
    /// The store did not answer before its deadline
    #[error("store timed out: {0:#}")]
    Timeout(anyhow::Error),
    /// A stored row could not be encoded or decoded
    #[error("serialization failure: {0:#}")]
    Serialization(anyhow::Error),
    /// Any other failed statement or mutation
    #[error("query failed: {0:#}")]
    Query(anyhow::Error),
}

impl StoreError {
    /// Short label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "unavailable",
            StoreError::Timeout(_) => "timeout",
            StoreError::Serialization(_) => "serialization",
            StoreError::Query(_) => "query",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations over the notes collection.
///
/// Each method is a single store call; implementations are shared across
/// requests behind an `Arc`.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes in the store's natural order
    async fn list(&self) -> StoreResult<Vec<Note>>;

    /// The note with the given id, or `None`
    async fn find(&self, id: Uuid) -> StoreResult<Option<Note>>;

    /// Persist a note under a freshly generated id and return it
    async fn insert(&self, note: NewNote) -> StoreResult<Note>;

    /// Remove the note with the given id. Returns `false` when nothing matched.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Cheap round trip proving the store is reachable
    async fn health_check(&self) -> StoreResult<()>;

    /// Release the connection. Called once at shutdown.
    async fn close(&self);
}
