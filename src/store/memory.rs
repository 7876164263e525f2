use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NoteStore, StoreError, StoreResult};
use crate::models::{NewNote, Note};

/// In-process store for handler tests. Keeps insertion order.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<Vec<Note>>,
    unavailable: AtomicBool,
    closed: AtomicBool,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the connection were down
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.set_unavailable(true);
        store
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(anyhow::anyhow!(
                "connection refused"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        self.check()?;
        Ok(self.notes.read().await.clone())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Note>> {
        self.check()?;
        Ok(self.notes.read().await.iter().find(|n| n.id == id).cloned())
    }

    async fn insert(&self, note: NewNote) -> StoreResult<Note> {
        self.check()?;
        let note = note.with_id(Uuid::new_v4());
        self.notes.write().await.push(note.clone());
        Ok(note)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.check()?;
        let mut notes = self.notes.write().await;
        match notes.iter().position(|n| n.id == id) {
            Some(index) => {
                notes.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.check()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_note(title: &str) -> NewNote {
        NewNote {
            title: title.to_string(),
            content: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let store = InMemoryNoteStore::new();

        let a = store.insert(new_note("a")).await.unwrap();
        let b = store.insert(new_note("a")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.list().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let store = InMemoryNoteStore::unavailable();

        assert!(matches!(store.list().await, Err(StoreError::Unavailable(_))));
        assert!(store.insert(new_note("a")).await.is_err());
        assert!(store.delete(Uuid::new_v4()).await.is_err());
        assert!(store.health_check().await.is_err());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_close_marks_store_closed() {
        let store = InMemoryNoteStore::new();
        assert!(!store.is_closed());

        store.close().await;
        assert!(store.is_closed());
    }
}
