use crate::store::NoteStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteStore>,
}

impl AppState {
    pub fn new(notes: Arc<dyn NoteStore>) -> Self {
        Self { notes }
    }
}
