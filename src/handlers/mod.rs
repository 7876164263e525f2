pub mod create;
pub mod delete;
pub mod get;
pub mod health;
pub mod info;
pub mod list;

pub use create::create_handler;
pub use delete::delete_handler;
pub use get::get_handler;
pub use health::health_handler;
pub use info::info_handler;
pub use list::list_handler;

use uuid::Uuid;

/// Parse a `{id}` path segment. Anything that is not a UUID cannot name a
/// stored note, so callers treat `None` as not-found.
fn parse_note_id(raw: &str) -> Option<Uuid> {
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::debug!("Path segment '{}' is not a note id", raw);
            None
        }
    }
}
