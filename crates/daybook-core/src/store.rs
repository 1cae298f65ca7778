//! Read-only store capability consumed by the stats and reminder engines.
//!
//! The engines never talk to SQLite directly -- they depend on this trait
//! so tests can substitute an in-memory store, and so the persistence
//! layer can be swapped without touching the engines.

use crate::agenda::{Achievement, Event, Todo, User};
use crate::error::DatabaseError;

/// Read-only queries over the agenda entities.
///
/// Each call returns an eventually-consistent snapshot; no transactional
/// guarantee holds across calls within one user's processing.
pub trait AgendaStore: Send + Sync {
    /// All known users.
    fn find_users(&self) -> Result<Vec<User>, DatabaseError>;

    /// All todos belonging to a user.
    fn find_todos(&self, user_id: &str) -> Result<Vec<Todo>, DatabaseError>;

    /// All events belonging to a user.
    fn find_events(&self, user_id: &str) -> Result<Vec<Event>, DatabaseError>;

    /// All achievements belonging to a user.
    fn find_achievements(&self, user_id: &str) -> Result<Vec<Achievement>, DatabaseError>;
}
