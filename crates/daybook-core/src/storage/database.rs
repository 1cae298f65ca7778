//! SQLite-based storage for users, todos, events, and achievements.
//!
//! Timestamps are stored as RFC3339 TEXT. A semantic timestamp (due,
//! occurrence) that fails to parse on the way back out loads as `None`
//! with a logged warning, so one corrupt row degrades gracefully instead
//! of poisoning streaks or reminders.
//!
//! The connection sits behind a mutex so one `Database` value can serve
//! the reminder scheduler's worker pool as a `Send + Sync` store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use super::data_dir;
use crate::agenda::{Achievement, AchievementCategory, Event, ItemCategory, Priority, Todo, User};
use crate::error::DatabaseError;
use crate::store::AgendaStore;

// === Helper functions ===

/// Parse a semantic timestamp column. Malformed values load as `None`
/// with a warning; they are excluded from downstream computation.
fn parse_datetime_opt(value: Option<String>, entity: &str, id: &str) -> Option<DateTime<Utc>> {
    let raw = value?;
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            warn!(entity, id, "malformed timestamp '{raw}': {e}");
            None
        }
    }
}

/// Parse a bookkeeping timestamp (created_at) with fallback to now.
fn parse_datetime_fallback(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn format_datetime_opt(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339())
}

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let created_at: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: parse_datetime_fallback(&created_at),
    })
}

fn row_to_todo(row: &rusqlite::Row) -> Result<Todo, rusqlite::Error> {
    let id: String = row.get(0)?;
    let due_at: Option<String> = row.get(4)?;
    let completed_at: Option<String> = row.get(6)?;
    let priority: String = row.get(7)?;
    let category: String = row.get(8)?;
    let created_at: String = row.get(9)?;
    Ok(Todo {
        due_at: parse_datetime_opt(due_at, "todo", &id),
        completed_at: parse_datetime_opt(completed_at, "todo", &id),
        id,
        user_id: row.get(1)?,
        text: row.get(2)?,
        description: row.get(3)?,
        done: row.get(5)?,
        priority: Priority::parse(&priority),
        category: ItemCategory::parse(&category),
        created_at: parse_datetime_fallback(&created_at),
    })
}

fn row_to_event(row: &rusqlite::Row) -> Result<Event, rusqlite::Error> {
    let id: String = row.get(0)?;
    let occurs_at: Option<String> = row.get(4)?;
    let completed_at: Option<String> = row.get(8)?;
    let priority: String = row.get(9)?;
    let category: String = row.get(10)?;
    let created_at: String = row.get(11)?;
    Ok(Event {
        occurs_at: parse_datetime_opt(occurs_at, "event", &id),
        completed_at: parse_datetime_opt(completed_at, "event", &id),
        id,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        duration_minutes: row.get(5)?,
        location: row.get(6)?,
        completed: row.get(7)?,
        priority: Priority::parse(&priority),
        category: ItemCategory::parse(&category),
        created_at: parse_datetime_fallback(&created_at),
    })
}

fn row_to_achievement(row: &rusqlite::Row) -> Result<Achievement, rusqlite::Error> {
    let id: String = row.get(0)?;
    let occurred_at: Option<String> = row.get(4)?;
    let category: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    Ok(Achievement {
        occurred_at: parse_datetime_opt(occurred_at, "achievement", &id),
        id,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        points: row.get(5)?,
        category: AchievementCategory::parse(&category),
        created_at: parse_datetime_fallback(&created_at),
    })
}

const TODO_COLUMNS: &str =
    "id, user_id, text, description, due_at, done, completed_at, priority, category, created_at";
const EVENT_COLUMNS: &str = "id, user_id, title, description, occurs_at, duration_minutes, \
     location, completed, completed_at, priority, category, created_at";
const ACHIEVEMENT_COLUMNS: &str =
    "id, user_id, title, description, occurred_at, points, category, created_at";

/// SQLite database for agenda storage.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `~/.config/daybook/daybook.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("daybook.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (and migrate) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests, ephemeral runs).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::Locked)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.lock()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id         TEXT PRIMARY KEY,
                    name       TEXT NOT NULL,
                    email      TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS todos (
                    id           TEXT PRIMARY KEY,
                    user_id      TEXT NOT NULL,
                    text         TEXT NOT NULL,
                    description  TEXT,
                    due_at       TEXT,
                    done         INTEGER NOT NULL DEFAULT 0,
                    completed_at TEXT,
                    priority     TEXT NOT NULL DEFAULT 'medium',
                    category     TEXT NOT NULL DEFAULT 'personal',
                    created_at   TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS events (
                    id               TEXT PRIMARY KEY,
                    user_id          TEXT NOT NULL,
                    title            TEXT NOT NULL,
                    description      TEXT,
                    occurs_at        TEXT,
                    duration_minutes INTEGER NOT NULL DEFAULT 60,
                    location         TEXT,
                    completed        INTEGER NOT NULL DEFAULT 0,
                    completed_at     TEXT,
                    priority         TEXT NOT NULL DEFAULT 'medium',
                    category         TEXT NOT NULL DEFAULT 'personal',
                    created_at       TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS achievements (
                    id          TEXT PRIMARY KEY,
                    user_id     TEXT NOT NULL,
                    title       TEXT NOT NULL,
                    description TEXT,
                    occurred_at TEXT,
                    points      INTEGER NOT NULL DEFAULT 10,
                    category    TEXT NOT NULL DEFAULT 'personal',
                    created_at  TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_todos_user_due ON todos(user_id, due_at);
                CREATE INDEX IF NOT EXISTS idx_todos_user_done ON todos(user_id, done);
                CREATE INDEX IF NOT EXISTS idx_events_user_occurs ON events(user_id, occurs_at);
                CREATE INDEX IF NOT EXISTS idx_achievements_user ON achievements(user_id, occurred_at);
                CREATE INDEX IF NOT EXISTS idx_achievements_user_category ON achievements(user_id, category);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // === Users ===

    pub fn create_user(&self, user: &User) -> Result<(), DatabaseError> {
        self.lock()?.execute(
            "INSERT INTO users (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.name, user.email, user.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, name, email, created_at FROM users ORDER BY created_at")?;
        let rows = stmt.query_map([], row_to_user)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                "SELECT id, name, email, created_at FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    // === Todos ===

    pub fn create_todo(&self, todo: &Todo) -> Result<(), DatabaseError> {
        self.lock()?.execute(
            "INSERT INTO todos (id, user_id, text, description, due_at, done, completed_at, priority, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                todo.id,
                todo.user_id,
                todo.text,
                todo.description,
                format_datetime_opt(todo.due_at),
                todo.done,
                format_datetime_opt(todo.completed_at),
                todo.priority.as_str(),
                todo.category.as_str(),
                todo.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_todos(&self, user_id: &str) -> Result<Vec<Todo>, DatabaseError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ?1 ORDER BY due_at"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_todo)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_todo(&self, id: &str) -> Result<Option<Todo>, DatabaseError> {
        let conn = self.lock()?;
        let todo = conn
            .query_row(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
                params![id],
                row_to_todo,
            )
            .optional()?;
        Ok(todo)
    }

    /// Mark a todo done or open again.
    pub fn set_todo_done(&self, id: &str, done: bool) -> Result<(), DatabaseError> {
        let completed_at = done.then(|| Utc::now().to_rfc3339());
        let changed = self.lock()?.execute(
            "UPDATE todos SET done = ?2, completed_at = ?3 WHERE id = ?1",
            params![id, done, completed_at],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("todo {id}")));
        }
        Ok(())
    }

    pub fn delete_todo(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .lock()?
            .execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("todo {id}")));
        }
        Ok(())
    }

    /// Open todos whose due timestamp falls in `[from, to)`.
    pub fn find_todos_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Todo>, DatabaseError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TODO_COLUMNS} FROM todos
             WHERE user_id = ?1 AND done = 0 AND due_at IS NOT NULL
               AND due_at >= ?2 AND due_at < ?3
             ORDER BY due_at"
        ))?;
        let rows = stmt.query_map(
            params![user_id, from.to_rfc3339(), to.to_rfc3339()],
            row_to_todo,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // === Events ===

    pub fn create_event(&self, event: &Event) -> Result<(), DatabaseError> {
        self.lock()?.execute(
            "INSERT INTO events (id, user_id, title, description, occurs_at, duration_minutes, location, completed, completed_at, priority, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                event.id,
                event.user_id,
                event.title,
                event.description,
                format_datetime_opt(event.occurs_at),
                event.duration_minutes,
                event.location,
                event.completed,
                format_datetime_opt(event.completed_at),
                event.priority.as_str(),
                event.category.as_str(),
                event.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_events(&self, user_id: &str) -> Result<Vec<Event>, DatabaseError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE user_id = ?1 ORDER BY occurs_at"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_event)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_event(&self, id: &str) -> Result<Option<Event>, DatabaseError> {
        let conn = self.lock()?;
        let event = conn
            .query_row(
                &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
                params![id],
                row_to_event,
            )
            .optional()?;
        Ok(event)
    }

    /// Mark an event completed or open again.
    pub fn set_event_completed(&self, id: &str, completed: bool) -> Result<(), DatabaseError> {
        let completed_at = completed.then(|| Utc::now().to_rfc3339());
        let changed = self.lock()?.execute(
            "UPDATE events SET completed = ?2, completed_at = ?3 WHERE id = ?1",
            params![id, completed, completed_at],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("event {id}")));
        }
        Ok(())
    }

    pub fn delete_event(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .lock()?
            .execute("DELETE FROM events WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("event {id}")));
        }
        Ok(())
    }

    /// Open events whose occurrence falls in `[from, to)`.
    pub fn find_events_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, DatabaseError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE user_id = ?1 AND completed = 0 AND occurs_at IS NOT NULL
               AND occurs_at >= ?2 AND occurs_at < ?3
             ORDER BY occurs_at"
        ))?;
        let rows = stmt.query_map(
            params![user_id, from.to_rfc3339(), to.to_rfc3339()],
            row_to_event,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // === Achievements ===

    pub fn create_achievement(&self, achievement: &Achievement) -> Result<(), DatabaseError> {
        self.lock()?.execute(
            "INSERT INTO achievements (id, user_id, title, description, occurred_at, points, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                achievement.id,
                achievement.user_id,
                achievement.title,
                achievement.description,
                format_datetime_opt(achievement.occurred_at),
                achievement.points,
                achievement.category.as_str(),
                achievement.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_achievements(&self, user_id: &str) -> Result<Vec<Achievement>, DatabaseError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements
             WHERE user_id = ?1 ORDER BY occurred_at DESC"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_achievement)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_achievement(&self, id: &str) -> Result<Option<Achievement>, DatabaseError> {
        let conn = self.lock()?;
        let achievement = conn
            .query_row(
                &format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE id = ?1"),
                params![id],
                row_to_achievement,
            )
            .optional()?;
        Ok(achievement)
    }

    pub fn delete_achievement(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .lock()?
            .execute("DELETE FROM achievements WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("achievement {id}")));
        }
        Ok(())
    }
}

impl AgendaStore for Database {
    fn find_users(&self) -> Result<Vec<User>, DatabaseError> {
        self.list_users()
    }

    fn find_todos(&self, user_id: &str) -> Result<Vec<Todo>, DatabaseError> {
        self.list_todos(user_id)
    }

    fn find_events(&self, user_id: &str) -> Result<Vec<Event>, DatabaseError> {
        self.list_events(user_id)
    }

    fn find_achievements(&self, user_id: &str) -> Result<Vec<Achievement>, DatabaseError> {
        self.list_achievements(user_id)
    }
}
