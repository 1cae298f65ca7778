//! Todo management commands.

use chrono::{Duration, Utc};
use clap::Subcommand;
use daybook_core::reminder::DUE_SOON_WINDOW_HOURS;
use daybook_core::storage::Database;
use daybook_core::{ItemCategory, Priority, Todo};

use crate::common::parse_datetime;

#[derive(Subcommand)]
pub enum TodoAction {
    /// Create a new todo
    Add {
        /// Owning user ID
        user_id: String,
        /// Todo text
        text: String,
        /// Due timestamp (RFC3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')
        #[arg(long)]
        due: String,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
        /// Priority: low, medium, high, urgent (default: medium)
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Category: academic, personal, work, health, social, other
        #[arg(long, default_value = "personal")]
        category: String,
    },
    /// List a user's todos
    List {
        /// Owning user ID
        user_id: String,
        /// Only show todos that are not done
        #[arg(long)]
        open: bool,
    },
    /// Mark a todo done
    Done {
        /// Todo ID
        id: String,
    },
    /// Reopen a done todo
    Reopen {
        /// Todo ID
        id: String,
    },
    /// Delete a todo
    Delete {
        /// Todo ID
        id: String,
    },
    /// Open todos due within the next 24 hours
    DueSoon {
        /// Owning user ID
        user_id: String,
    },
}

pub fn run(action: TodoAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        TodoAction::Add {
            user_id,
            text,
            due,
            description,
            priority,
            category,
        } => {
            let due_at = parse_datetime(&due)?;
            let mut todo = Todo::new(user_id, text, due_at);
            todo.description = description;
            todo.priority = Priority::parse(&priority);
            todo.category = ItemCategory::parse(&category);
            db.create_todo(&todo)?;
            println!("Todo created: {}", todo.id);
            println!("{}", serde_json::to_string_pretty(&todo)?);
        }
        TodoAction::List { user_id, open } => {
            let todos = db.list_todos(&user_id)?;
            let filtered: Vec<_> = todos.into_iter().filter(|t| !open || !t.done).collect();
            println!("{}", serde_json::to_string_pretty(&filtered)?);
        }
        TodoAction::Done { id } => {
            db.set_todo_done(&id, true)?;
            println!("Todo done: {id}");
        }
        TodoAction::Reopen { id } => {
            db.set_todo_done(&id, false)?;
            println!("Todo reopened: {id}");
        }
        TodoAction::Delete { id } => {
            db.delete_todo(&id)?;
            println!("Todo deleted: {id}");
        }
        TodoAction::DueSoon { user_id } => {
            let now = Utc::now();
            let todos =
                db.find_todos_between(&user_id, now, now + Duration::hours(DUE_SOON_WINDOW_HOURS))?;
            println!("{}", serde_json::to_string_pretty(&todos)?);
        }
    }
    Ok(())
}
