//! Calendar event commands.

use chrono::{Duration, Utc};
use clap::Subcommand;
use daybook_core::reminder::DUE_SOON_WINDOW_HOURS;
use daybook_core::storage::Database;
use daybook_core::{Event, ItemCategory, Priority};

use crate::common::parse_datetime;

#[derive(Subcommand)]
pub enum EventAction {
    /// Create a new event
    Add {
        /// Owning user ID
        user_id: String,
        /// Event title
        title: String,
        /// Occurrence timestamp (RFC3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')
        #[arg(long)]
        at: String,
        /// Duration in minutes (default: 60)
        #[arg(long, default_value = "60")]
        duration: i64,
        /// Location
        #[arg(long)]
        location: Option<String>,
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
    /// List a user's events
    List {
        /// Owning user ID
        user_id: String,
    },
    /// Mark an event completed
    Complete {
        /// Event ID
        id: String,
    },
    /// Delete an event
    Delete {
        /// Event ID
        id: String,
    },
    /// Open events occurring within the next 24 hours
    Upcoming {
        /// Owning user ID
        user_id: String,
    },
}

pub fn run(action: EventAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        EventAction::Add {
            user_id,
            title,
            at,
            duration,
            location,
            description,
            priority,
            category,
        } => {
            let occurs_at = parse_datetime(&at)?;
            let mut event = Event::new(user_id, title, occurs_at);
            event.duration_minutes = duration;
            event.location = location;
            event.description = description;
            event.priority = Priority::parse(&priority);
            event.category = ItemCategory::parse(&category);
            db.create_event(&event)?;
            println!("Event created: {}", event.id);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        EventAction::List { user_id } => {
            let events = db.list_events(&user_id)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        EventAction::Complete { id } => {
            db.set_event_completed(&id, true)?;
            println!("Event completed: {id}");
        }
        EventAction::Delete { id } => {
            db.delete_event(&id)?;
            println!("Event deleted: {id}");
        }
        EventAction::Upcoming { user_id } => {
            let now = Utc::now();
            let events = db.find_events_between(
                &user_id,
                now,
                now + Duration::hours(DUE_SOON_WINDOW_HOURS),
            )?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }
    Ok(())
}
