//! Per-user reminder digest and its plain/rich renderings.
//!
//! A digest is transient: it exists only while one tick processes one
//! user, and is never persisted. Rendering is deterministic for a given
//! digest so repeated ticks over unchanged data produce byte-identical
//! notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agenda::{Event, Todo};
use crate::reminder::classify::classify;

/// Subject line used for every reminder notification.
pub const DIGEST_SUBJECT: &str = "Daybook: Task & Event Reminders";

/// The four classified sets for one user at one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderDigest {
    pub user_id: String,
    /// The tick's snapshot of `now`.
    pub generated_at: DateTime<Utc>,
    pub overdue_todos: Vec<Todo>,
    pub due_soon_todos: Vec<Todo>,
    pub overdue_events: Vec<Event>,
    pub due_soon_events: Vec<Event>,
}

impl ReminderDigest {
    /// Classify a user's todos and events against the snapshot `now`.
    pub fn build(user_id: &str, todos: Vec<Todo>, events: Vec<Event>, now: DateTime<Utc>) -> Self {
        let todos = classify(todos, now);
        let events = classify(events, now);
        Self {
            user_id: user_id.to_string(),
            generated_at: now,
            overdue_todos: todos.overdue,
            due_soon_todos: todos.due_soon,
            overdue_events: events.overdue,
            due_soon_events: events.due_soon,
        }
    }

    /// True when all four sets are empty; no notification is produced.
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Total number of items across the four sets.
    pub fn item_count(&self) -> usize {
        self.overdue_todos.len()
            + self.due_soon_todos.len()
            + self.overdue_events.len()
            + self.due_soon_events.len()
    }

    pub fn subject(&self) -> &'static str {
        DIGEST_SUBJECT
    }

    /// Deterministic plain-text rendering.
    pub fn render_text(&self) -> String {
        let mut body = String::new();

        if !self.overdue_todos.is_empty() {
            body.push_str("Overdue Todos:\n");
            for todo in &self.overdue_todos {
                body.push_str(&format!(
                    "- {} (was due {})\n",
                    todo.text,
                    format_ts(todo.due_at)
                ));
            }
            body.push('\n');
        }
        if !self.due_soon_todos.is_empty() {
            body.push_str("Todos Due Soon (next 24h):\n");
            for todo in &self.due_soon_todos {
                body.push_str(&format!("- {} (due {})\n", todo.text, format_ts(todo.due_at)));
            }
            body.push('\n');
        }
        if !self.overdue_events.is_empty() {
            body.push_str("Overdue Events:\n");
            for event in &self.overdue_events {
                body.push_str(&format!(
                    "- {} (was on {})\n",
                    event.title,
                    format_ts(event.occurs_at)
                ));
            }
            body.push('\n');
        }
        if !self.due_soon_events.is_empty() {
            body.push_str("Events Coming Up (next 24h):\n");
            for event in &self.due_soon_events {
                body.push_str(&format!(
                    "- {} (on {})\n",
                    event.title,
                    format_ts(event.occurs_at)
                ));
            }
            body.push('\n');
        }

        body
    }

    /// Deterministic rich-text (HTML) rendering.
    pub fn render_html(&self) -> String {
        let mut html = String::from(
            "<div style=\"font-family: Arial, sans-serif; color: #222;\">\
             <h2 style=\"color: #2a7ae2;\">Daybook: Task &amp; Event Reminders</h2>",
        );

        if !self.overdue_todos.is_empty() {
            html.push_str("<h3 style='color: #d32f2f;'>Overdue Todos</h3><ul>");
            for todo in &self.overdue_todos {
                html.push_str(&format!(
                    "<li><b>{}</b> <span style='color:#d32f2f;'>(was due {})</span></li>",
                    escape(&todo.text),
                    format_ts(todo.due_at)
                ));
            }
            html.push_str("</ul>");
        }
        if !self.due_soon_todos.is_empty() {
            html.push_str("<h3 style='color: #fbc02d;'>Todos Due Soon (next 24h)</h3><ul>");
            for todo in &self.due_soon_todos {
                html.push_str(&format!(
                    "<li><b>{}</b> <span style='color:#fbc02d;'>(due {})</span></li>",
                    escape(&todo.text),
                    format_ts(todo.due_at)
                ));
            }
            html.push_str("</ul>");
        }
        if !self.overdue_events.is_empty() {
            html.push_str("<h3 style='color: #d32f2f;'>Overdue Events</h3><ul>");
            for event in &self.overdue_events {
                html.push_str(&format!(
                    "<li><b>{}</b> <span style='color:#d32f2f;'>(was on {})</span></li>",
                    escape(&event.title),
                    format_ts(event.occurs_at)
                ));
            }
            html.push_str("</ul>");
        }
        if !self.due_soon_events.is_empty() {
            html.push_str("<h3 style='color: #388e3c;'>Events Coming Up (next 24h)</h3><ul>");
            for event in &self.due_soon_events {
                html.push_str(&format!(
                    "<li><b>{}</b> <span style='color:#388e3c;'>(on {})</span></li>",
                    escape(&event.title),
                    format_ts(event.occurs_at)
                ));
            }
            html.push_str("</ul>");
        }

        html.push_str(
            "<hr style='margin:32px 0 8px 0;'>\
             <div style='font-size:12px;color:#888;'>\
             This is an automated reminder from your Daybook.</div></div>",
        );
        html
    }
}

fn format_ts(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "unknown".to_string(),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
