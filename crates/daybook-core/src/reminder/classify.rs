//! Two-window classification of due items.
//!
//! An open item is overdue when its timestamp is strictly before `now`,
//! and due-soon when it falls in the half-open window `[now, now + 24h)`.
//! The windows are disjoint: an item sits in exactly one of
//! {overdue, due-soon, neither}. Completed items never appear, and items
//! without a usable timestamp are dropped with a logged warning.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::agenda::{Event, Todo};

/// Width of the due-soon window, in hours.
pub const DUE_SOON_WINDOW_HOURS: i64 = 24;

/// Anything with an id, a due timestamp, and a completion flag.
pub trait DueItem {
    fn item_id(&self) -> &str;
    fn due_at(&self) -> Option<DateTime<Utc>>;
    /// Whether the item is already done/completed and out of scope.
    fn is_closed(&self) -> bool;
}

impl DueItem for Todo {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    fn is_closed(&self) -> bool {
        self.done
    }
}

impl DueItem for Event {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn due_at(&self) -> Option<DateTime<Utc>> {
        self.occurs_at
    }

    fn is_closed(&self) -> bool {
        self.completed
    }
}

/// Result of one classification pass.
#[derive(Debug, Clone)]
pub struct Classified<T> {
    /// Open items with a timestamp strictly before `now`, earliest first.
    pub overdue: Vec<T>,
    /// Open items inside `[now, now + 24h)`, soonest first.
    pub due_soon: Vec<T>,
}

impl<T> Default for Classified<T> {
    fn default() -> Self {
        Self {
            overdue: Vec::new(),
            due_soon: Vec::new(),
        }
    }
}

/// Partition open items into overdue and due-soon sets.
///
/// Boundary semantics are closed-open: an item exactly at `now` is
/// due-soon, and an item exactly at `now + 24h` belongs to neither set
/// this tick. Output is ordered ascending by timestamp with ties broken
/// by item id.
pub fn classify<T: DueItem>(items: Vec<T>, now: DateTime<Utc>) -> Classified<T> {
    let horizon = now + Duration::hours(DUE_SOON_WINDOW_HOURS);
    let mut out = Classified::default();

    for item in items {
        if item.is_closed() {
            continue;
        }
        let Some(due) = item.due_at() else {
            warn!(item_id = %item.item_id(), "item has no usable timestamp; unclassifiable");
            continue;
        };
        if due < now {
            out.overdue.push(item);
        } else if due < horizon {
            out.due_soon.push(item);
        }
    }

    sort_by_due(&mut out.overdue);
    sort_by_due(&mut out.due_soon);
    out
}

fn sort_by_due<T: DueItem>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.due_at()
            .cmp(&b.due_at())
            .then_with(|| a.item_id().cmp(b.item_id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo_due(id: &str, due: Option<DateTime<Utc>>, done: bool) -> Todo {
        let mut todo = Todo::new("user-1", format!("todo {id}"), Utc::now());
        todo.id = id.to_string();
        todo.due_at = due;
        todo.done = done;
        todo
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let now = Utc::now();
        let items = vec![
            todo_due("past", Some(now - Duration::hours(2)), false),
            todo_due("soon", Some(now + Duration::hours(2)), false),
            todo_due("far", Some(now + Duration::hours(48)), false),
        ];
        let classified = classify(items, now);
        assert_eq!(classified.overdue.len(), 1);
        assert_eq!(classified.overdue[0].id, "past");
        assert_eq!(classified.due_soon.len(), 1);
        assert_eq!(classified.due_soon[0].id, "soon");
    }

    #[test]
    fn completed_items_never_appear() {
        let now = Utc::now();
        let items = vec![
            todo_due("a", Some(now - Duration::hours(1)), true),
            todo_due("b", Some(now + Duration::hours(1)), true),
        ];
        let classified = classify(items, now);
        assert!(classified.overdue.is_empty());
        assert!(classified.due_soon.is_empty());
    }

    #[test]
    fn item_exactly_at_now_is_due_soon() {
        let now = Utc::now();
        let classified = classify(vec![todo_due("edge", Some(now), false)], now);
        assert!(classified.overdue.is_empty());
        assert_eq!(classified.due_soon.len(), 1);
    }

    #[test]
    fn item_exactly_at_horizon_is_excluded() {
        let now = Utc::now();
        let at_horizon = now + Duration::hours(DUE_SOON_WINDOW_HOURS);
        let classified = classify(vec![todo_due("edge", Some(at_horizon), false)], now);
        assert!(classified.overdue.is_empty());
        assert!(classified.due_soon.is_empty());
    }

    #[test]
    fn missing_timestamp_is_dropped() {
        let now = Utc::now();
        let classified = classify(vec![todo_due("broken", None, false)], now);
        assert!(classified.overdue.is_empty());
        assert!(classified.due_soon.is_empty());
    }

    #[test]
    fn output_ordered_by_timestamp_then_id() {
        let now = Utc::now();
        let same_instant = now - Duration::hours(3);
        let items = vec![
            todo_due("b", Some(same_instant), false),
            todo_due("a", Some(same_instant), false),
            todo_due("c", Some(now - Duration::hours(6)), false),
        ];
        let classified = classify(items, now);
        let ids: Vec<&str> = classified.overdue.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn events_classify_on_completed_flag() {
        let now = Utc::now();
        let mut open = Event::new("user-1", "review", now - Duration::hours(1));
        open.id = "open".into();
        let mut closed = Event::new("user-1", "retro", now - Duration::hours(1));
        closed.id = "closed".into();
        closed.completed = true;

        let classified = classify(vec![open, closed], now);
        assert_eq!(classified.overdue.len(), 1);
        assert_eq!(classified.overdue[0].id, "open");
    }
}
