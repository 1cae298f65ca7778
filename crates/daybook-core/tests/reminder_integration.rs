//! End-to-end reminder engine tests over a real (in-memory) database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use daybook_core::{
    Achievement, AgendaStore, Database, Event, NotificationSink, NotifyError, OutboundMessage,
    ReminderConfig, ReminderScheduler, SchedulerState, TickOutcome, Todo, User,
};

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<OutboundMessage>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn test_config() -> ReminderConfig {
    ReminderConfig {
        cadence_minutes: 60,
        max_concurrent_users: 4,
        store_timeout_secs: 5,
        send_timeout_secs: 5,
    }
}

fn seed_busy_user(db: &Database) -> User {
    let user = User::new("Busy User", Some("busy@example.com".to_string()));
    db.create_user(&user).unwrap();
    let now = Utc::now();

    for (text, hours_ago) in [("lab report", 30), ("reading list", 10), ("flashcards", 2)] {
        db.create_todo(&Todo::new(
            &user.id,
            text,
            now - Duration::hours(hours_ago),
        ))
        .unwrap();
    }
    db.create_event(&Event::new(
        &user.id,
        "missed lecture",
        now - Duration::hours(5),
    ))
    .unwrap();
    db.create_event(&Event::new(&user.id, "exam", now + Duration::hours(20)))
        .unwrap();
    db.create_event(&Event::new(
        &user.id,
        "study group",
        now + Duration::hours(3),
    ))
    .unwrap();

    user
}

#[tokio::test]
async fn busy_user_receives_one_digest_with_all_items() {
    let db = Arc::new(Database::open_memory().unwrap());
    seed_busy_user(&db);

    let sink = Arc::new(RecordingSink::default());
    let scheduler = ReminderScheduler::with_config(db.clone(), sink.clone(), test_config());

    let TickOutcome::Completed(report) = scheduler.tick().await else {
        panic!("tick must complete");
    };
    assert_eq!(report.users_processed, 1);
    assert_eq!(report.digests_sent, 1);
    assert_eq!(report.failures, 0);

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "busy@example.com");
    for needle in [
        "lab report",
        "reading list",
        "flashcards",
        "missed lecture",
        "exam",
        "study group",
    ] {
        assert!(
            sent[0].text.contains(needle),
            "digest missing '{needle}':\n{}",
            sent[0].text
        );
        assert!(sent[0].html.contains(needle));
    }
}

#[tokio::test]
async fn second_tick_over_unchanged_data_resends_identical_digest() {
    let db = Arc::new(Database::open_memory().unwrap());
    seed_busy_user(&db);

    let sink = Arc::new(RecordingSink::default());
    let scheduler = ReminderScheduler::with_config(db, sink.clone(), test_config());

    scheduler.tick().await;
    scheduler.tick().await;

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, sent[1].to);
    assert_eq!(sent[0].subject, sent[1].subject);
    // Same items listed both times; only the snapshot timestamps differ.
    for needle in ["lab report", "missed lecture", "exam"] {
        assert!(sent[0].text.contains(needle));
        assert!(sent[1].text.contains(needle));
    }
}

#[tokio::test]
async fn quiet_and_done_items_produce_no_notification() {
    let db = Arc::new(Database::open_memory().unwrap());
    let user = User::new("Quiet User", Some("quiet@example.com".to_string()));
    db.create_user(&user).unwrap();
    let now = Utc::now();

    // A finished todo, a completed event, and something far in the future.
    let mut done = Todo::new(&user.id, "already done", now - Duration::hours(1));
    done.done = true;
    db.create_todo(&done).unwrap();
    let mut past_event = Event::new(&user.id, "wrapped up", now - Duration::hours(2));
    past_event.completed = true;
    db.create_event(&past_event).unwrap();
    db.create_todo(&Todo::new(&user.id, "next month", now + Duration::days(30)))
        .unwrap();

    let sink = Arc::new(RecordingSink::default());
    let scheduler = ReminderScheduler::with_config(db, sink.clone(), test_config());

    let TickOutcome::Completed(report) = scheduler.tick().await else {
        panic!("tick must complete");
    };
    assert_eq!(report.users_processed, 1);
    assert_eq!(report.digests_sent, 0);
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn multiple_users_are_processed_independently() {
    let db = Arc::new(Database::open_memory().unwrap());
    let now = Utc::now();

    let with_items = User::new("A", Some("a@example.com".to_string()));
    db.create_user(&with_items).unwrap();
    db.create_todo(&Todo::new(&with_items.id, "overdue", now - Duration::hours(1)))
        .unwrap();

    let no_address = User::new("B", None);
    db.create_user(&no_address).unwrap();
    db.create_todo(&Todo::new(&no_address.id, "unreachable", now - Duration::hours(1)))
        .unwrap();

    let nothing_due = User::new("C", Some("c@example.com".to_string()));
    db.create_user(&nothing_due).unwrap();

    let sink = Arc::new(RecordingSink::default());
    let scheduler = ReminderScheduler::with_config(db, sink.clone(), test_config());

    let TickOutcome::Completed(report) = scheduler.tick().await else {
        panic!("tick must complete");
    };
    assert_eq!(report.users_processed, 3);
    assert_eq!(report.digests_sent, 1);
    assert_eq!(report.failures, 0);

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@example.com");
}

#[tokio::test]
async fn achievements_never_appear_in_digests() {
    let db = Arc::new(Database::open_memory().unwrap());
    let user = User::new("Achiever", Some("ach@example.com".to_string()));
    db.create_user(&user).unwrap();
    let now = Utc::now();

    db.create_achievement(&Achievement::new(&user.id, "hidden trophy", now))
        .unwrap();
    db.create_todo(&Todo::new(&user.id, "visible todo", now - Duration::hours(1)))
        .unwrap();

    let sink = Arc::new(RecordingSink::default());
    let scheduler = ReminderScheduler::with_config(db, sink.clone(), test_config());
    scheduler.tick().await;

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("visible todo"));
    assert!(!sent[0].text.contains("hidden trophy"));
}

#[tokio::test]
async fn scheduler_returns_to_idle_after_tick() {
    let db = Arc::new(Database::open_memory().unwrap());
    let sink = Arc::new(RecordingSink::default());
    let scheduler = ReminderScheduler::with_config(db, sink, test_config());

    assert_eq!(scheduler.state(), SchedulerState::Idle);
    scheduler.tick().await;
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(scheduler.ticks_run(), 1);
    assert_eq!(scheduler.ticks_skipped(), 0);
}

// Sanity check that the database satisfies the store trait object used
// by the engines.
#[test]
fn database_is_an_agenda_store() {
    let db = Database::open_memory().unwrap();
    let store: &dyn AgendaStore = &db;
    assert!(store.find_users().unwrap().is_empty());
}
