//! # Daybook Core Library
//!
//! This library provides the core business logic for Daybook, a personal
//! productivity tracker for todos, calendar events, and achievements. It
//! implements a CLI-first philosophy where all operations are available
//! via a standalone CLI binary, with any GUI or API layer being a thin
//! shell over the same core library.
//!
//! ## Architecture
//!
//! - **Agenda**: entity types for users, todos, events, and achievements
//! - **Storage**: SQLite-based agenda storage and TOML-based configuration
//! - **Stats**: streak, point, and category statistics recomputed per call
//! - **Reminder**: fixed-cadence scheduler that classifies outstanding
//!   items into overdue/due-soon windows and dispatches one consolidated
//!   digest per user per tick
//! - **Notify**: notification sinks (SMTP mail, JSON webhook)
//!
//! ## Key Components
//!
//! - [`Database`]: agenda persistence and the default [`AgendaStore`]
//! - [`ReminderScheduler`]: the reminder engine with its Idle/Running run-lock
//! - [`ReminderDigest`]: per-user classified digest with text/HTML renderings
//! - [`compute_streak`]: pure streak computation over achievement dates
//! - [`NotificationSink`]: delivery capability consumed by the scheduler

pub mod agenda;
pub mod error;
pub mod notify;
pub mod reminder;
pub mod stats;
pub mod storage;
pub mod store;

pub use agenda::{Achievement, AchievementCategory, Event, ItemCategory, Priority, Todo, User};
pub use error::{ConfigError, CoreError, DatabaseError, NotifyError, Result, ValidationError};
pub use notify::{sink_from_config, NotificationSink, OutboundMessage, SmtpMailer, WebhookSink};
pub use reminder::{
    classify, Classified, DueItem, ReminderConfig, ReminderDigest, ReminderScheduler,
    SchedulerState, TickOutcome, TickReport,
};
pub use stats::{compute_streak, streak_from_achievements, AchievementSummary, StreakReport};
pub use storage::{Config, Database, MailConfig, SinkKind};
pub use store::AgendaStore;
