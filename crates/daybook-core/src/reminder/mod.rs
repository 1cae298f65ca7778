//! Periodic reminder engine.
//!
//! Once per tick the scheduler snapshots `now`, enumerates users, and for
//! each user classifies outstanding todos and events against two time
//! windows (overdue, due within 24 hours), renders a consolidated digest,
//! and hands it to the notification sink. At most one notification per
//! user per tick; overlapping ticks are skipped, never queued.

pub mod classify;
pub mod digest;
pub mod scheduler;

pub use classify::{classify, Classified, DueItem, DUE_SOON_WINDOW_HOURS};
pub use digest::ReminderDigest;
pub use scheduler::{
    ReminderConfig, ReminderScheduler, SchedulerState, TickOutcome, TickReport,
};
