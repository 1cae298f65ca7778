//! Reminder scheduler: a fixed-cadence trigger with an Idle/Running
//! run-lock.
//!
//! The scheduler is an explicit object with a documented lifecycle:
//! construct it with a store, a sink, and a cadence; `start()` spawns the
//! tokio interval loop; `shutdown()` lets the in-flight batch finish its
//! current slice and then stops the loop. A trigger that fires while the
//! previous tick is still processing is counted and skipped -- never
//! queued -- so batches cannot pile up behind a slow mail transport.
//!
//! Per-user work inside a tick is independent and runs on a bounded
//! worker pool. Store reads and sink sends each carry their own timeout;
//! any per-user failure is logged and isolated from the rest of the
//! batch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::agenda::User;
use crate::error::DatabaseError;
use crate::notify::{NotificationSink, OutboundMessage};
use crate::reminder::digest::ReminderDigest;
use crate::store::AgendaStore;

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Minutes between ticks.
    pub cadence_minutes: u64,
    /// Upper bound on users processed concurrently within one tick.
    pub max_concurrent_users: usize,
    /// Timeout for one user's store reads.
    pub store_timeout_secs: u64,
    /// Timeout for one sink dispatch.
    pub send_timeout_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            cadence_minutes: 60,
            max_concurrent_users: 8,
            store_timeout_secs: 10,
            send_timeout_secs: 30,
        }
    }
}

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Running,
}

/// What one tick accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub users_processed: usize,
    pub digests_sent: usize,
    pub failures: usize,
}

/// Result of attempting a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick ran to completion.
    Completed(TickReport),
    /// A previous tick was still running; this trigger was a no-op.
    Skipped,
}

enum UserOutcome {
    Sent,
    Quiet,
    NoAddress,
    Failed,
}

/// Fixed-cadence reminder scheduler.
pub struct ReminderScheduler {
    store: Arc<dyn AgendaStore>,
    sink: Arc<dyn NotificationSink>,
    config: ReminderConfig,
    /// The run-lock. Set for the duration of one batch.
    running: AtomicBool,
    ticks_run: AtomicU64,
    ticks_skipped: AtomicU64,
    stop_signal: Notify,
}

impl ReminderScheduler {
    pub fn new(store: Arc<dyn AgendaStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self::with_config(store, sink, ReminderConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn AgendaStore>,
        sink: Arc<dyn NotificationSink>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            store,
            sink,
            config,
            running: AtomicBool::new(false),
            ticks_run: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
            stop_signal: Notify::new(),
        }
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        if self.running.load(Ordering::SeqCst) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Ticks that ran to completion.
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run.load(Ordering::SeqCst)
    }

    /// Triggers that found a batch still running and were skipped.
    pub fn ticks_skipped(&self) -> u64 {
        self.ticks_skipped.load(Ordering::SeqCst)
    }

    /// Attempt one tick now.
    ///
    /// Returns [`TickOutcome::Skipped`] without touching the store when a
    /// previous tick is still in flight.
    pub async fn tick(&self) -> TickOutcome {
        if self.running.swap(true, Ordering::SeqCst) {
            self.ticks_skipped.fetch_add(1, Ordering::SeqCst);
            debug!("reminder tick skipped; previous tick still running");
            return TickOutcome::Skipped;
        }

        let report = self.run_batch(Utc::now()).await;

        self.running.store(false, Ordering::SeqCst);
        self.ticks_run.fetch_add(1, Ordering::SeqCst);
        info!(
            users = report.users_processed,
            sent = report.digests_sent,
            failures = report.failures,
            "reminder tick complete"
        );
        TickOutcome::Completed(report)
    }

    /// Spawn the background interval loop.
    ///
    /// The first tick fires one full cadence after start, matching the
    /// original hourly trigger. Missed intervals are skipped, not
    /// queued.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                cadence_minutes = self.config.cadence_minutes,
                "reminder scheduler started"
            );
            let period = Duration::from_secs(self.config.cadence_minutes.max(1) * 60);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // tokio intervals complete immediately on first poll; consume
            // that so the first batch runs one cadence from now.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.tick().await;
                    }
                    _ = self.stop_signal.notified() => {
                        info!("reminder scheduler stopping");
                        break;
                    }
                }
            }
        })
    }

    /// Request a stop. An in-flight batch finishes its current slice
    /// before the loop exits; no new tick starts afterwards.
    pub fn shutdown(&self) {
        self.stop_signal.notify_one();
    }

    async fn run_batch(&self, now: DateTime<Utc>) -> TickReport {
        let store_timeout = Duration::from_secs(self.config.store_timeout_secs);
        let send_timeout = Duration::from_secs(self.config.send_timeout_secs);

        let users = match self.fetch_users(store_timeout).await {
            Ok(users) => users,
            Err(message) => {
                error!("cannot enumerate users: {message}");
                return TickReport {
                    users_processed: 0,
                    digests_sent: 0,
                    failures: 1,
                };
            }
        };

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_users.max(1)));
        let mut handles = Vec::with_capacity(users.len());

        for user in users {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            handles.push(tokio::spawn(process_user(
                Arc::clone(&self.store),
                Arc::clone(&self.sink),
                user,
                now,
                store_timeout,
                send_timeout,
                permit,
            )));
        }

        let mut report = TickReport::default();
        for handle in handles {
            report.users_processed += 1;
            match handle.await {
                Ok(UserOutcome::Sent) => report.digests_sent += 1,
                Ok(UserOutcome::Quiet) | Ok(UserOutcome::NoAddress) => {}
                Ok(UserOutcome::Failed) => report.failures += 1,
                Err(e) => {
                    error!("user worker panicked: {e}");
                    report.failures += 1;
                }
            }
        }
        report
    }

    async fn fetch_users(&self, timeout: Duration) -> Result<Vec<User>, String> {
        let store = Arc::clone(&self.store);
        let fetch = tokio::task::spawn_blocking(move || store.find_users());
        match tokio::time::timeout(timeout, fetch).await {
            Ok(Ok(Ok(users))) => Ok(users),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Err(e)) => Err(format!("user query task failed: {e}")),
            Err(_) => Err(format!("user query timed out after {}s", timeout.as_secs())),
        }
    }
}

/// Process one user: fetch, classify, render, dispatch.
///
/// Every failure path logs and returns; nothing here can abort the batch.
async fn process_user(
    store: Arc<dyn AgendaStore>,
    sink: Arc<dyn NotificationSink>,
    user: User,
    now: DateTime<Utc>,
    store_timeout: Duration,
    send_timeout: Duration,
    _permit: OwnedSemaphorePermit,
) -> UserOutcome {
    let user_id = user.id.clone();
    let fetch_store = Arc::clone(&store);
    let fetch = tokio::task::spawn_blocking(move || {
        let todos = fetch_store.find_todos(&user_id)?;
        let events = fetch_store.find_events(&user_id)?;
        Ok::<_, DatabaseError>((todos, events))
    });

    let (todos, events) = match tokio::time::timeout(store_timeout, fetch).await {
        Ok(Ok(Ok(pair))) => pair,
        Ok(Ok(Err(e))) => {
            warn!(user = %user.id, "store read failed, skipping user: {e}");
            return UserOutcome::Failed;
        }
        Ok(Err(e)) => {
            warn!(user = %user.id, "store read task failed, skipping user: {e}");
            return UserOutcome::Failed;
        }
        Err(_) => {
            warn!(
                user = %user.id,
                "store read timed out after {}s, skipping user",
                store_timeout.as_secs()
            );
            return UserOutcome::Failed;
        }
    };

    let digest = ReminderDigest::build(&user.id, todos, events, now);
    if digest.is_empty() {
        return UserOutcome::Quiet;
    }

    let Some(to) = user.email.clone() else {
        debug!(user = %user.id, "no contact address; digest not dispatched");
        return UserOutcome::NoAddress;
    };

    let message = OutboundMessage {
        to,
        subject: digest.subject().to_string(),
        text: digest.render_text(),
        html: digest.render_html(),
    };

    match tokio::time::timeout(send_timeout, sink.send(&message)).await {
        Ok(Ok(())) => {
            info!(user = %user.id, items = digest.item_count(), "reminder digest sent");
            UserOutcome::Sent
        }
        Ok(Err(e)) => {
            warn!(user = %user.id, "delivery failed: {e}");
            UserOutcome::Failed
        }
        Err(_) => {
            warn!(
                user = %user.id,
                "delivery timed out after {}s",
                send_timeout.as_secs()
            );
            UserOutcome::Failed
        }
    }
}
