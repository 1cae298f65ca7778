//! Reminder engine control.

use std::sync::Arc;

use chrono::Utc;
use clap::Subcommand;
use daybook_core::notify::sink_from_config;
use daybook_core::reminder::{ReminderDigest, ReminderScheduler, TickOutcome};
use daybook_core::storage::{Config, Database};

#[derive(Subcommand)]
pub enum RemindAction {
    /// Run one reminder tick now
    Run,
    /// Run the scheduler loop until interrupted
    Start,
    /// Render a user's digest without sending anything
    Preview {
        /// Owning user ID
        user_id: String,
    },
}

pub fn run(action: RemindAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RemindAction::Run => runtime()?.block_on(run_once()),
        RemindAction::Start => runtime()?.block_on(run_daemon()),
        RemindAction::Preview { user_id } => preview(&user_id),
    }
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

fn build_scheduler(config: &Config) -> Result<Arc<ReminderScheduler>, Box<dyn std::error::Error>> {
    let db = Arc::new(Database::open()?);
    let sink = sink_from_config(&config.mail)?;
    Ok(Arc::new(ReminderScheduler::with_config(
        db,
        sink,
        config.reminder.to_engine_config(),
    )))
}

async fn run_once() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = Config::load()?;
    let scheduler = build_scheduler(&config)?;

    match scheduler.tick().await {
        TickOutcome::Completed(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        TickOutcome::Skipped => println!("tick skipped: scheduler already running"),
    }
    Ok(())
}

async fn run_daemon() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = Config::load()?;
    if !config.reminder.enabled {
        println!("reminders are disabled in config; nothing to do");
        return Ok(());
    }

    let scheduler = build_scheduler(&config)?;
    let handle = Arc::clone(&scheduler).start();

    tokio::signal::ctrl_c().await?;
    scheduler.shutdown();
    handle.await?;
    Ok(())
}

fn preview(user_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let todos = db.list_todos(user_id)?;
    let events = db.list_events(user_id)?;
    let digest = ReminderDigest::build(user_id, todos, events, Utc::now());

    if digest.is_empty() {
        println!("nothing due or overdue for {user_id}");
    } else {
        print!("{}", digest.render_text());
    }
    Ok(())
}
