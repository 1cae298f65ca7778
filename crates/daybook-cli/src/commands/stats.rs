//! Achievement statistics commands.

use chrono::Utc;
use clap::Subcommand;
use daybook_core::stats::{
    category_counts_for_user, streak_for_user, summary_for_user, total_points_for_user,
};
use daybook_core::storage::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current and best achievement streak
    Streak {
        /// Owning user ID
        user_id: String,
    },
    /// Total points
    Points {
        /// Owning user ID
        user_id: String,
    },
    /// Achievement counts per category
    Categories {
        /// Owning user ID
        user_id: String,
    },
    /// Combined summary
    Summary {
        /// Owning user ID
        user_id: String,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let today = Utc::now().date_naive();

    match action {
        StatsAction::Streak { user_id } => {
            let report = streak_for_user(&db, &user_id, today)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Points { user_id } => {
            let points = total_points_for_user(&db, &user_id)?;
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
        StatsAction::Categories { user_id } => {
            let counts = category_counts_for_user(&db, &user_id)?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
        StatsAction::Summary { user_id } => {
            let summary = summary_for_user(&db, &user_id, today)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
