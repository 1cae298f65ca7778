//! Achievement log commands.

use chrono::Utc;
use clap::Subcommand;
use daybook_core::storage::Database;
use daybook_core::{Achievement, AchievementCategory};

use crate::common::parse_datetime;

#[derive(Subcommand)]
pub enum AchievementAction {
    /// Record an achievement
    Add {
        /// Owning user ID
        user_id: String,
        /// Achievement title
        title: String,
        /// When it happened (default: now)
        #[arg(long)]
        on: Option<String>,
        /// Points awarded, 1..=1000 (default: 10)
        #[arg(long, default_value = "10")]
        points: u32,
        /// Category: academic, personal, work, health, social, creative, learning, other
        #[arg(long, default_value = "personal")]
        category: String,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
    },
    /// List a user's achievements, most recent first
    List {
        /// Owning user ID
        user_id: String,
    },
    /// Delete an achievement
    Delete {
        /// Achievement ID
        id: String,
    },
}

pub fn run(action: AchievementAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        AchievementAction::Add {
            user_id,
            title,
            on,
            points,
            category,
            description,
        } => {
            let occurred_at = match on {
                Some(raw) => parse_datetime(&raw)?,
                None => Utc::now(),
            };
            let mut achievement = Achievement::new(user_id, title, occurred_at)
                .with_points(points)
                .with_category(AchievementCategory::parse(&category));
            achievement.description = description;
            achievement.validate()?;
            db.create_achievement(&achievement)?;
            println!("Achievement recorded: {}", achievement.id);
            println!("{}", serde_json::to_string_pretty(&achievement)?);
        }
        AchievementAction::List { user_id } => {
            let achievements = db.list_achievements(&user_id)?;
            println!("{}", serde_json::to_string_pretty(&achievements)?);
        }
        AchievementAction::Delete { id } => {
            db.delete_achievement(&id)?;
            println!("Achievement deleted: {id}");
        }
    }
    Ok(())
}
