//! Achievement statistics: streaks, points, and category breakdowns.
//!
//! Every query here is a pure function over an in-memory snapshot,
//! recomputed on each call. Nothing is cached or incrementally updated,
//! so results are always consistent with the entity set they were
//! computed from.

mod streak;
mod summary;

pub use streak::{achievement_dates, compute_streak, streak_from_achievements, StreakReport};
pub use summary::{
    category_counts, category_counts_for_user, streak_for_user, summary_for_user, total_points,
    total_points_for_user, AchievementSummary, CategoryCount,
};
