//! Aggregate point and category statistics, and the per-user query
//! surface exposed to the dashboard/API layer.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::agenda::{Achievement, AchievementCategory};
use crate::error::DatabaseError;
use crate::stats::streak::{streak_from_achievements, StreakReport};
use crate::store::AgendaStore;

/// Number of achievements in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: AchievementCategory,
    pub count: u64,
}

/// Full statistics summary for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementSummary {
    pub total_points: u64,
    pub streak: StreakReport,
    pub categories: Vec<CategoryCount>,
}

/// Sum of points across all achievements.
pub fn total_points(achievements: &[Achievement]) -> u64 {
    achievements.iter().map(|a| u64::from(a.points)).sum()
}

/// Achievement counts per category, ordered by descending count with
/// ties broken by category name so output is deterministic.
pub fn category_counts(achievements: &[Achievement]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<AchievementCategory, u64> = BTreeMap::new();
    for ach in achievements {
        *counts.entry(ach.category).or_insert(0) += 1;
    }

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    out
}

/// Streak for one user, recomputed from a fresh snapshot.
pub fn streak_for_user(
    store: &dyn AgendaStore,
    user_id: &str,
    today: NaiveDate,
) -> Result<StreakReport, DatabaseError> {
    let achievements = store.find_achievements(user_id)?;
    Ok(streak_from_achievements(&achievements, today))
}

/// Total points for one user.
pub fn total_points_for_user(
    store: &dyn AgendaStore,
    user_id: &str,
) -> Result<u64, DatabaseError> {
    let achievements = store.find_achievements(user_id)?;
    Ok(total_points(&achievements))
}

/// Category counts for one user.
pub fn category_counts_for_user(
    store: &dyn AgendaStore,
    user_id: &str,
) -> Result<Vec<CategoryCount>, DatabaseError> {
    let achievements = store.find_achievements(user_id)?;
    Ok(category_counts(&achievements))
}

/// Combined summary for one user. Reads the snapshot once and derives
/// all three statistics from it.
pub fn summary_for_user(
    store: &dyn AgendaStore,
    user_id: &str,
    today: NaiveDate,
) -> Result<AchievementSummary, DatabaseError> {
    let achievements = store.find_achievements(user_id)?;
    Ok(AchievementSummary {
        total_points: total_points(&achievements),
        streak: streak_from_achievements(&achievements, today),
        categories: category_counts(&achievements),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ach(category: AchievementCategory, points: u32) -> Achievement {
        Achievement::new("user-1", "test", Utc::now())
            .with_points(points)
            .with_category(category)
    }

    #[test]
    fn total_points_sums_all_records() {
        let achs = vec![
            ach(AchievementCategory::Work, 10),
            ach(AchievementCategory::Health, 25),
            ach(AchievementCategory::Work, 5),
        ];
        assert_eq!(total_points(&achs), 40);
    }

    #[test]
    fn total_points_empty_is_zero() {
        assert_eq!(total_points(&[]), 0);
    }

    #[test]
    fn category_counts_ordered_desc_then_name() {
        let achs = vec![
            ach(AchievementCategory::Work, 10),
            ach(AchievementCategory::Work, 10),
            ach(AchievementCategory::Health, 10),
            ach(AchievementCategory::Health, 10),
            ach(AchievementCategory::Academic, 10),
        ];
        let counts = category_counts(&achs);
        // Two ties at count=2 resolve alphabetically: health before work.
        assert_eq!(counts[0].category, AchievementCategory::Health);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].category, AchievementCategory::Work);
        assert_eq!(counts[1].count, 2);
        assert_eq!(counts[2].category, AchievementCategory::Academic);
        assert_eq!(counts[2].count, 1);
    }
}
