//! Agenda entity types: users, todos, calendar events, and achievements.
//!
//! All entities carry string UUIDs and UTC timestamps. Due/occurrence
//! timestamps are `Option` because rows read back from storage may carry
//! malformed dates; those load as `None` and are excluded from streak and
//! reminder computations rather than failing the whole query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user who owns todos, events, and achievements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Contact address for reminder digests. Users without one are
    /// skipped at dispatch time.
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email,
            created_at: Utc::now(),
        }
    }
}

/// Priority of a todo or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "low" => Priority::Low,
            "high" => Priority::High,
            "urgent" => Priority::Urgent,
            _ => Priority::Medium,
        }
    }
}

/// Category of a todo or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Academic,
    #[default]
    Personal,
    Work,
    Health,
    Social,
    Other,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Academic => "academic",
            ItemCategory::Personal => "personal",
            ItemCategory::Work => "work",
            ItemCategory::Health => "health",
            ItemCategory::Social => "social",
            ItemCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "academic" => ItemCategory::Academic,
            "work" => ItemCategory::Work,
            "health" => ItemCategory::Health,
            "social" => ItemCategory::Social,
            "other" => ItemCategory::Other,
            _ => ItemCategory::Personal,
        }
    }
}

/// Category of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Academic,
    #[default]
    Personal,
    Work,
    Health,
    Social,
    Creative,
    Learning,
    Other,
}

impl AchievementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementCategory::Academic => "academic",
            AchievementCategory::Personal => "personal",
            AchievementCategory::Work => "work",
            AchievementCategory::Health => "health",
            AchievementCategory::Social => "social",
            AchievementCategory::Creative => "creative",
            AchievementCategory::Learning => "learning",
            AchievementCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "academic" => AchievementCategory::Academic,
            "work" => AchievementCategory::Work,
            "health" => AchievementCategory::Health,
            "social" => AchievementCategory::Social,
            "creative" => AchievementCategory::Creative,
            "learning" => AchievementCategory::Learning,
            "other" => AchievementCategory::Other,
            _ => AchievementCategory::Personal,
        }
    }
}

/// A todo item with a due timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub description: Option<String>,
    /// Due date and time. `None` when the stored timestamp was malformed.
    pub due_at: Option<DateTime<Utc>>,
    pub done: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub category: ItemCategory,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(user_id: impl Into<String>, text: impl Into<String>, due_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            text: text.into(),
            description: None,
            due_at: Some(due_at),
            done: false,
            completed_at: None,
            priority: Priority::default(),
            category: ItemCategory::default(),
            created_at: Utc::now(),
        }
    }
}

/// A calendar event with an occurrence timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Occurrence date and time. `None` when the stored timestamp was malformed.
    pub occurs_at: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub category: ItemCategory,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        occurs_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            description: None,
            occurs_at: Some(occurs_at),
            duration_minutes: 60,
            location: None,
            completed: false,
            completed_at: None,
            priority: Priority::default(),
            category: ItemCategory::default(),
            created_at: Utc::now(),
        }
    }
}

/// Minimum points an achievement can award.
pub const MIN_POINTS: u32 = 1;
/// Maximum points an achievement can award.
pub const MAX_POINTS: u32 = 1000;
/// Points awarded when none are specified.
pub const DEFAULT_POINTS: u32 = 10;

/// A recorded achievement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// When the achievement happened. `None` when the stored timestamp
    /// was malformed; such records are excluded from streak computation.
    pub occurred_at: Option<DateTime<Utc>>,
    pub points: u32,
    pub category: AchievementCategory,
    pub created_at: DateTime<Utc>,
}

impl Achievement {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            description: None,
            occurred_at: Some(occurred_at),
            points: DEFAULT_POINTS,
            category: AchievementCategory::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn with_category(mut self, category: AchievementCategory) -> Self {
        self.category = category;
        self
    }

    /// Check field constraints before persisting.
    pub fn validate(&self) -> Result<(), crate::error::ValidationError> {
        if self.title.trim().is_empty() {
            return Err(crate::error::ValidationError::Empty("title".to_string()));
        }
        if self.points < MIN_POINTS || self.points > MAX_POINTS {
            return Err(crate::error::ValidationError::OutOfRange {
                field: "points".to_string(),
                min: i64::from(MIN_POINTS),
                max: i64::from(MAX_POINTS),
                got: i64::from(self.points),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serialization_round_trip() {
        let todo = Todo::new("user-1", "Finish lab report", Utc::now());
        let json = serde_json::to_string(&todo).unwrap();
        let decoded: Todo = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.text, "Finish lab report");
        assert!(!decoded.done);
    }

    #[test]
    fn event_serialization_round_trip() {
        let event = Event::new("user-1", "Morning standup", Utc::now());
        let json = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.title, "Morning standup");
        assert_eq!(decoded.duration_minutes, 60);
    }

    #[test]
    fn achievement_builder_sets_fields() {
        let ach = Achievement::new("user-1", "Ran 5k", Utc::now())
            .with_points(25)
            .with_category(AchievementCategory::Health);
        assert_eq!(ach.points, 25);
        assert_eq!(ach.category, AchievementCategory::Health);
    }

    #[test]
    fn enum_round_trips() {
        for p in ["low", "medium", "high", "urgent"] {
            assert_eq!(Priority::parse(p).as_str(), p);
        }
        for c in [
            "academic",
            "personal",
            "work",
            "health",
            "social",
            "creative",
            "learning",
            "other",
        ] {
            assert_eq!(AchievementCategory::parse(c).as_str(), c);
        }
    }

    #[test]
    fn achievement_points_are_range_checked() {
        let ok = Achievement::new("u", "title", Utc::now()).with_points(1000);
        assert!(ok.validate().is_ok());

        let too_many = Achievement::new("u", "title", Utc::now()).with_points(1001);
        assert!(too_many.validate().is_err());

        let none = Achievement::new("u", "title", Utc::now()).with_points(0);
        assert!(none.validate().is_err());
    }

    #[test]
    fn unknown_strings_fall_back_to_defaults() {
        assert_eq!(Priority::parse("??"), Priority::Medium);
        assert_eq!(ItemCategory::parse("??"), ItemCategory::Personal);
        assert_eq!(AchievementCategory::parse("??"), AchievementCategory::Personal);
    }
}
