//! Statistics query surface tests over a seeded database.

use chrono::{Duration, Utc};

use daybook_core::stats::{
    category_counts_for_user, streak_for_user, summary_for_user, total_points_for_user,
};
use daybook_core::{Achievement, AchievementCategory, Database, User};

fn seeded() -> (Database, User) {
    let db = Database::open_memory().unwrap();
    let user = User::new("Stats User", Some("stats@example.com".to_string()));
    db.create_user(&user).unwrap();
    (db, user)
}

#[test]
fn streak_over_consecutive_days() {
    let (db, user) = seeded();
    let now = Utc::now();

    for days_ago in 0..3 {
        db.create_achievement(
            &Achievement::new(&user.id, format!("day {days_ago}"), now - Duration::days(days_ago)),
        )
        .unwrap();
    }

    let report = streak_for_user(&db, &user.id, now.date_naive()).unwrap();
    assert_eq!(report.current, 3);
    assert_eq!(report.max, 3);
}

#[test]
fn broken_streak_keeps_historical_max() {
    let (db, user) = seeded();
    let now = Utc::now();

    // A four-day run ending a week ago, nothing since.
    for days_ago in 7..11 {
        db.create_achievement(
            &Achievement::new(&user.id, format!("day {days_ago}"), now - Duration::days(days_ago)),
        )
        .unwrap();
    }

    let report = streak_for_user(&db, &user.id, now.date_naive()).unwrap();
    assert_eq!(report.current, 0);
    assert_eq!(report.max, 4);
}

#[test]
fn several_achievements_one_day_count_once() {
    let (db, user) = seeded();
    let now = Utc::now();

    for i in 0..5 {
        db.create_achievement(&Achievement::new(&user.id, format!("today #{i}"), now))
            .unwrap();
    }

    let report = streak_for_user(&db, &user.id, now.date_naive()).unwrap();
    assert_eq!(report.current, 1);
    assert_eq!(report.max, 1);
}

#[test]
fn points_and_categories_aggregate() {
    let (db, user) = seeded();
    let now = Utc::now();

    let records = [
        ("5k run", 30, AchievementCategory::Health),
        ("10k run", 60, AchievementCategory::Health),
        ("rust chapter", 20, AchievementCategory::Learning),
        ("tidy desk", 5, AchievementCategory::Personal),
        ("morning swim", 15, AchievementCategory::Health),
    ];
    for (title, points, category) in records {
        db.create_achievement(
            &Achievement::new(&user.id, title, now)
                .with_points(points)
                .with_category(category),
        )
        .unwrap();
    }

    assert_eq!(total_points_for_user(&db, &user.id).unwrap(), 130);

    let counts = category_counts_for_user(&db, &user.id).unwrap();
    assert_eq!(counts[0].category, AchievementCategory::Health);
    assert_eq!(counts[0].count, 3);
    // Tie at one apiece resolves alphabetically.
    assert_eq!(counts[1].category, AchievementCategory::Learning);
    assert_eq!(counts[2].category, AchievementCategory::Personal);
}

#[test]
fn summary_combines_all_three_statistics() {
    let (db, user) = seeded();
    let now = Utc::now();

    db.create_achievement(
        &Achievement::new(&user.id, "today", now).with_points(40),
    )
    .unwrap();
    db.create_achievement(
        &Achievement::new(&user.id, "yesterday", now - Duration::days(1)).with_points(10),
    )
    .unwrap();

    let summary = summary_for_user(&db, &user.id, now.date_naive()).unwrap();
    assert_eq!(summary.total_points, 50);
    assert_eq!(summary.streak.current, 2);
    assert_eq!(summary.categories.len(), 1);
    assert_eq!(summary.categories[0].count, 2);
}

#[test]
fn empty_history_yields_zeroes() {
    let (db, user) = seeded();
    let today = Utc::now().date_naive();

    let summary = summary_for_user(&db, &user.id, today).unwrap();
    assert_eq!(summary.total_points, 0);
    assert_eq!(summary.streak.current, 0);
    assert_eq!(summary.streak.max, 0);
    assert!(summary.categories.is_empty());
}
