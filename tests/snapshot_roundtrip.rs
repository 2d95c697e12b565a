mod util;

use bairnlog_lib::commands;
use serde_json::json;
use sqlx::SqlitePool;

const SOURCE: &str = "AAAA";
const TARGET: &str = "BBBB";
const DAY: &str = "2024-01-01";

async fn seed_source(pool: &SqlitePool) {
    commands::login(pool, SOURCE).await.unwrap();

    commands::add_record(
        pool,
        SOURCE,
        "feeding",
        json!({"date": DAY, "time": "06:00", "breastLeft": 5, "bottleFormula": 90}),
    )
    .await
    .unwrap();
    commands::add_record(
        pool,
        SOURCE,
        "feeding",
        json!({"date": "2024-01-02", "time": "07:00", "bottleBreastMilk": 120}),
    )
    .await
    .unwrap();
    commands::add_record(
        pool,
        SOURCE,
        "diaper",
        json!({"date": DAY, "time": "08:00", "type": "poop", "color": "yellow", "note": "ok"}),
    )
    .await
    .unwrap();
    commands::add_record(
        pool,
        SOURCE,
        "sleep",
        json!({"date": DAY, "startTime": "23:30", "endTime": "00:15", "direction": "right"}),
    )
    .await
    .unwrap();
    commands::add_record(
        pool,
        SOURCE,
        "education",
        json!({"date": DAY, "category": "visual", "duration": 10, "content": "mobile"}),
    )
    .await
    .unwrap();

    commands::save_day_entry(
        pool,
        SOURCE,
        "supplement",
        DAY,
        json!({"items": {"AD": true, "D3": false}}),
    )
    .await
    .unwrap();
    commands::save_day_entry(pool, SOURCE, "care", DAY, json!({"items": {"bath": true}}))
        .await
        .unwrap();
    commands::save_day_entry(
        pool,
        SOURCE,
        "dailyNote",
        DAY,
        json!({"temperature": 36.6, "note": "good day"}),
    )
    .await
    .unwrap();

    commands::set_setting(pool, SOURCE, "babyName", "June").await.unwrap();
    commands::set_setting(pool, SOURCE, "birthDate", "2023-11-20").await.unwrap();
}

#[tokio::test]
async fn export_captures_every_table() {
    let pool = util::temp_pool().await;
    seed_source(&pool).await;

    let snapshot = commands::export_all(&pool, SOURCE).await.unwrap();
    assert_eq!(snapshot.feeding.len(), 2);
    assert_eq!(snapshot.diaper.len(), 1);
    assert_eq!(snapshot.sleep.len(), 1);
    assert_eq!(snapshot.education.len(), 1);
    assert_eq!(snapshot.supplement.len(), 1);
    assert_eq!(snapshot.care.len(), 1);
    assert_eq!(snapshot.daily_note.len(), 1);
    assert_eq!(snapshot.settings.len(), 2);
    assert!(!snapshot.export_date.is_empty());

    // Stored fields survive the dump as-is.
    assert_eq!(snapshot.diaper[0].note, "ok");
    assert_eq!(snapshot.daily_note[0].temperature, 36.6);
    assert_eq!(
        serde_json::to_string(&snapshot.supplement[0].items).unwrap(),
        r#"{"AD":true,"D3":false}"#
    );
}

#[tokio::test]
async fn import_into_a_fresh_scope_reproduces_counts() {
    let pool = util::temp_pool().await;
    seed_source(&pool).await;

    let snapshot = commands::export_all(&pool, SOURCE).await.unwrap();
    let expected_rows = snapshot.record_count() as u64;

    commands::login(&pool, TARGET).await.unwrap();
    let report = commands::import_all(&pool, TARGET, snapshot).await.unwrap();
    assert_eq!(report.imported, expected_rows);

    let source = commands::export_all(&pool, SOURCE).await.unwrap();
    let target = commands::export_all(&pool, TARGET).await.unwrap();
    assert_eq!(source.feeding.len(), target.feeding.len());
    assert_eq!(source.diaper.len(), target.diaper.len());
    assert_eq!(source.sleep.len(), target.sleep.len());
    assert_eq!(source.education.len(), target.education.len());
    assert_eq!(source.supplement.len(), target.supplement.len());
    assert_eq!(source.care.len(), target.care.len());
    assert_eq!(source.daily_note.len(), target.daily_note.len());
    assert_eq!(source.settings.len(), target.settings.len());

    // The derived day reads identically under the new scope.
    let source_stats = commands::day_stats(&pool, SOURCE, DAY).await.unwrap();
    let target_stats = commands::day_stats(&pool, TARGET, DAY).await.unwrap();
    assert_eq!(source_stats, target_stats);
}

#[tokio::test]
async fn reimport_merges_day_entries_and_appends_records() {
    let pool = util::temp_pool().await;
    seed_source(&pool).await;

    let snapshot = commands::export_all(&pool, SOURCE).await.unwrap();
    commands::import_all(&pool, TARGET, snapshot.clone()).await.unwrap();
    commands::import_all(&pool, TARGET, snapshot).await.unwrap();

    // Additive policy: multi-entry tables append...
    let feedings = util::count(
        &pool,
        "SELECT COUNT(*) FROM feeding WHERE family_code = ?",
        TARGET,
    )
    .await;
    assert_eq!(feedings, 4);

    // ...while the one-row-per-day tables and settings merge in place.
    for sql in [
        "SELECT COUNT(*) FROM supplement WHERE family_code = ?",
        "SELECT COUNT(*) FROM care WHERE family_code = ?",
        "SELECT COUNT(*) FROM daily_note WHERE family_code = ?",
    ] {
        assert_eq!(util::count(&pool, sql, TARGET).await, 1);
    }
    let settings = commands::get_settings(&pool, TARGET).await.unwrap();
    assert_eq!(settings.len(), 2);
    assert_eq!(settings.get("babyName").map(String::as_str), Some("June"));
}

#[tokio::test]
async fn import_preserves_capture_timestamps() {
    let pool = util::temp_pool().await;

    commands::add_record(
        &pool,
        SOURCE,
        "feeding",
        json!({"date": DAY, "time": "06:00", "createdAt": 1_700_000_000_000i64}),
    )
    .await
    .unwrap();

    let snapshot = commands::export_all(&pool, SOURCE).await.unwrap();
    commands::import_all(&pool, TARGET, snapshot).await.unwrap();

    let imported = commands::export_all(&pool, TARGET).await.unwrap();
    assert_eq!(imported.feeding[0].created_at, 1_700_000_000_000);
    // Ids are never carried across scopes.
    let source = commands::export_all(&pool, SOURCE).await.unwrap();
    assert_ne!(imported.feeding[0].id, source.feeding[0].id);
}
