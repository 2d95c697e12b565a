mod util;

use bairnlog_lib::commands;
use serde_json::json;

const OURS: &str = "AAAA";
const THEIRS: &str = "BBBB";
const DAY: &str = "2024-01-01";

#[tokio::test]
async fn records_never_leak_across_family_scopes() {
    let pool = util::temp_pool().await;

    commands::add_record(
        &pool,
        OURS,
        "feeding",
        json!({"date": DAY, "time": "06:00", "bottleFormula": 90}),
    )
    .await
    .unwrap();
    commands::add_record(
        &pool,
        OURS,
        "diaper",
        json!({"date": DAY, "time": "07:00", "type": "poop"}),
    )
    .await
    .unwrap();
    commands::save_day_entry(&pool, OURS, "supplement", DAY, json!({"items": {"AD": true}}))
        .await
        .unwrap();
    commands::save_day_entry(&pool, OURS, "dailyNote", DAY, json!({"note": "ours"}))
        .await
        .unwrap();

    for table in ["feeding", "diaper", "sleep", "education"] {
        let records = commands::list_records(&pool, THEIRS, table, DAY).await.unwrap();
        assert!(records.is_empty(), "{table} leaked across scopes");
    }
    for kind in ["supplement", "care", "dailyNote"] {
        let entry = commands::get_day_entry(&pool, THEIRS, kind, DAY).await.unwrap();
        assert!(entry.is_none(), "{kind} leaked across scopes");
    }

    let stats = commands::day_stats(&pool, THEIRS, DAY).await.unwrap();
    assert_eq!(stats.feeding_count, 0);
    assert_eq!(stats.diaper_count, 0);
    assert_eq!(stats.supplements_total, 0);

    let snapshot = commands::export_all(&pool, THEIRS).await.unwrap();
    assert_eq!(snapshot.record_count(), 0);
}

#[tokio::test]
async fn settings_are_scoped_per_family() {
    let pool = util::temp_pool().await;

    commands::set_setting(&pool, OURS, "babyName", "June").await.unwrap();
    commands::set_setting(&pool, THEIRS, "babyName", "Rory").await.unwrap();

    let ours = commands::get_settings(&pool, OURS).await.unwrap();
    let theirs = commands::get_settings(&pool, THEIRS).await.unwrap();
    assert_eq!(ours.get("babyName").map(String::as_str), Some("June"));
    assert_eq!(theirs.get("babyName").map(String::as_str), Some("Rory"));

    // Overwriting one scope leaves the other alone.
    commands::set_setting(&pool, OURS, "babyName", "Juniper").await.unwrap();
    let theirs = commands::get_settings(&pool, THEIRS).await.unwrap();
    assert_eq!(theirs.get("babyName").map(String::as_str), Some("Rory"));
}
