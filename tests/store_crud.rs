mod util;

use bairnlog_lib::commands;
use bairnlog_lib::model::{
    EducationCategory, PAYLOAD_INVALID, STORE_UNKNOWN_TABLE, VALIDATION_DATE_REQUIRED,
};
use bairnlog_lib::store::ActivityRecord;
use serde_json::json;

const FC: &str = "AAAA";
const DAY: &str = "2024-01-01";

#[tokio::test]
async fn add_assigns_id_and_capture_timestamp() {
    let pool = util::temp_pool().await;

    let record = commands::add_record(
        &pool,
        FC,
        "feeding",
        json!({"date": DAY, "time": "08:00", "bottleFormula": 90}),
    )
    .await
    .unwrap();

    assert!(!record.id().is_empty());
    assert!(record.created_at() > 1_500_000_000_000);
}

#[tokio::test]
async fn list_orders_by_creation_time() {
    let pool = util::temp_pool().await;

    for (time, created_at) in [("10:00", 3_000), ("06:00", 1_000), ("08:00", 2_000)] {
        commands::add_record(
            &pool,
            FC,
            "feeding",
            json!({"date": DAY, "time": time, "createdAt": created_at}),
        )
        .await
        .unwrap();
    }

    let records = commands::list_records(&pool, FC, "feeding", DAY).await.unwrap();
    let times: Vec<&str> = records
        .iter()
        .map(|r| match r {
            ActivityRecord::Feeding(f) => f.time.as_str(),
            other => panic!("unexpected record kind {:?}", other.kind()),
        })
        .collect();
    assert_eq!(times, ["06:00", "08:00", "10:00"]);
}

#[tokio::test]
async fn list_of_an_empty_day_is_empty_not_an_error() {
    let pool = util::temp_pool().await;
    let records = commands::list_records(&pool, FC, "sleep", DAY).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn unknown_table_is_a_request_error() {
    let pool = util::temp_pool().await;

    let err = commands::list_records(&pool, FC, "medication", DAY)
        .await
        .unwrap_err();
    assert_eq!(err.code(), STORE_UNKNOWN_TABLE);

    let err = commands::add_record(&pool, FC, "medication", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), STORE_UNKNOWN_TABLE);
}

#[tokio::test]
async fn list_requires_a_date() {
    let pool = util::temp_pool().await;
    let err = commands::list_records(&pool, FC, "feeding", "")
        .await
        .unwrap_err();
    assert_eq!(err.code(), VALIDATION_DATE_REQUIRED);
}

#[tokio::test]
async fn mismatched_payload_is_rejected_before_storage() {
    let pool = util::temp_pool().await;
    let err = commands::add_record(
        &pool,
        FC,
        "diaper",
        json!({"date": DAY, "time": "08:00", "type": "solid"}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), PAYLOAD_INVALID);
}

#[tokio::test]
async fn delete_is_ensure_absence() {
    let pool = util::temp_pool().await;

    let record = commands::add_record(
        &pool,
        FC,
        "diaper",
        json!({"date": DAY, "time": "09:30", "type": "both", "color": "yellow"}),
    )
    .await
    .unwrap();

    commands::delete_record(&pool, FC, "diaper", record.id())
        .await
        .unwrap();
    // Deleting an already-gone row still succeeds.
    commands::delete_record(&pool, FC, "diaper", record.id())
        .await
        .unwrap();

    let records = commands::list_records(&pool, FC, "diaper", DAY).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn delete_under_another_family_is_a_no_op() {
    let pool = util::temp_pool().await;

    let record = commands::add_record(
        &pool,
        FC,
        "sleep",
        json!({"date": DAY, "startTime": "13:00", "direction": "left"}),
    )
    .await
    .unwrap();

    commands::delete_record(&pool, "BBBB", "sleep", record.id())
        .await
        .unwrap();

    let records = commands::list_records(&pool, FC, "sleep", DAY).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn education_category_and_duration_round_trip() {
    let pool = util::temp_pool().await;

    commands::add_record(
        &pool,
        FC,
        "education",
        json!({"date": DAY, "category": "gross-motor", "duration": 15, "content": "tummy time"}),
    )
    .await
    .unwrap();

    let records = commands::list_records(&pool, FC, "education", DAY)
        .await
        .unwrap();
    match &records[0] {
        ActivityRecord::Education(e) => {
            assert_eq!(e.category, EducationCategory::GrossMotor);
            assert_eq!(e.duration_min, 15);
            assert_eq!(e.content, "tummy time");
        }
        other => panic!("unexpected record kind {:?}", other.kind()),
    }
}

#[tokio::test]
async fn diaper_image_survives_storage() {
    let pool = util::temp_pool().await;

    commands::add_record(
        &pool,
        FC,
        "diaper",
        json!({
            "date": DAY,
            "time": "11:00",
            "type": "pee",
            "image": "data:image/jpeg;base64,/9j/4AAQ"
        }),
    )
    .await
    .unwrap();

    let records = commands::list_records(&pool, FC, "diaper", DAY).await.unwrap();
    match &records[0] {
        ActivityRecord::Diaper(d) => {
            assert_eq!(d.image.as_deref(), Some("data:image/jpeg;base64,/9j/4AAQ"));
        }
        other => panic!("unexpected record kind {:?}", other.kind()),
    }
}
