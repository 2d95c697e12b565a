mod util;

use bairnlog_lib::commands;
use bairnlog_lib::model::{FAMILY_CODE_REQUIRED, FAMILY_CODE_TOO_SHORT};

#[tokio::test]
async fn login_rejects_short_and_missing_codes() {
    let pool = util::temp_pool().await;

    let err = commands::login(&pool, "").await.unwrap_err();
    assert_eq!(err.code(), FAMILY_CODE_REQUIRED);

    let err = commands::login(&pool, "abc").await.unwrap_err();
    assert_eq!(err.code(), FAMILY_CODE_TOO_SHORT);

    // No family row was created along the way.
    let families: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM family")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(families, 0);
}

#[tokio::test]
async fn login_registers_a_family_once() {
    let pool = util::temp_pool().await;

    let ack = commands::login(&pool, "AAAA").await.unwrap();
    assert!(ack.success);
    assert_eq!(ack.family_code, "AAAA");

    // A second login with the same code is a no-op.
    commands::login(&pool, "AAAA").await.unwrap();
    let families: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM family WHERE code = ?")
        .bind("AAAA")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(families, 1);
}

#[tokio::test]
async fn four_character_codes_are_enough() {
    let pool = util::temp_pool().await;
    let ack = commands::login(&pool, "宝宝日记").await.unwrap();
    assert_eq!(ack.family_code, "宝宝日记");
}
