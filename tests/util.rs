#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub async fn temp_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect sqlite::memory:");
    sqlx::query("PRAGMA foreign_keys=ON;")
        .execute(&pool)
        .await
        .unwrap();
    bairnlog_lib::migrate::apply_migrations(&pool)
        .await
        .expect("apply migrations");
    pool
}

pub async fn count(pool: &SqlitePool, sql: &str, family_code: &str) -> i64 {
    sqlx::query_scalar(sql)
        .bind(family_code)
        .fetch_one(pool)
        .await
        .expect("count query")
}
