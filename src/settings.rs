use std::collections::BTreeMap;

use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::id::new_uuid_v7;
use crate::model::SettingEntry;
use crate::{AppError, AppResult};

const UPSERT_SQL: &str = "INSERT INTO settings (id, family_code, key, value) \
     VALUES (?1, ?2, ?3, ?4) \
     ON CONFLICT (family_code, key) DO UPDATE SET value = excluded.value";

pub async fn all(pool: &SqlitePool, family_code: &str) -> AppResult<BTreeMap<String, String>> {
    let rows = sqlx::query("SELECT key, value FROM settings WHERE family_code = ?")
        .bind(family_code)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)?;

    let mut settings = BTreeMap::new();
    for row in rows {
        settings.insert(
            row.try_get("key").map_err(AppError::from)?,
            row.try_get("value").map_err(AppError::from)?,
        );
    }
    Ok(settings)
}

pub async fn set(pool: &SqlitePool, family_code: &str, key: &str, value: &str) -> AppResult<()> {
    sqlx::query(UPSERT_SQL)
        .bind(new_uuid_v7())
        .bind(family_code)
        .bind(key)
        .bind(value)
        .execute(pool)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

pub(crate) async fn set_on(
    conn: &mut SqliteConnection,
    family_code: &str,
    key: &str,
    value: &str,
) -> AppResult<()> {
    sqlx::query(UPSERT_SQL)
        .bind(new_uuid_v7())
        .bind(family_code)
        .bind(key)
        .bind(value)
        .execute(conn)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

pub(crate) async fn dump(pool: &SqlitePool, family_code: &str) -> AppResult<Vec<SettingEntry>> {
    let rows = sqlx::query("SELECT key, value FROM settings WHERE family_code = ? ORDER BY key ASC")
        .bind(family_code)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)?;
    rows.into_iter()
        .map(|row| {
            Ok(SettingEntry {
                key: row.try_get("key").map_err(AppError::from)?,
                value: row.try_get("value").map_err(AppError::from)?,
            })
        })
        .collect()
}
