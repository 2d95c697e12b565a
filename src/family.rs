use sqlx::{Row, SqlitePool};

use crate::time::now_ms;
use crate::{AppError, AppResult};
use crate::model::Family;

/// Find-or-create the family row for a code. First login registers the
/// scope; later logins are no-ops returning the stored row.
pub async fn ensure_family(pool: &SqlitePool, code: &str) -> AppResult<Family> {
    sqlx::query("INSERT OR IGNORE INTO family (code, created_at) VALUES (?, ?)")
        .bind(code)
        .bind(now_ms())
        .execute(pool)
        .await
        .map_err(AppError::from)?;

    let row = sqlx::query("SELECT code, created_at FROM family WHERE code = ?")
        .bind(code)
        .fetch_one(pool)
        .await
        .map_err(AppError::from)?;

    Ok(Family {
        code: row.try_get("code").map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}
