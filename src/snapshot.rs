use chrono::Utc;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::day_entry::{self, ChecklistTable, DailyNotePayload};
use crate::db::run_in_tx;
use crate::id::new_uuid_v7;
use crate::model::{
    CareRecord, DailyNote, DiaperRecord, EducationRecord, FeedingRecord, SettingEntry,
    SleepDirection, SleepRecord, SupplementRecord,
};
use crate::settings;
use crate::store;
use crate::time::now_ms;
use crate::{AppError, AppResult};

/// The full exported dataset for one family scope: every record of every
/// table, plus settings and an export timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub feeding: Vec<FeedingRecord>,
    #[serde(default)]
    pub diaper: Vec<DiaperRecord>,
    #[serde(default)]
    pub sleep: Vec<SleepRecord>,
    #[serde(default)]
    pub education: Vec<EducationRecord>,
    #[serde(default)]
    pub supplement: Vec<SupplementRecord>,
    #[serde(default)]
    pub care: Vec<CareRecord>,
    #[serde(default)]
    pub daily_note: Vec<DailyNote>,
    #[serde(default)]
    pub settings: Vec<SettingEntry>,
    #[serde(default)]
    pub export_date: String,
}

impl Snapshot {
    pub fn record_count(&self) -> usize {
        self.feeding.len()
            + self.diaper.len()
            + self.sleep.len()
            + self.education.len()
            + self.supplement.len()
            + self.care.len()
            + self.daily_note.len()
            + self.settings.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: u64,
}

/// Dump everything the family owns, in deterministic day-then-capture order.
pub async fn export_family(pool: &SqlitePool, family_code: &str) -> AppResult<Snapshot> {
    let feeding = sqlx::query(
        "SELECT id, date, time, breast_left, breast_right, bottle_breast_milk, bottle_formula, created_at \
         FROM feeding WHERE family_code = ? ORDER BY date ASC, created_at ASC, id ASC",
    )
    .bind(family_code)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?
    .into_iter()
    .map(store::feeding_from_row)
    .collect::<AppResult<Vec<_>>>()?;

    let diaper = sqlx::query(
        "SELECT id, date, time, kind, color, amount, note, image, created_at \
         FROM diaper WHERE family_code = ? ORDER BY date ASC, created_at ASC, id ASC",
    )
    .bind(family_code)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?
    .into_iter()
    .map(store::diaper_from_row)
    .collect::<AppResult<Vec<_>>>()?;

    let sleep = sqlx::query(
        "SELECT id, date, start_time, end_time, direction, created_at \
         FROM sleep WHERE family_code = ? ORDER BY date ASC, created_at ASC, id ASC",
    )
    .bind(family_code)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?
    .into_iter()
    .map(store::sleep_from_row)
    .collect::<AppResult<Vec<_>>>()?;

    let education = sqlx::query(
        "SELECT id, date, category, duration, content, created_at \
         FROM education WHERE family_code = ? ORDER BY date ASC, created_at ASC, id ASC",
    )
    .bind(family_code)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?
    .into_iter()
    .map(store::education_from_row)
    .collect::<AppResult<Vec<_>>>()?;

    let supplement = sqlx::query(
        "SELECT id, date, items, created_at FROM supplement \
         WHERE family_code = ? ORDER BY date ASC",
    )
    .bind(family_code)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?
    .into_iter()
    .map(day_entry::supplement_from_row)
    .collect::<AppResult<Vec<_>>>()?;

    let care = sqlx::query(
        "SELECT id, date, items, created_at FROM care \
         WHERE family_code = ? ORDER BY date ASC",
    )
    .bind(family_code)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?
    .into_iter()
    .map(day_entry::care_from_row)
    .collect::<AppResult<Vec<_>>>()?;

    let daily_note = sqlx::query(
        "SELECT id, date, temperature, vaccine, note, created_at FROM daily_note \
         WHERE family_code = ? ORDER BY date ASC",
    )
    .bind(family_code)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?
    .into_iter()
    .map(day_entry::daily_note_from_row)
    .collect::<AppResult<Vec<_>>>()?;

    let settings = settings::dump(pool, family_code).await?;

    Ok(Snapshot {
        feeding,
        diaper,
        sleep,
        education,
        supplement,
        care,
        daily_note,
        settings,
        export_date: Utc::now().to_rfc3339(),
    })
}

fn keep_created_at(ms: i64) -> i64 {
    if ms > 0 {
        ms
    } else {
        now_ms()
    }
}

/// Apply a snapshot under the family scope, additively: multi-entry tables
/// insert every row as a new record (fresh ids), the one-row-per-day tables
/// and settings merge onto any existing row. The whole import is one
/// transaction; a failure anywhere rolls every row back.
pub async fn import_snapshot(
    pool: &SqlitePool,
    family_code: &str,
    snapshot: Snapshot,
) -> AppResult<ImportReport> {
    let family_code = family_code.to_string();
    run_in_tx(pool, move |tx| {
        async move {
            let mut imported: u64 = 0;

            for r in &snapshot.feeding {
                sqlx::query(
                    "INSERT INTO feeding \
                     (id, family_code, date, time, breast_left, breast_right, bottle_breast_milk, bottle_formula, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )
                .bind(new_uuid_v7())
                .bind(&family_code)
                .bind(&r.date)
                .bind(&r.time)
                .bind(r.breast_left)
                .bind(r.breast_right)
                .bind(r.bottle_breast_milk)
                .bind(r.bottle_formula)
                .bind(keep_created_at(r.created_at))
                .execute(&mut **tx)
                .await
                .map_err(AppError::from)?;
                imported += 1;
            }

            for r in &snapshot.diaper {
                sqlx::query(
                    "INSERT INTO diaper \
                     (id, family_code, date, time, kind, color, amount, note, image, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )
                .bind(new_uuid_v7())
                .bind(&family_code)
                .bind(&r.date)
                .bind(&r.time)
                .bind(r.kind.as_str())
                .bind(&r.color)
                .bind(&r.amount)
                .bind(&r.note)
                .bind(r.image.as_deref())
                .bind(keep_created_at(r.created_at))
                .execute(&mut **tx)
                .await
                .map_err(AppError::from)?;
                imported += 1;
            }

            for r in &snapshot.sleep {
                sqlx::query(
                    "INSERT INTO sleep \
                     (id, family_code, date, start_time, end_time, direction, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .bind(new_uuid_v7())
                .bind(&family_code)
                .bind(&r.date)
                .bind(&r.start_time)
                .bind(r.end_time.as_deref())
                .bind(r.direction.map(SleepDirection::as_str))
                .bind(keep_created_at(r.created_at))
                .execute(&mut **tx)
                .await
                .map_err(AppError::from)?;
                imported += 1;
            }

            for r in &snapshot.education {
                sqlx::query(
                    "INSERT INTO education \
                     (id, family_code, date, category, duration, content, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .bind(new_uuid_v7())
                .bind(&family_code)
                .bind(&r.date)
                .bind(r.category.as_str())
                .bind(r.duration_min)
                .bind(&r.content)
                .bind(keep_created_at(r.created_at))
                .execute(&mut **tx)
                .await
                .map_err(AppError::from)?;
                imported += 1;
            }

            for r in &snapshot.supplement {
                day_entry::save_checklist(
                    &mut **tx,
                    ChecklistTable::Supplement,
                    &family_code,
                    &r.date,
                    &r.items,
                    keep_created_at(r.created_at),
                )
                .await?;
                imported += 1;
            }

            for r in &snapshot.care {
                day_entry::save_checklist(
                    &mut **tx,
                    ChecklistTable::Care,
                    &family_code,
                    &r.date,
                    &r.items,
                    keep_created_at(r.created_at),
                )
                .await?;
                imported += 1;
            }

            for r in &snapshot.daily_note {
                let payload = DailyNotePayload {
                    temperature: r.temperature,
                    vaccine: r.vaccine.clone(),
                    note: r.note.clone(),
                };
                day_entry::save_note(
                    &mut **tx,
                    &family_code,
                    &r.date,
                    &payload,
                    keep_created_at(r.created_at),
                )
                .await?;
                imported += 1;
            }

            for s in &snapshot.settings {
                settings::set_on(&mut **tx, &family_code, &s.key, &s.value).await?;
                imported += 1;
            }

            tracing::info!(
                target: "bairnlog",
                event = "snapshot_imported",
                rows = imported
            );
            Ok(ImportReport { imported })
        }
        .boxed()
    })
    .await
}
