use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

use crate::db::run_in_tx;
use crate::id::new_uuid_v7;
use crate::model::{
    CareRecord, Checklist, DailyNote, SaveAck, SupplementRecord, DAY_ENTRY_UNKNOWN_KIND,
    PAYLOAD_INVALID, STORE_DECODE_ERROR,
};
use crate::time::now_ms;
use crate::{AppError, AppResult};

/// The three one-row-per-(family, date) entities. Saving replaces the whole
/// mutable payload and refreshes the capture timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEntryKind {
    Supplement,
    Care,
    DailyNote,
}

impl DayEntryKind {
    pub const ALL: [DayEntryKind; 3] = [
        DayEntryKind::Supplement,
        DayEntryKind::Care,
        DayEntryKind::DailyNote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayEntryKind::Supplement => "supplement",
            DayEntryKind::Care => "care",
            DayEntryKind::DailyNote => "dailyNote",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "supplement" => Ok(DayEntryKind::Supplement),
            "care" => Ok(DayEntryKind::Care),
            "dailyNote" | "daily_note" => Ok(DayEntryKind::DailyNote),
            other => Err(AppError::new(DAY_ENTRY_UNKNOWN_KIND, "Unknown day-entry kind")
                .with_context("kind", other.to_string())),
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) enum ChecklistTable {
    Supplement,
    Care,
}

impl ChecklistTable {
    fn name(self) -> &'static str {
        match self {
            ChecklistTable::Supplement => "supplement",
            ChecklistTable::Care => "care",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DayEntry {
    Supplement(SupplementRecord),
    Care(CareRecord),
    Note(DailyNote),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistPayload {
    #[serde(default)]
    pub items: Checklist,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNotePayload {
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub vaccine: String,
    #[serde(default)]
    pub note: String,
}

/// A save request parsed against its kind, so a checklist payload can never
/// reach the daily-note table or vice versa.
#[derive(Debug, Clone)]
pub enum DayEntrySave {
    Supplement(Checklist),
    Care(Checklist),
    Note(DailyNotePayload),
}

impl DayEntrySave {
    pub fn parse(kind: DayEntryKind, payload: Value) -> AppResult<Self> {
        let invalid = |err: serde_json::Error| {
            AppError::new(PAYLOAD_INVALID, "Day-entry payload does not match its kind")
                .with_context("kind", kind.as_str())
                .with_cause(AppError::from(err))
        };
        match kind {
            DayEntryKind::Supplement => serde_json::from_value::<ChecklistPayload>(payload)
                .map(|p| DayEntrySave::Supplement(p.items))
                .map_err(invalid),
            DayEntryKind::Care => serde_json::from_value::<ChecklistPayload>(payload)
                .map(|p| DayEntrySave::Care(p.items))
                .map_err(invalid),
            DayEntryKind::DailyNote => serde_json::from_value::<DailyNotePayload>(payload)
                .map(DayEntrySave::Note)
                .map_err(invalid),
        }
    }

    pub fn kind(&self) -> DayEntryKind {
        match self {
            DayEntrySave::Supplement(_) => DayEntryKind::Supplement,
            DayEntrySave::Care(_) => DayEntryKind::Care,
            DayEntrySave::Note(_) => DayEntryKind::DailyNote,
        }
    }
}

fn checklist_from_blob(table: &'static str, raw: String) -> AppResult<Checklist> {
    serde_json::from_str(&raw).map_err(|err| {
        AppError::new(STORE_DECODE_ERROR, "Stored checklist blob is not valid JSON")
            .with_context("table", table)
            .with_cause(AppError::from(err))
    })
}

pub(crate) fn supplement_from_row(row: SqliteRow) -> AppResult<SupplementRecord> {
    let raw: String = row.try_get("items").map_err(AppError::from)?;
    Ok(SupplementRecord {
        id: row.try_get("id").map_err(AppError::from)?,
        date: row.try_get("date").map_err(AppError::from)?,
        items: checklist_from_blob("supplement", raw)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}

pub(crate) fn care_from_row(row: SqliteRow) -> AppResult<CareRecord> {
    let raw: String = row.try_get("items").map_err(AppError::from)?;
    Ok(CareRecord {
        id: row.try_get("id").map_err(AppError::from)?,
        date: row.try_get("date").map_err(AppError::from)?,
        items: checklist_from_blob("care", raw)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}

pub(crate) fn daily_note_from_row(row: SqliteRow) -> AppResult<DailyNote> {
    Ok(DailyNote {
        id: row.try_get("id").map_err(AppError::from)?,
        date: row.try_get("date").map_err(AppError::from)?,
        temperature: row.try_get("temperature").map_err(AppError::from)?,
        vaccine: row.try_get("vaccine").map_err(AppError::from)?,
        note: row.try_get("note").map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}

/// The day's entry for a kind, or `None`; an empty day is not an error.
pub async fn get(
    pool: &SqlitePool,
    family_code: &str,
    kind: DayEntryKind,
    date: &str,
) -> AppResult<Option<DayEntry>> {
    match kind {
        DayEntryKind::Supplement => sqlx::query(
            "SELECT id, date, items, created_at FROM supplement \
             WHERE family_code = ? AND date = ? LIMIT 1",
        )
        .bind(family_code)
        .bind(date)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)?
        .map(supplement_from_row)
        .transpose()
        .map(|entry| entry.map(DayEntry::Supplement)),
        DayEntryKind::Care => sqlx::query(
            "SELECT id, date, items, created_at FROM care \
             WHERE family_code = ? AND date = ? LIMIT 1",
        )
        .bind(family_code)
        .bind(date)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)?
        .map(care_from_row)
        .transpose()
        .map(|entry| entry.map(DayEntry::Care)),
        DayEntryKind::DailyNote => sqlx::query(
            "SELECT id, date, temperature, vaccine, note, created_at FROM daily_note \
             WHERE family_code = ? AND date = ? LIMIT 1",
        )
        .bind(family_code)
        .bind(date)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)?
        .map(daily_note_from_row)
        .transpose()
        .map(|entry| entry.map(DayEntry::Note)),
    }
}

/// Just the checklist blob for a day; the statistics fold needs nothing else.
pub(crate) async fn checklist_for_day(
    pool: &SqlitePool,
    table: ChecklistTable,
    family_code: &str,
    date: &str,
) -> AppResult<Option<Checklist>> {
    let sql = format!(
        "SELECT items FROM {} WHERE family_code = ? AND date = ? LIMIT 1",
        table.name()
    );
    let raw: Option<String> = sqlx::query_scalar(&sql)
        .bind(family_code)
        .bind(date)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)?;
    raw.map(|blob| checklist_from_blob(table.name(), blob))
        .transpose()
}

/// Find-or-create inside the caller's transaction: update the existing day
/// row or insert a fresh one. Returns the row id either way.
pub(crate) async fn save_checklist(
    conn: &mut SqliteConnection,
    table: ChecklistTable,
    family_code: &str,
    date: &str,
    items: &Checklist,
    created_at: i64,
) -> AppResult<String> {
    let blob = serde_json::to_string(items).map_err(AppError::from)?;
    let lookup = format!(
        "SELECT id FROM {} WHERE family_code = ? AND date = ?",
        table.name()
    );
    let existing: Option<String> = sqlx::query_scalar(&lookup)
        .bind(family_code)
        .bind(date)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::from)?;

    match existing {
        Some(id) => {
            let update = format!(
                "UPDATE {} SET items = ?, created_at = ? WHERE id = ?",
                table.name()
            );
            sqlx::query(&update)
                .bind(&blob)
                .bind(created_at)
                .bind(&id)
                .execute(&mut *conn)
                .await
                .map_err(AppError::from)?;
            Ok(id)
        }
        None => {
            let id = new_uuid_v7();
            let insert = format!(
                "INSERT INTO {} (id, family_code, date, items, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                table.name()
            );
            sqlx::query(&insert)
                .bind(&id)
                .bind(family_code)
                .bind(date)
                .bind(&blob)
                .bind(created_at)
                .execute(&mut *conn)
                .await
                .map_err(AppError::from)?;
            Ok(id)
        }
    }
}

pub(crate) async fn save_note(
    conn: &mut SqliteConnection,
    family_code: &str,
    date: &str,
    payload: &DailyNotePayload,
    created_at: i64,
) -> AppResult<String> {
    let existing: Option<String> =
        sqlx::query_scalar("SELECT id FROM daily_note WHERE family_code = ? AND date = ?")
            .bind(family_code)
            .bind(date)
            .fetch_optional(&mut *conn)
            .await
            .map_err(AppError::from)?;

    match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE daily_note SET temperature = ?, vaccine = ?, note = ?, created_at = ? \
                 WHERE id = ?",
            )
            .bind(payload.temperature)
            .bind(&payload.vaccine)
            .bind(&payload.note)
            .bind(created_at)
            .bind(&id)
            .execute(&mut *conn)
            .await
            .map_err(AppError::from)?;
            Ok(id)
        }
        None => {
            let id = new_uuid_v7();
            sqlx::query(
                "INSERT INTO daily_note (id, family_code, date, temperature, vaccine, note, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&id)
            .bind(family_code)
            .bind(date)
            .bind(payload.temperature)
            .bind(&payload.vaccine)
            .bind(&payload.note)
            .bind(created_at)
            .execute(&mut *conn)
            .await
            .map_err(AppError::from)?;
            Ok(id)
        }
    }
}

/// Replace the day's entry, creating it if absent. The lookup and write run
/// in one transaction so sequential saves can never produce a second row
/// for the same (family, date).
pub async fn save(
    pool: &SqlitePool,
    family_code: &str,
    date: &str,
    entry: DayEntrySave,
) -> AppResult<SaveAck> {
    let family_code = family_code.to_string();
    let date = date.to_string();
    run_in_tx(pool, move |tx| {
        async move {
            let now = now_ms();
            let id = match entry {
                DayEntrySave::Supplement(items) => {
                    save_checklist(
                        &mut **tx,
                        ChecklistTable::Supplement,
                        &family_code,
                        &date,
                        &items,
                        now,
                    )
                    .await?
                }
                DayEntrySave::Care(items) => {
                    save_checklist(&mut **tx, ChecklistTable::Care, &family_code, &date, &items, now)
                        .await?
                }
                DayEntrySave::Note(payload) => {
                    save_note(&mut **tx, &family_code, &date, &payload, now).await?
                }
            };
            Ok(SaveAck { id })
        }
        .boxed()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_parse_accepts_wire_and_table_names() {
        assert_eq!(
            DayEntryKind::parse("dailyNote").unwrap(),
            DayEntryKind::DailyNote
        );
        assert_eq!(
            DayEntryKind::parse("daily_note").unwrap(),
            DayEntryKind::DailyNote
        );
        let err = DayEntryKind::parse("medication").unwrap_err();
        assert_eq!(err.code(), DAY_ENTRY_UNKNOWN_KIND);
    }

    #[test]
    fn save_parse_keeps_kinds_apart() {
        let save = DayEntrySave::parse(
            DayEntryKind::Care,
            json!({"items": {"bath": true, "nails": false}}),
        )
        .unwrap();
        assert_eq!(save.kind(), DayEntryKind::Care);

        let err = DayEntrySave::parse(DayEntryKind::DailyNote, json!({"temperature": "warm"}))
            .unwrap_err();
        assert_eq!(err.code(), PAYLOAD_INVALID);
    }

    #[test]
    fn note_payload_defaults_match_the_write_shape() {
        let payload: DailyNotePayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(payload.temperature, 0.0);
        assert!(payload.vaccine.is_empty());
        assert!(payload.note.is_empty());
    }
}
