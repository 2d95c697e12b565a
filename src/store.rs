use serde::Serialize;
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::id::new_uuid_v7;
use crate::model::{
    DiaperKind, DiaperRecord, EducationCategory, EducationRecord, FeedingRecord, NewDiaper,
    NewEducation, NewFeeding, NewSleep, SleepDirection, SleepRecord, PAYLOAD_INVALID,
    STORE_DECODE_ERROR, STORE_UNKNOWN_TABLE,
};
use crate::time::now_ms;
use crate::{AppError, AppResult};

/// Closed set of multi-entry record tables. Kind strings coming off the wire
/// parse exactly once, at the boundary; below this everything is typed and
/// every query is static SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Feeding,
    Diaper,
    Sleep,
    Education,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Feeding,
        RecordKind::Diaper,
        RecordKind::Sleep,
        RecordKind::Education,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Feeding => "feeding",
            RecordKind::Diaper => "diaper",
            RecordKind::Sleep => "sleep",
            RecordKind::Education => "education",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "feeding" => Ok(RecordKind::Feeding),
            "diaper" => Ok(RecordKind::Diaper),
            "sleep" => Ok(RecordKind::Sleep),
            "education" => Ok(RecordKind::Education),
            other => Err(AppError::new(STORE_UNKNOWN_TABLE, "Unknown record table")
                .with_context("table", other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActivityRecord {
    Feeding(FeedingRecord),
    Diaper(DiaperRecord),
    Sleep(SleepRecord),
    Education(EducationRecord),
}

impl ActivityRecord {
    pub fn id(&self) -> &str {
        match self {
            ActivityRecord::Feeding(r) => &r.id,
            ActivityRecord::Diaper(r) => &r.id,
            ActivityRecord::Sleep(r) => &r.id,
            ActivityRecord::Education(r) => &r.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            ActivityRecord::Feeding(_) => RecordKind::Feeding,
            ActivityRecord::Diaper(_) => RecordKind::Diaper,
            ActivityRecord::Sleep(_) => RecordKind::Sleep,
            ActivityRecord::Education(_) => RecordKind::Education,
        }
    }

    pub fn created_at(&self) -> i64 {
        match self {
            ActivityRecord::Feeding(r) => r.created_at,
            ActivityRecord::Diaper(r) => r.created_at,
            ActivityRecord::Sleep(r) => r.created_at,
            ActivityRecord::Education(r) => r.created_at,
        }
    }
}

/// Per-kind creation payload, parsed from loose JSON at the boundary.
#[derive(Debug, Clone)]
pub enum RecordInput {
    Feeding(NewFeeding),
    Diaper(NewDiaper),
    Sleep(NewSleep),
    Education(NewEducation),
}

impl RecordInput {
    pub fn parse(kind: RecordKind, fields: Value) -> AppResult<Self> {
        let invalid = |err: serde_json::Error| {
            AppError::new(PAYLOAD_INVALID, "Record payload does not match its table")
                .with_context("table", kind.as_str())
                .with_cause(AppError::from(err))
        };
        match kind {
            RecordKind::Feeding => serde_json::from_value(fields)
                .map(RecordInput::Feeding)
                .map_err(invalid),
            RecordKind::Diaper => serde_json::from_value(fields)
                .map(RecordInput::Diaper)
                .map_err(invalid),
            RecordKind::Sleep => serde_json::from_value(fields)
                .map(RecordInput::Sleep)
                .map_err(invalid),
            RecordKind::Education => serde_json::from_value(fields)
                .map(RecordInput::Education)
                .map_err(invalid),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            RecordInput::Feeding(_) => RecordKind::Feeding,
            RecordInput::Diaper(_) => RecordKind::Diaper,
            RecordInput::Sleep(_) => RecordKind::Sleep,
            RecordInput::Education(_) => RecordKind::Education,
        }
    }
}

fn decode_error(table: &'static str, column: &'static str, value: String) -> AppError {
    AppError::new(STORE_DECODE_ERROR, "Stored value is not a recognised variant")
        .with_context("table", table)
        .with_context("column", column)
        .with_context("value", value)
}

pub(crate) fn feeding_from_row(row: SqliteRow) -> AppResult<FeedingRecord> {
    Ok(FeedingRecord {
        id: row.try_get("id").map_err(AppError::from)?,
        date: row.try_get("date").map_err(AppError::from)?,
        time: row.try_get("time").map_err(AppError::from)?,
        breast_left: row.try_get("breast_left").map_err(AppError::from)?,
        breast_right: row.try_get("breast_right").map_err(AppError::from)?,
        bottle_breast_milk: row.try_get("bottle_breast_milk").map_err(AppError::from)?,
        bottle_formula: row.try_get("bottle_formula").map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}

pub(crate) fn diaper_from_row(row: SqliteRow) -> AppResult<DiaperRecord> {
    let kind_raw: String = row.try_get("kind").map_err(AppError::from)?;
    let kind = DiaperKind::parse(&kind_raw)
        .ok_or_else(|| decode_error("diaper", "kind", kind_raw))?;
    Ok(DiaperRecord {
        id: row.try_get("id").map_err(AppError::from)?,
        date: row.try_get("date").map_err(AppError::from)?,
        time: row.try_get("time").map_err(AppError::from)?,
        kind,
        color: row.try_get("color").map_err(AppError::from)?,
        amount: row.try_get("amount").map_err(AppError::from)?,
        note: row.try_get("note").map_err(AppError::from)?,
        image: row.try_get("image").map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}

pub(crate) fn sleep_from_row(row: SqliteRow) -> AppResult<SleepRecord> {
    let direction_raw: Option<String> = row.try_get("direction").map_err(AppError::from)?;
    let direction = match direction_raw {
        Some(raw) => Some(
            SleepDirection::parse(&raw).ok_or_else(|| decode_error("sleep", "direction", raw))?,
        ),
        None => None,
    };
    Ok(SleepRecord {
        id: row.try_get("id").map_err(AppError::from)?,
        date: row.try_get("date").map_err(AppError::from)?,
        start_time: row.try_get("start_time").map_err(AppError::from)?,
        end_time: row.try_get("end_time").map_err(AppError::from)?,
        direction,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}

pub(crate) fn education_from_row(row: SqliteRow) -> AppResult<EducationRecord> {
    let category_raw: String = row.try_get("category").map_err(AppError::from)?;
    let category = EducationCategory::parse(&category_raw)
        .ok_or_else(|| decode_error("education", "category", category_raw))?;
    Ok(EducationRecord {
        id: row.try_get("id").map_err(AppError::from)?,
        date: row.try_get("date").map_err(AppError::from)?,
        category,
        duration_min: row.try_get("duration").map_err(AppError::from)?,
        content: row.try_get("content").map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}

pub(crate) async fn list_feeding(
    pool: &SqlitePool,
    family_code: &str,
    date: &str,
) -> AppResult<Vec<FeedingRecord>> {
    let rows = sqlx::query(
        "SELECT id, date, time, breast_left, breast_right, bottle_breast_milk, bottle_formula, created_at \
         FROM feeding WHERE family_code = ? AND date = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(family_code)
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?;
    rows.into_iter().map(feeding_from_row).collect()
}

pub(crate) async fn list_diaper(
    pool: &SqlitePool,
    family_code: &str,
    date: &str,
) -> AppResult<Vec<DiaperRecord>> {
    let rows = sqlx::query(
        "SELECT id, date, time, kind, color, amount, note, image, created_at \
         FROM diaper WHERE family_code = ? AND date = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(family_code)
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?;
    rows.into_iter().map(diaper_from_row).collect()
}

pub(crate) async fn list_sleep(
    pool: &SqlitePool,
    family_code: &str,
    date: &str,
) -> AppResult<Vec<SleepRecord>> {
    let rows = sqlx::query(
        "SELECT id, date, start_time, end_time, direction, created_at \
         FROM sleep WHERE family_code = ? AND date = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(family_code)
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?;
    rows.into_iter().map(sleep_from_row).collect()
}

pub(crate) async fn list_education(
    pool: &SqlitePool,
    family_code: &str,
    date: &str,
) -> AppResult<Vec<EducationRecord>> {
    let rows = sqlx::query(
        "SELECT id, date, category, duration, content, created_at \
         FROM education WHERE family_code = ? AND date = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(family_code)
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?;
    rows.into_iter().map(education_from_row).collect()
}

/// All records of one kind for a family and date, creation order ascending.
/// An empty day is an empty vec, never an error.
pub async fn list(
    pool: &SqlitePool,
    family_code: &str,
    kind: RecordKind,
    date: &str,
) -> AppResult<Vec<ActivityRecord>> {
    Ok(match kind {
        RecordKind::Feeding => list_feeding(pool, family_code, date)
            .await?
            .into_iter()
            .map(ActivityRecord::Feeding)
            .collect(),
        RecordKind::Diaper => list_diaper(pool, family_code, date)
            .await?
            .into_iter()
            .map(ActivityRecord::Diaper)
            .collect(),
        RecordKind::Sleep => list_sleep(pool, family_code, date)
            .await?
            .into_iter()
            .map(ActivityRecord::Sleep)
            .collect(),
        RecordKind::Education => list_education(pool, family_code, date)
            .await?
            .into_iter()
            .map(ActivityRecord::Education)
            .collect(),
    })
}

fn resolve_created_at(requested: Option<i64>) -> i64 {
    match requested {
        Some(ms) if ms > 0 => ms,
        _ => now_ms(),
    }
}

/// Insert one record, assigning id and capture timestamp. Multi-entry
/// records are immutable after this point: add and remove only.
pub async fn add(
    pool: &SqlitePool,
    family_code: &str,
    input: RecordInput,
) -> AppResult<ActivityRecord> {
    let id = new_uuid_v7();
    match input {
        RecordInput::Feeding(new) => {
            let record = FeedingRecord {
                id,
                date: new.date,
                time: new.time,
                breast_left: new.breast_left,
                breast_right: new.breast_right,
                bottle_breast_milk: new.bottle_breast_milk,
                bottle_formula: new.bottle_formula,
                created_at: resolve_created_at(new.created_at),
            };
            sqlx::query(
                "INSERT INTO feeding \
                 (id, family_code, date, time, breast_left, breast_right, bottle_breast_milk, bottle_formula, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .bind(&record.id)
            .bind(family_code)
            .bind(&record.date)
            .bind(&record.time)
            .bind(record.breast_left)
            .bind(record.breast_right)
            .bind(record.bottle_breast_milk)
            .bind(record.bottle_formula)
            .bind(record.created_at)
            .execute(pool)
            .await
            .map_err(AppError::from)?;
            Ok(ActivityRecord::Feeding(record))
        }
        RecordInput::Diaper(new) => {
            let record = DiaperRecord {
                id,
                date: new.date,
                time: new.time,
                kind: new.kind,
                color: new.color,
                amount: new.amount,
                note: new.note,
                image: new.image,
                created_at: resolve_created_at(new.created_at),
            };
            sqlx::query(
                "INSERT INTO diaper \
                 (id, family_code, date, time, kind, color, amount, note, image, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .bind(&record.id)
            .bind(family_code)
            .bind(&record.date)
            .bind(&record.time)
            .bind(record.kind.as_str())
            .bind(&record.color)
            .bind(&record.amount)
            .bind(&record.note)
            .bind(record.image.as_deref())
            .bind(record.created_at)
            .execute(pool)
            .await
            .map_err(AppError::from)?;
            Ok(ActivityRecord::Diaper(record))
        }
        RecordInput::Sleep(new) => {
            let record = SleepRecord {
                id,
                date: new.date,
                start_time: new.start_time,
                end_time: new.end_time,
                direction: new.direction,
                created_at: resolve_created_at(new.created_at),
            };
            sqlx::query(
                "INSERT INTO sleep \
                 (id, family_code, date, start_time, end_time, direction, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&record.id)
            .bind(family_code)
            .bind(&record.date)
            .bind(&record.start_time)
            .bind(record.end_time.as_deref())
            .bind(record.direction.map(SleepDirection::as_str))
            .bind(record.created_at)
            .execute(pool)
            .await
            .map_err(AppError::from)?;
            Ok(ActivityRecord::Sleep(record))
        }
        RecordInput::Education(new) => {
            let record = EducationRecord {
                id,
                date: new.date,
                category: new.category,
                duration_min: new.duration_min,
                content: new.content,
                created_at: resolve_created_at(new.created_at),
            };
            sqlx::query(
                "INSERT INTO education \
                 (id, family_code, date, category, duration, content, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&record.id)
            .bind(family_code)
            .bind(&record.date)
            .bind(record.category.as_str())
            .bind(record.duration_min)
            .bind(&record.content)
            .bind(record.created_at)
            .execute(pool)
            .await
            .map_err(AppError::from)?;
            Ok(ActivityRecord::Education(record))
        }
    }
}

/// Delete is "ensure absence": the row must match both id and family scope,
/// and deleting a row that is already gone succeeds.
pub async fn remove(
    pool: &SqlitePool,
    family_code: &str,
    kind: RecordKind,
    id: &str,
) -> AppResult<()> {
    let sql = match kind {
        RecordKind::Feeding => "DELETE FROM feeding WHERE family_code = ? AND id = ?",
        RecordKind::Diaper => "DELETE FROM diaper WHERE family_code = ? AND id = ?",
        RecordKind::Sleep => "DELETE FROM sleep WHERE family_code = ? AND id = ?",
        RecordKind::Education => "DELETE FROM education WHERE family_code = ? AND id = ?",
    };
    let res = sqlx::query(sql)
        .bind(family_code)
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::from)?;
    if res.rows_affected() == 0 {
        tracing::debug!(
            target: "bairnlog",
            event = "record_delete_noop",
            table = kind.as_str(),
            id
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_parse_round_trips() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_a_request_error() {
        let err = RecordKind::parse("medication").unwrap_err();
        assert_eq!(err.code(), STORE_UNKNOWN_TABLE);
        assert_eq!(err.context().get("table").map(String::as_str), Some("medication"));
    }

    #[test]
    fn input_parse_rejects_mismatched_payloads() {
        let err = RecordInput::parse(
            RecordKind::Diaper,
            json!({"date": "2024-01-01", "time": "08:00", "type": "solid"}),
        )
        .unwrap_err();
        assert_eq!(err.code(), PAYLOAD_INVALID);
    }

    #[test]
    fn input_parse_accepts_minimal_feeding() {
        let input = RecordInput::parse(
            RecordKind::Feeding,
            json!({"date": "2024-01-01", "time": "08:00", "bottleFormula": 90}),
        )
        .unwrap();
        match input {
            RecordInput::Feeding(new) => {
                assert_eq!(new.bottle_formula, 90);
                assert_eq!(new.breast_left, 0);
                assert!(new.created_at.is_none());
            }
            other => panic!("expected feeding input, got {:?}", other.kind()),
        }
    }
}
