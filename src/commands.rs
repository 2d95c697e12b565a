use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::day_entry::{self, DayEntry, DayEntryKind, DayEntrySave};
use crate::family;
use crate::model::{
    LoginAck, SaveAck, FAMILY_CODE_REQUIRED, FAMILY_CODE_TOO_SHORT, MIN_FAMILY_CODE_CHARS,
    SETTINGS_KEY_REQUIRED, VALIDATION_DATE_FORMAT, VALIDATION_DATE_REQUIRED,
};
use crate::settings;
use crate::snapshot::{self, ImportReport, Snapshot};
use crate::stats::{self, DayStats};
use crate::store::{self, ActivityRecord, RecordInput, RecordKind};
use crate::{AppError, AppResult};

// The operation surface consumed by external transports. Scope and shape
// checks happen here, before any storage access; below this layer every
// call is typed.

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date validation pattern to compile"));

fn require_family_code(family_code: &str) -> AppResult<()> {
    if family_code.trim().is_empty() {
        Err(AppError::new(
            FAMILY_CODE_REQUIRED,
            "A family code is required.",
        ))
    } else {
        Ok(())
    }
}

fn require_date(date: &str) -> AppResult<()> {
    if date.trim().is_empty() {
        return Err(AppError::new(VALIDATION_DATE_REQUIRED, "A date is required."));
    }
    if !DATE_PATTERN.is_match(date) {
        return Err(
            AppError::new(VALIDATION_DATE_FORMAT, "Dates use the YYYY-MM-DD form.")
                .with_context("date", date.to_string()),
        );
    }
    Ok(())
}

/// Register or re-enter a family scope. The code is a shared token, not a
/// verified credential; anything long enough opens (or creates) its scope.
pub async fn login(pool: &SqlitePool, family_code: &str) -> AppResult<LoginAck> {
    require_family_code(family_code)?;
    if family_code.chars().count() < MIN_FAMILY_CODE_CHARS {
        return Err(AppError::new(
            FAMILY_CODE_TOO_SHORT,
            "Family codes need at least 4 characters.",
        )
        .with_context("length", family_code.chars().count().to_string()));
    }

    let fam = family::ensure_family(pool, family_code)
        .await
        .map_err(|err| err.with_context("operation", "login"))?;
    Ok(LoginAck {
        success: true,
        family_code: fam.code,
    })
}

pub async fn list_records(
    pool: &SqlitePool,
    family_code: &str,
    table: &str,
    date: &str,
) -> AppResult<Vec<ActivityRecord>> {
    require_family_code(family_code)?;
    require_date(date)?;
    let kind = RecordKind::parse(table)?;
    store::list(pool, family_code, kind, date)
        .await
        .map_err(|err| {
            err.with_context("operation", "list")
                .with_context("table", kind.as_str())
                .with_context("family_code", family_code.to_string())
        })
}

pub async fn add_record(
    pool: &SqlitePool,
    family_code: &str,
    table: &str,
    fields: Value,
) -> AppResult<ActivityRecord> {
    require_family_code(family_code)?;
    let kind = RecordKind::parse(table)?;
    let input = RecordInput::parse(kind, fields)?;
    store::add(pool, family_code, input).await.map_err(|err| {
        err.with_context("operation", "add")
            .with_context("table", kind.as_str())
            .with_context("family_code", family_code.to_string())
    })
}

pub async fn delete_record(
    pool: &SqlitePool,
    family_code: &str,
    table: &str,
    id: &str,
) -> AppResult<()> {
    require_family_code(family_code)?;
    let kind = RecordKind::parse(table)?;
    store::remove(pool, family_code, kind, id)
        .await
        .map_err(|err| {
            err.with_context("operation", "delete")
                .with_context("table", kind.as_str())
                .with_context("family_code", family_code.to_string())
                .with_context("id", id.to_string())
        })
}

pub async fn get_day_entry(
    pool: &SqlitePool,
    family_code: &str,
    kind: &str,
    date: &str,
) -> AppResult<Option<DayEntry>> {
    require_family_code(family_code)?;
    require_date(date)?;
    let kind = DayEntryKind::parse(kind)?;
    day_entry::get(pool, family_code, kind, date)
        .await
        .map_err(|err| {
            err.with_context("operation", "day_entry_get")
                .with_context("kind", kind.as_str())
                .with_context("family_code", family_code.to_string())
        })
}

pub async fn save_day_entry(
    pool: &SqlitePool,
    family_code: &str,
    kind: &str,
    date: &str,
    payload: Value,
) -> AppResult<SaveAck> {
    require_family_code(family_code)?;
    require_date(date)?;
    let kind = DayEntryKind::parse(kind)?;
    let entry = DayEntrySave::parse(kind, payload)?;
    day_entry::save(pool, family_code, date, entry)
        .await
        .map_err(|err| {
            err.with_context("operation", "day_entry_save")
                .with_context("kind", kind.as_str())
                .with_context("family_code", family_code.to_string())
        })
}

pub async fn get_settings(
    pool: &SqlitePool,
    family_code: &str,
) -> AppResult<BTreeMap<String, String>> {
    require_family_code(family_code)?;
    settings::all(pool, family_code).await.map_err(|err| {
        err.with_context("operation", "settings_get")
            .with_context("family_code", family_code.to_string())
    })
}

pub async fn set_setting(
    pool: &SqlitePool,
    family_code: &str,
    key: &str,
    value: &str,
) -> AppResult<()> {
    require_family_code(family_code)?;
    if key.trim().is_empty() {
        return Err(AppError::new(
            SETTINGS_KEY_REQUIRED,
            "A settings key is required.",
        ));
    }
    settings::set(pool, family_code, key, value)
        .await
        .map_err(|err| {
            err.with_context("operation", "settings_set")
                .with_context("family_code", family_code.to_string())
                .with_context("key", key.to_string())
        })
}

pub async fn day_stats(pool: &SqlitePool, family_code: &str, date: &str) -> AppResult<DayStats> {
    require_family_code(family_code)?;
    require_date(date)?;
    stats::day_stats(pool, family_code, date)
        .await
        .map_err(|err| {
            err.with_context("operation", "day_stats")
                .with_context("family_code", family_code.to_string())
                .with_context("date", date.to_string())
        })
}

pub async fn export_all(pool: &SqlitePool, family_code: &str) -> AppResult<Snapshot> {
    require_family_code(family_code)?;
    snapshot::export_family(pool, family_code)
        .await
        .map_err(|err| {
            err.with_context("operation", "export")
                .with_context("family_code", family_code.to_string())
        })
}

pub async fn import_all(
    pool: &SqlitePool,
    family_code: &str,
    snapshot: Snapshot,
) -> AppResult<ImportReport> {
    require_family_code(family_code)?;
    snapshot::import_snapshot(pool, family_code, snapshot)
        .await
        .map_err(|err| {
            err.with_context("operation", "import")
                .with_context("family_code", family_code.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_validation_distinguishes_missing_from_malformed() {
        assert!(require_date("2024-02-29").is_ok());
        assert_eq!(
            require_date("").unwrap_err().code(),
            VALIDATION_DATE_REQUIRED
        );
        assert_eq!(
            require_date("Jan 1st").unwrap_err().code(),
            VALIDATION_DATE_FORMAT
        );
    }

    #[test]
    fn blank_family_code_is_rejected() {
        assert_eq!(
            require_family_code("  ").unwrap_err().code(),
            FAMILY_CODE_REQUIRED
        );
        assert!(require_family_code("AAAA").is_ok());
    }
}
