use serde::Serialize;
use sqlx::SqlitePool;

use crate::day_entry::{self, ChecklistTable};
use crate::model::{Checklist, DiaperRecord, FeedingRecord, SleepRecord};
use crate::store;
use crate::time::clock_span_minutes;
use crate::AppResult;

/// Derived summary for one (family, date). Exactly these ten fields; a day
/// with no data is all zeros.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub feeding_count: i64,
    pub total_milk: i64,
    pub total_breast_min: i64,
    pub diaper_count: i64,
    pub poop_count: i64,
    pub sleep_hours: f64,
    pub supplements_done: i64,
    pub supplements_total: i64,
    pub care_done: i64,
    pub care_total: i64,
}

/// Compute the day's statistics from stored rows. Read-only and
/// deterministic: the same stored state always folds to the same summary.
pub async fn day_stats(pool: &SqlitePool, family_code: &str, date: &str) -> AppResult<DayStats> {
    let feedings = store::list_feeding(pool, family_code, date).await?;
    let diapers = store::list_diaper(pool, family_code, date).await?;
    let sleeps = store::list_sleep(pool, family_code, date).await?;
    let supplement =
        day_entry::checklist_for_day(pool, ChecklistTable::Supplement, family_code, date).await?;
    let care = day_entry::checklist_for_day(pool, ChecklistTable::Care, family_code, date).await?;

    Ok(fold_day(
        &feedings,
        &diapers,
        &sleeps,
        supplement.as_ref(),
        care.as_ref(),
    ))
}

fn completion(items: Option<&Checklist>) -> (i64, i64) {
    match items {
        Some(items) => (items.done() as i64, items.total() as i64),
        None => (0, 0),
    }
}

pub(crate) fn fold_day(
    feedings: &[FeedingRecord],
    diapers: &[DiaperRecord],
    sleeps: &[SleepRecord],
    supplement: Option<&Checklist>,
    care: Option<&Checklist>,
) -> DayStats {
    let total_milk = feedings
        .iter()
        .map(|f| f.bottle_breast_milk + f.bottle_formula)
        .sum();
    let total_breast_min = feedings.iter().map(|f| f.breast_left + f.breast_right).sum();
    let poop_count = diapers.iter().filter(|d| d.kind.involves_poop()).count() as i64;

    // A sleep still in progress (or with an unparseable time) contributes 0.
    let sleep_minutes: i64 = sleeps
        .iter()
        .filter_map(|s| {
            s.end_time
                .as_deref()
                .and_then(|end| clock_span_minutes(&s.start_time, end))
        })
        .sum();
    let sleep_hours = (sleep_minutes as f64 / 6.0).round() / 10.0;

    let (supplements_done, supplements_total) = completion(supplement);
    let (care_done, care_total) = completion(care);

    DayStats {
        feeding_count: feedings.len() as i64,
        total_milk,
        total_breast_min,
        diaper_count: diapers.len() as i64,
        poop_count,
        sleep_hours,
        supplements_done,
        supplements_total,
        care_done,
        care_total,
    }
}
