use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FAMILY_CODE_REQUIRED: &str = "FAMILY/CODE_REQUIRED";
pub const FAMILY_CODE_TOO_SHORT: &str = "FAMILY/CODE_TOO_SHORT";
pub const VALIDATION_DATE_REQUIRED: &str = "VALIDATION/DATE_REQUIRED";
pub const VALIDATION_DATE_FORMAT: &str = "VALIDATION/DATE_FORMAT";
pub const SETTINGS_KEY_REQUIRED: &str = "SETTINGS/KEY_REQUIRED";
pub const STORE_UNKNOWN_TABLE: &str = "STORE/UNKNOWN_TABLE";
pub const STORE_DECODE_ERROR: &str = "STORE/DECODE";
pub const DAY_ENTRY_UNKNOWN_KIND: &str = "DAY_ENTRY/UNKNOWN_KIND";
pub const PAYLOAD_INVALID: &str = "PAYLOAD/INVALID";

/// A family code is a shared token, not a credential; the only rule is a
/// minimum length so a typo doesn't silently open a fresh scope.
pub const MIN_FAMILY_CODE_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiaperKind {
    Pee,
    Poop,
    Both,
}

impl DiaperKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiaperKind::Pee => "pee",
            DiaperKind::Poop => "poop",
            DiaperKind::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pee" => Some(DiaperKind::Pee),
            "poop" => Some(DiaperKind::Poop),
            "both" => Some(DiaperKind::Both),
            _ => None,
        }
    }

    pub fn involves_poop(self) -> bool {
        matches!(self, DiaperKind::Poop | DiaperKind::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepDirection {
    Left,
    Center,
    Right,
}

impl SleepDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SleepDirection::Left => "left",
            SleepDirection::Center => "center",
            SleepDirection::Right => "right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(SleepDirection::Left),
            "center" => Some(SleepDirection::Center),
            "right" => Some(SleepDirection::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationCategory {
    Visual,
    Auditory,
    GrossMotor,
    FineMotor,
}

impl EducationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            EducationCategory::Visual => "visual",
            EducationCategory::Auditory => "auditory",
            EducationCategory::GrossMotor => "gross-motor",
            EducationCategory::FineMotor => "fine-motor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "visual" => Some(EducationCategory::Visual),
            "auditory" => Some(EducationCategory::Auditory),
            "gross-motor" => Some(EducationCategory::GrossMotor),
            "fine-motor" => Some(EducationCategory::FineMotor),
            _ => None,
        }
    }
}

/// Ordered checklist-name → done mapping. Persisted as an opaque JSON blob
/// that round-trips byte-for-byte: key order and values are preserved
/// (`serde_json` is built with `preserve_order`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checklist(pub serde_json::Map<String, Value>);

impl Checklist {
    pub fn total(&self) -> usize {
        self.0.len()
    }

    pub fn done(&self) -> usize {
        self.0
            .values()
            .filter(|v| v.as_bool().unwrap_or(false))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingRecord {
    #[serde(default)]
    pub id: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub breast_left: i64,
    #[serde(default)]
    pub breast_right: i64,
    #[serde(default)]
    pub bottle_breast_milk: i64,
    #[serde(default)]
    pub bottle_formula: i64,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaperRecord {
    #[serde(default)]
    pub id: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: DiaperKind,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepRecord {
    #[serde(default)]
    pub id: String,
    pub date: String,
    pub start_time: String,
    /// Absent while the sleep is still in progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SleepDirection>,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationRecord {
    #[serde(default)]
    pub id: String,
    pub date: String,
    pub category: EducationCategory,
    #[serde(default, rename = "duration")]
    pub duration_min: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementRecord {
    #[serde(default)]
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub items: Checklist,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareRecord {
    #[serde(default)]
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub items: Checklist,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNote {
    #[serde(default)]
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub vaccine: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub code: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAck {
    pub success: bool,
    pub family_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveAck {
    pub id: String,
}

// Inputs for record creation: the caller never supplies an id, and
// `createdAt` is assigned at write time when omitted.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeeding {
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub breast_left: i64,
    #[serde(default)]
    pub breast_right: i64,
    #[serde(default)]
    pub bottle_breast_milk: i64,
    #[serde(default)]
    pub bottle_formula: i64,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDiaper {
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: DiaperKind,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSleep {
    pub date: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub direction: Option<SleepDirection>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEducation {
    pub date: String,
    pub category: EducationCategory,
    #[serde(default, rename = "duration")]
    pub duration_min: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}
