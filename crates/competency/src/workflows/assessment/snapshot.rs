use super::domain::{
    AssessmentEntry, CategoryId, CompetencyError, EntryId, Goal, GoalId, Score, SkillCategory,
    UserId,
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Loosely typed records exactly as the backing store returns them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub categories: Vec<RawRecord<RawCategory>>,
    #[serde(default)]
    pub entries: Vec<RawRecord<RawEntry>>,
    #[serde(default)]
    pub goals: Vec<RawRecord<RawGoal>>,
}

/// One array element of a snapshot. A record whose fields have the wrong JSON
/// types is kept as `Malformed` so the rest of the document still parses.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord<T> {
    Parsed(T),
    Malformed { id: Option<String>, reason: String },
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for RawRecord<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let id = match value.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Ok(match serde_json::from_value(value) {
            Ok(record) => Self::Parsed(record),
            Err(err) => Self::Malformed {
                id,
                reason: format!("malformed record: {err}"),
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCategory {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEntry {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<String>,
    #[serde(
        default,
        alias = "skill_category_id",
        deserialize_with = "empty_string_as_none"
    )]
    pub category_id: Option<String>,
    #[serde(default)]
    pub score: Option<RawScore>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub assessment_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawGoal {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<String>,
    #[serde(
        default,
        alias = "skill_category_id",
        deserialize_with = "empty_string_as_none"
    )]
    pub category_id: Option<String>,
    #[serde(default)]
    pub target_score: Option<RawScore>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub target_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
}

/// Scores arrive either as JSON numbers or as the store's `"1"`..`"5"` strings.
/// Anything else (fractions, booleans, objects) is held in `Other` and rejected
/// when the record is validated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Number(i64),
    Text(String),
    Other(Value),
}

impl RawScore {
    pub fn to_score(&self) -> Result<Score, CompetencyError> {
        match self {
            RawScore::Number(value) => Score::from_i64(*value),
            RawScore::Text(raw) => Score::parse(raw),
            RawScore::Other(value) => Err(CompetencyError::InvalidScore {
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Category,
    Entry,
    Goal,
}

impl RecordKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Entry => "assessment entry",
            Self::Goal => "goal",
        }
    }
}

/// A record dropped during validation, kept so callers can surface it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub kind: RecordKind,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reason: String,
}

/// Typed, validated input for one computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSnapshot {
    pub categories: Vec<SkillCategory>,
    pub entries: Vec<AssessmentEntry>,
    pub goals: Vec<Goal>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedSnapshot {
    pub snapshot: AssessmentSnapshot,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssessmentSnapshot {
    /// Validate raw records, skipping malformed ones and continuing with the rest.
    pub fn from_raw(raw: RawSnapshot) -> ValidatedSnapshot {
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(raw.categories.len());

        for (index, record) in raw.categories.into_iter().enumerate() {
            let record = match record {
                RawRecord::Parsed(record) => record,
                RawRecord::Malformed { id, reason } => {
                    skipped.push(skip(RecordKind::Category, index, id, reason));
                    continue;
                }
            };
            let id = record.id.clone();
            match category_from_raw(record) {
                Ok(category) if !seen.insert(category.id.clone()) => skipped.push(skip(
                    RecordKind::Category,
                    index,
                    id,
                    CompetencyError::DuplicateCategory { id: category.id },
                )),
                Ok(category) => categories.push(category),
                Err(err) => skipped.push(skip(RecordKind::Category, index, id, err)),
            }
        }

        categories.sort_by(|left, right| {
            left.sort_order
                .cmp(&right.sort_order)
                .then_with(|| left.id.cmp(&right.id))
        });

        let mut entries = Vec::with_capacity(raw.entries.len());
        for (index, record) in raw.entries.into_iter().enumerate() {
            let record = match record {
                RawRecord::Parsed(record) => record,
                RawRecord::Malformed { id, reason } => {
                    skipped.push(skip(RecordKind::Entry, index, id, reason));
                    continue;
                }
            };
            let id = record.id.clone();
            match entry_from_raw(record) {
                Ok(entry) => entries.push(entry),
                Err(reason) => skipped.push(skip(RecordKind::Entry, index, id, reason)),
            }
        }

        let mut goals = Vec::with_capacity(raw.goals.len());
        for (index, record) in raw.goals.into_iter().enumerate() {
            let record = match record {
                RawRecord::Parsed(record) => record,
                RawRecord::Malformed { id, reason } => {
                    skipped.push(skip(RecordKind::Goal, index, id, reason));
                    continue;
                }
            };
            let id = record.id.clone();
            match goal_from_raw(record) {
                Ok(goal) => goals.push(goal),
                Err(reason) => skipped.push(skip(RecordKind::Goal, index, id, reason)),
            }
        }

        if !skipped.is_empty() {
            tracing::warn!(skipped = skipped.len(), "snapshot contained malformed records");
        }

        ValidatedSnapshot {
            snapshot: AssessmentSnapshot {
                categories,
                entries,
                goals,
            },
            skipped,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ValidatedSnapshot, SnapshotError> {
        let raw: RawSnapshot = serde_json::from_reader(reader)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ValidatedSnapshot, SnapshotError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn entries_for<'a>(
        &'a self,
        user: &'a UserId,
    ) -> impl Iterator<Item = &'a AssessmentEntry> {
        self.entries.iter().filter(move |entry| &entry.user_id == user)
    }

    pub fn category(&self, id: &CategoryId) -> Option<&SkillCategory> {
        self.categories.iter().find(|category| &category.id == id)
    }
}

fn skip(
    kind: RecordKind,
    index: usize,
    id: Option<String>,
    reason: impl std::fmt::Display,
) -> SkippedRecord {
    let reason = reason.to_string();
    tracing::warn!(?kind, index, id = id.as_deref().unwrap_or("-"), %reason, "skipping record");
    SkippedRecord {
        kind,
        index,
        id,
        reason,
    }
}

fn category_from_raw(record: RawCategory) -> Result<SkillCategory, CompetencyError> {
    let id = CategoryId::new(record.id.unwrap_or_default())?;
    let name = record
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| id.to_string());

    Ok(SkillCategory {
        id,
        name,
        description: record.description.unwrap_or_default(),
        sort_order: record.sort_order.unwrap_or(i32::MAX),
    })
}

fn entry_from_raw(record: RawEntry) -> Result<AssessmentEntry, String> {
    let id = EntryId::new(record.id.unwrap_or_default()).map_err(|err| err.to_string())?;
    let user_id = UserId::new(record.user_id.unwrap_or_default()).map_err(|err| err.to_string())?;
    let category_id =
        CategoryId::new(record.category_id.unwrap_or_default()).map_err(|err| err.to_string())?;
    let score = record
        .score
        .ok_or_else(|| "score is required".to_string())?
        .to_score()
        .map_err(|err| err.to_string())?;
    let assessment_date = record
        .assessment_date
        .as_deref()
        .ok_or_else(|| "assessment_date is required".to_string())
        .and_then(parse_date)?;
    let created_at = created_at_or(record.created_at.as_deref(), assessment_date)?;

    Ok(AssessmentEntry {
        id,
        user_id,
        category_id,
        score,
        assessment_date,
        created_at,
        notes: record.notes,
    })
}

fn goal_from_raw(record: RawGoal) -> Result<Goal, String> {
    let id = GoalId::new(record.id.unwrap_or_default()).map_err(|err| err.to_string())?;
    let user_id = UserId::new(record.user_id.unwrap_or_default()).map_err(|err| err.to_string())?;
    let category_id =
        CategoryId::new(record.category_id.unwrap_or_default()).map_err(|err| err.to_string())?;
    let target_score = record
        .target_score
        .ok_or_else(|| "target_score is required".to_string())?
        .to_score()
        .map_err(|err| err.to_string())?;
    let target_date = record.target_date.as_deref().map(parse_date).transpose()?;
    let created_at = match record.created_at.as_deref() {
        Some(raw) => parse_timestamp(raw)?,
        None => DateTime::<Utc>::MIN_UTC,
    };

    Ok(Goal {
        id,
        user_id,
        category_id,
        target_score,
        target_date,
        created_at,
        notes: record.notes,
    })
}

fn created_at_or(raw: Option<&str>, fallback: NaiveDate) -> Result<DateTime<Utc>, String> {
    match raw {
        Some(value) => parse_timestamp(value),
        None => Ok(midnight(fallback)),
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| format!("'{raw}' is not a YYYY-MM-DD date"))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(midnight)
        .map_err(|_| format!("'{raw}' is not an RFC 3339 timestamp"))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ValidatedSnapshot {
        AssessmentSnapshot::from_reader(json.as_bytes()).expect("snapshot parses")
    }

    #[test]
    fn accepts_store_shaped_records() {
        let validated = parse(
            r#"{
                "categories": [
                    {"id": "b", "name": "Business Acumen", "sort_order": 2},
                    {"id": "a", "name": "Strategic Thinking", "description": "Big picture", "sort_order": 1}
                ],
                "entries": [
                    {"id": "e1", "user_id": "u1", "skill_category_id": "a", "score": "3",
                     "assessment_date": "2024-01-01", "created_at": "2024-01-01T10:00:00Z", "notes": ""},
                    {"id": "e2", "user_id": "u1", "category_id": "b", "score": 4,
                     "assessment_date": "2024-02-01"}
                ],
                "goals": [
                    {"id": "g1", "user_id": "u1", "skill_category_id": "a", "target_score": "5",
                     "created_at": "2024-01-05T00:00:00Z"}
                ]
            }"#,
        );

        assert!(validated.skipped.is_empty());
        let snapshot = validated.snapshot;
        let order: Vec<&str> = snapshot.categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0].score, Score::Three);
        assert!(snapshot.entries[0].notes.is_none());
        assert_eq!(
            snapshot.entries[1].created_at,
            midnight(NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date"))
        );
        assert_eq!(snapshot.goals[0].target_score, Score::Five);
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let validated = parse(
            r#"{
                "categories": [
                    {"id": "a", "name": "A", "sort_order": 1},
                    {"id": "a", "name": "Duplicate", "sort_order": 2},
                    {"name": "No id"}
                ],
                "entries": [
                    {"id": "e1", "user_id": "u1", "category_id": "a", "score": "7", "assessment_date": "2024-01-01"},
                    {"id": "e2", "user_id": "", "category_id": "a", "score": "2", "assessment_date": "2024-01-01"},
                    {"id": "e3", "user_id": "u1", "category_id": "a", "score": "2", "assessment_date": "01/02/2024"},
                    {"id": "e4", "user_id": "u1", "category_id": "a", "score": "2", "assessment_date": "2024-01-02"}
                ],
                "goals": [
                    {"id": "g1", "user_id": "u1", "category_id": "a", "target_score": 0}
                ]
            }"#,
        );

        let snapshot = &validated.snapshot;
        assert_eq!(snapshot.categories.len(), 1);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].id.as_str(), "e4");
        assert!(snapshot.goals.is_empty());

        let kinds: Vec<RecordKind> = validated.skipped.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecordKind::Category,
                RecordKind::Category,
                RecordKind::Entry,
                RecordKind::Entry,
                RecordKind::Entry,
                RecordKind::Goal,
            ]
        );
        assert!(validated.skipped[2].reason.contains("outside the 1-5 scale"));
        assert!(validated.skipped[3].reason.contains("user_id is required"));
    }

    #[test]
    fn wrongly_typed_fields_skip_only_their_record() {
        let validated = parse(
            r#"{
                "categories": [
                    {"id": "a", "name": "Strategic Thinking", "sort_order": 1},
                    {"id": "b", "name": "Business Acumen", "sort_order": "2"}
                ],
                "entries": [
                    {"id": "e1", "user_id": "u1", "category_id": "a", "score": 4,
                     "assessment_date": "2024-01-01"},
                    {"id": "e2", "user_id": "u1", "category_id": "a", "score": 3.5,
                     "assessment_date": "2024-01-02"},
                    {"id": "e3", "user_id": "u1", "category_id": "a", "score": true,
                     "assessment_date": "2024-01-03"},
                    {"id": 7, "user_id": ["u1"], "category_id": "a", "score": 2,
                     "assessment_date": "2024-01-04"}
                ],
                "goals": [
                    {"id": "g1", "user_id": "u1", "category_id": "a", "target_score": {}}
                ]
            }"#,
        );

        let snapshot = &validated.snapshot;
        assert_eq!(snapshot.categories.len(), 1);
        assert_eq!(snapshot.categories[0].id.as_str(), "a");
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].id.as_str(), "e1");

        let skipped: Vec<(RecordKind, Option<&str>)> = validated
            .skipped
            .iter()
            .map(|record| (record.kind, record.id.as_deref()))
            .collect();
        assert_eq!(
            skipped,
            vec![
                (RecordKind::Category, Some("b")),
                (RecordKind::Entry, Some("e2")),
                (RecordKind::Entry, Some("e3")),
                (RecordKind::Entry, Some("7")),
                (RecordKind::Goal, Some("g1")),
            ]
        );
        assert!(validated.skipped[0].reason.starts_with("malformed record"));
        assert_eq!(validated.skipped[1].reason, "'3.5' is not a valid score");
    }

    #[test]
    fn empty_document_is_valid() {
        let validated = parse("{}");
        assert_eq!(validated, ValidatedSnapshot::default());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let result = AssessmentSnapshot::from_reader("not json".as_bytes());
        assert!(matches!(result, Err(SnapshotError::Json(_))));
    }
}
