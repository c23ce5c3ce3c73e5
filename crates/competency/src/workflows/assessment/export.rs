use super::domain::{AssessmentEntry, SkillCategory, UserId};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV export: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV export is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Score")]
    score: u8,
    #[serde(rename = "Notes")]
    notes: &'a str,
}

/// Write one row per entry (newest first), optionally restricted to `user`.
/// Entries referencing unknown categories keep an empty category column.
pub fn export_entries_csv<W: Write>(
    writer: W,
    categories: &[SkillCategory],
    entries: &[AssessmentEntry],
    user: Option<&UserId>,
) -> Result<usize, ExportError> {
    let names: HashMap<_, _> = categories
        .iter()
        .map(|category| (&category.id, category.name.as_str()))
        .collect();

    let mut selected: Vec<&AssessmentEntry> = entries
        .iter()
        .filter(|entry| user.map_or(true, |user| &entry.user_id == user))
        .collect();
    selected.sort_by(|left, right| {
        (right.assessment_date, right.created_at, &right.id).cmp(&(
            left.assessment_date,
            left.created_at,
            &left.id,
        ))
    });

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(["Date", "Category", "Score", "Notes"])?;

    for entry in &selected {
        csv_writer.serialize(ExportRow {
            date: entry.assessment_date,
            category: names.get(&entry.category_id).copied().unwrap_or_default(),
            score: entry.score.value(),
            notes: entry.notes.as_deref().unwrap_or_default(),
        })?;
    }

    csv_writer.flush()?;
    Ok(selected.len())
}

pub fn export_entries_csv_string(
    categories: &[SkillCategory],
    entries: &[AssessmentEntry],
    user: Option<&UserId>,
) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    export_entries_csv(&mut buffer, categories, entries, user)?;
    Ok(String::from_utf8(buffer)?)
}
