use super::domain::{AssessmentEntry, UserId};
use chrono::{Months, NaiveDate};

/// Assessments are expected monthly.
pub const ASSESSMENT_INTERVAL: Months = Months::new(1);

/// Date the user's next assessment is due: one month after their most recent
/// assessment date, clamped to the end of shorter months.
pub fn next_assessment_due(entries: &[AssessmentEntry], user: &UserId) -> Option<NaiveDate> {
    entries
        .iter()
        .filter(|entry| &entry.user_id == user)
        .map(|entry| entry.assessment_date)
        .max()
        .and_then(|latest| latest.checked_add_months(ASSESSMENT_INTERVAL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::{CategoryId, EntryId, Score};
    use chrono::{TimeZone, Utc};

    fn entry(user: &str, date: NaiveDate) -> AssessmentEntry {
        AssessmentEntry {
            id: EntryId::new(format!("{user}-{date}")).expect("valid id"),
            user_id: UserId::new(user).expect("valid user"),
            category_id: CategoryId::new("a").expect("valid category"),
            score: Score::Three,
            assessment_date: date,
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("valid timestamp"),
            notes: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn due_one_month_after_latest_assessment() {
        let entries = vec![
            entry("u1", date(2024, 1, 10)),
            entry("u1", date(2024, 2, 15)),
            entry("u2", date(2024, 6, 1)),
        ];
        let user = UserId::new("u1").expect("valid user");
        assert_eq!(next_assessment_due(&entries, &user), Some(date(2024, 3, 15)));
    }

    #[test]
    fn month_end_is_clamped() {
        let entries = vec![entry("u1", date(2024, 1, 31))];
        let user = UserId::new("u1").expect("valid user");
        assert_eq!(next_assessment_due(&entries, &user), Some(date(2024, 2, 29)));
    }

    #[test]
    fn none_without_history() {
        let user = UserId::new("u1").expect("valid user");
        assert_eq!(next_assessment_due(&[], &user), None);
    }
}
