use super::domain::{AssessmentEntry, CategoryId, Goal, UserId};

/// Current entry for a (user, category) pair: the maximum over
/// `(assessment_date, created_at, id)`, independent of input order.
pub fn latest_entry<'a>(
    entries: &'a [AssessmentEntry],
    user: &UserId,
    category: &CategoryId,
) -> Option<&'a AssessmentEntry> {
    entries
        .iter()
        .filter(|entry| &entry.user_id == user && &entry.category_id == category)
        .max_by(|left, right| {
            (left.assessment_date, left.created_at, &left.id).cmp(&(
                right.assessment_date,
                right.created_at,
                &right.id,
            ))
        })
}

/// Active goal for a (user, category) pair: the most recently created one.
pub fn active_goal<'a>(
    goals: &'a [Goal],
    user: &UserId,
    category: &CategoryId,
) -> Option<&'a Goal> {
    goals
        .iter()
        .filter(|goal| &goal.user_id == user && &goal.category_id == category)
        .max_by(|left, right| (left.created_at, &left.id).cmp(&(right.created_at, &right.id)))
}
