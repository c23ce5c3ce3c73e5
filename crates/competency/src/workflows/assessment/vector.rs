use super::domain::{AssessmentEntry, AssessmentPolicy, CategoryId, Goal, SkillCategory, UserId};
use super::latest::{active_goal, latest_entry};
use serde::Serialize;

/// One axis of a competency radar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyPoint {
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_description: String,
    pub sort_order: i32,
    pub current_score: f64,
    pub target_score: f64,
    /// False when `current_score` is a default rather than observed data.
    pub assessed: bool,
}

impl CompetencyPoint {
    pub fn gap(&self) -> f64 {
        self.target_score - self.current_score
    }
}

/// Per-subject projection of categories to (current, target), ordered by `sort_order`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompetencyVector {
    points: Vec<CompetencyPoint>,
}

impl CompetencyVector {
    pub(crate) fn from_points(mut points: Vec<CompetencyPoint>) -> Self {
        points.sort_by(|left, right| {
            left.sort_order
                .cmp(&right.sort_order)
                .then_with(|| left.category_id.cmp(&right.category_id))
        });
        Self { points }
    }

    pub fn points(&self) -> &[CompetencyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, category: &CategoryId) -> Option<&CompetencyPoint> {
        self.points
            .iter()
            .find(|point| &point.category_id == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompetencyPoint> {
        self.points.iter()
    }
}

/// Build one user's vector. Every supplied category yields a point: missing
/// assessments fall back to `policy.default_current`, missing goals to
/// `policy.default_target`.
pub fn build_vector(
    categories: &[SkillCategory],
    entries: &[AssessmentEntry],
    goals: &[Goal],
    user: &UserId,
    policy: &AssessmentPolicy,
) -> CompetencyVector {
    let points = categories
        .iter()
        .map(|category| {
            let latest = latest_entry(entries, user, &category.id);
            let current = latest
                .map(|entry| entry.score)
                .unwrap_or(policy.default_current);
            let target = active_goal(goals, user, &category.id)
                .map(|goal| goal.target_score)
                .unwrap_or(policy.default_target);

            CompetencyPoint {
                category_id: category.id.clone(),
                category_name: category.name.clone(),
                category_description: category.description.clone(),
                sort_order: category.sort_order,
                current_score: current.as_f64(),
                target_score: target.as_f64(),
                assessed: latest.is_some(),
            }
        })
        .collect();

    CompetencyVector::from_points(points)
}
