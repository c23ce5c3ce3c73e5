use super::domain::{AssessmentEntry, AssessmentPolicy, CategoryId, Score, SkillCategory, UserId};
use super::latest::latest_entry;
use super::vector::{CompetencyPoint, CompetencyVector};
use serde::Serialize;
use std::collections::BTreeSet;

/// Unrounded team mean for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamCategoryAverage {
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_description: String,
    pub sort_order: i32,
    /// `None` when no member has assessed the category.
    pub mean: Option<f64>,
    pub contributors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAggregate {
    pub member_count: usize,
    pub target: Score,
    pub categories: Vec<TeamCategoryAverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeakestCategory {
    pub category_id: CategoryId,
    pub category_name: String,
    pub average: f64,
}

/// Headline figures for the manager dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamOverview {
    pub member_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weakest_category: Option<WeakestCategory>,
}

/// Round half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Average each member's current score per category.
///
/// Members without an entry in a category are left out of that category's mean
/// instead of being counted at the default score.
pub fn aggregate_team(
    categories: &[SkillCategory],
    entries: &[AssessmentEntry],
    members: &BTreeSet<UserId>,
    policy: &AssessmentPolicy,
) -> TeamAggregate {
    let mut averages: Vec<TeamCategoryAverage> = categories
        .iter()
        .map(|category| {
            let scores: Vec<f64> = members
                .iter()
                .filter_map(|member| latest_entry(entries, member, &category.id))
                .map(|entry| entry.score.as_f64())
                .collect();

            let mean = if scores.is_empty() {
                None
            } else {
                Some(scores.iter().sum::<f64>() / scores.len() as f64)
            };

            TeamCategoryAverage {
                category_id: category.id.clone(),
                category_name: category.name.clone(),
                category_description: category.description.clone(),
                sort_order: category.sort_order,
                mean,
                contributors: scores.len(),
            }
        })
        .collect();

    averages.sort_by(|left, right| {
        left.sort_order
            .cmp(&right.sort_order)
            .then_with(|| left.category_id.cmp(&right.category_id))
    });

    tracing::debug!(
        members = members.len(),
        categories = averages.len(),
        with_data = averages.iter().filter(|avg| avg.mean.is_some()).count(),
        "aggregated team competencies"
    );

    TeamAggregate {
        member_count: members.len(),
        target: policy.team_target,
        categories: averages,
    }
}

impl TeamAggregate {
    /// Display vector: means rounded to one decimal, `0` where nobody has data.
    pub fn vector(&self) -> CompetencyVector {
        let points = self
            .categories
            .iter()
            .map(|average| CompetencyPoint {
                category_id: average.category_id.clone(),
                category_name: average.category_name.clone(),
                category_description: average.category_description.clone(),
                sort_order: average.sort_order,
                current_score: average.mean.map(round_one_decimal).unwrap_or(0.0),
                target_score: self.target.as_f64(),
                assessed: average.mean.is_some(),
            })
            .collect();

        CompetencyVector::from_points(points)
    }

    /// Overall and weakest figures, computed only over categories with data.
    pub fn overview(&self) -> TeamOverview {
        let observed: Vec<(&TeamCategoryAverage, f64)> = self
            .categories
            .iter()
            .filter_map(|average| average.mean.map(|mean| (average, mean)))
            .collect();

        let overall_average = if observed.is_empty() {
            None
        } else {
            let total: f64 = observed.iter().map(|(_, mean)| mean).sum();
            Some(round_one_decimal(total / observed.len() as f64))
        };

        // categories are already in sort order, so the first minimum wins ties
        let weakest_category = observed
            .iter()
            .fold(None::<&(&TeamCategoryAverage, f64)>, |lowest, candidate| {
                match lowest {
                    Some(current) if current.1 <= candidate.1 => Some(current),
                    _ => Some(candidate),
                }
            })
            .map(|(average, mean)| WeakestCategory {
                category_id: average.category_id.clone(),
                category_name: average.category_name.clone(),
                average: round_one_decimal(*mean),
            });

        TeamOverview {
            member_count: self.member_count,
            overall_average,
            weakest_category,
        }
    }
}
