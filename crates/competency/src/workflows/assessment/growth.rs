use super::domain::CategoryId;
use super::vector::CompetencyVector;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthArea {
    pub category_id: CategoryId,
    pub category_name: String,
    pub gap: f64,
}

/// Categories with the widest target-minus-current gap, at least `min_gap`
/// wide, largest first and capped at `limit`. Equal gaps keep `sort_order`.
pub fn top_growth_areas(vector: &CompetencyVector, limit: usize, min_gap: f64) -> Vec<GrowthArea> {
    let mut candidates: Vec<_> = vector
        .iter()
        .filter(|point| point.gap() >= min_gap)
        .collect();

    candidates.sort_by(|left, right| {
        right
            .gap()
            .partial_cmp(&left.gap())
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.sort_order.cmp(&right.sort_order))
            .then_with(|| left.category_id.cmp(&right.category_id))
    });

    candidates
        .into_iter()
        .take(limit)
        .map(|point| GrowthArea {
            category_id: point.category_id.clone(),
            category_name: point.category_name.clone(),
            gap: point.gap(),
        })
        .collect()
}
