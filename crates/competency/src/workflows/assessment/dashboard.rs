use super::domain::{AssessmentPolicy, UserId};
use super::growth::{top_growth_areas, GrowthArea};
use super::schedule::next_assessment_due;
use super::snapshot::AssessmentSnapshot;
use super::team::{aggregate_team, TeamOverview};
use super::vector::{build_vector, CompetencyVector};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Everything the individual dashboard renders for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalDashboard {
    pub user_id: UserId,
    pub competencies: CompetencyVector,
    pub growth_areas: Vec<GrowthArea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_assessment_due: Option<NaiveDate>,
    pub assessment_count: usize,
}

impl PersonalDashboard {
    pub fn build(snapshot: &AssessmentSnapshot, user: &UserId, policy: &AssessmentPolicy) -> Self {
        let competencies = build_vector(
            &snapshot.categories,
            &snapshot.entries,
            &snapshot.goals,
            user,
            policy,
        );
        let growth_areas =
            top_growth_areas(&competencies, policy.growth_limit, policy.growth_min_gap);

        Self {
            user_id: user.clone(),
            growth_areas,
            next_assessment_due: next_assessment_due(&snapshot.entries, user),
            assessment_count: snapshot.entries_for(user).count(),
            competencies,
        }
    }

    pub fn has_assessments(&self) -> bool {
        self.assessment_count > 0
    }
}

/// A manager's view: team averages plus an optional drill-down into one member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamDashboard {
    pub overview: TeamOverview,
    pub team_competencies: CompetencyVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<PersonalDashboard>,
}

impl TeamDashboard {
    pub fn build(
        snapshot: &AssessmentSnapshot,
        members: &BTreeSet<UserId>,
        focus: Option<&UserId>,
        policy: &AssessmentPolicy,
    ) -> Self {
        let aggregate = aggregate_team(&snapshot.categories, &snapshot.entries, members, policy);

        // drill-down only for actual team members
        let member = focus
            .filter(|user| members.contains(*user))
            .map(|user| PersonalDashboard::build(snapshot, user, policy));

        Self {
            overview: aggregate.overview(),
            team_competencies: aggregate.vector(),
            member,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::{
        AssessmentEntry, CategoryId, EntryId, Score, SkillCategory,
    };
    use chrono::{TimeZone, Utc};

    fn snapshot() -> AssessmentSnapshot {
        let category = |id: &str, sort_order| SkillCategory {
            id: CategoryId::new(id).expect("valid category"),
            name: id.to_uppercase(),
            description: String::new(),
            sort_order,
        };
        let entry = |id: &str, user: &str, cat: &str, score: u8, month: u32| AssessmentEntry {
            id: EntryId::new(id).expect("valid id"),
            user_id: UserId::new(user).expect("valid user"),
            category_id: CategoryId::new(cat).expect("valid category"),
            score: Score::new(score).expect("valid score"),
            assessment_date: NaiveDate::from_ymd_opt(2024, month, 1).expect("valid date"),
            created_at: Utc
                .with_ymd_and_hms(2024, month, 1, 0, 0, 0)
                .single()
                .expect("valid timestamp"),
            notes: None,
        };

        AssessmentSnapshot {
            categories: vec![category("a", 1), category("b", 2)],
            entries: vec![
                entry("e1", "u1", "a", 2, 1),
                entry("e2", "u1", "b", 4, 2),
                entry("e3", "u2", "b", 2, 2),
            ],
            goals: Vec::new(),
        }
    }

    #[test]
    fn personal_dashboard_combines_views() {
        let user = UserId::new("u1").expect("valid user");
        let dashboard = PersonalDashboard::build(&snapshot(), &user, &AssessmentPolicy::default());

        assert_eq!(dashboard.competencies.len(), 2);
        assert_eq!(dashboard.growth_areas.len(), 1);
        assert_eq!(dashboard.growth_areas[0].category_id.as_str(), "a");
        assert_eq!(dashboard.growth_areas[0].gap, 3.0);
        assert_eq!(
            dashboard.next_assessment_due,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(dashboard.assessment_count, 2);
        assert!(dashboard.has_assessments());
    }

    #[test]
    fn team_dashboard_only_drills_into_members() {
        let members: BTreeSet<UserId> = ["u1", "u2"]
            .into_iter()
            .map(|id| UserId::new(id).expect("valid user"))
            .collect();
        let outsider = UserId::new("u9").expect("valid user");
        let policy = AssessmentPolicy::default();

        let dashboard = TeamDashboard::build(&snapshot(), &members, Some(&outsider), &policy);
        assert!(dashboard.member.is_none());
        assert_eq!(dashboard.overview.member_count, 2);
        assert_eq!(dashboard.team_competencies.points()[1].current_score, 3.0);

        let focus = UserId::new("u2").expect("valid user");
        let dashboard = TeamDashboard::build(&snapshot(), &members, Some(&focus), &policy);
        let member = dashboard.member.expect("member view present");
        assert_eq!(member.user_id, focus);
        assert_eq!(member.competencies.points()[0].current_score, 1.0);
    }
}
