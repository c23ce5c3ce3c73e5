//! Competency aggregation and gap analysis over assessment history snapshots.
//!
//! Every computation here is a pure function of the snapshot it is handed; the
//! records themselves are owned by the external backend.

pub mod access;
pub mod campaign;
mod catalog;
pub mod dashboard;
pub mod domain;
mod export;
mod growth;
mod latest;
pub mod snapshot;
mod schedule;
mod team;
mod vector;

pub use access::{
    assign_role, authorize, effective_role, has_role, AccessError, Dashboard, RoleAdminError,
    RoleAssignment, RoleStore,
};
pub use campaign::{
    Campaign, CampaignDraft, CampaignError, CampaignProgress, CampaignStatus, ParticipantStatus,
};
pub use catalog::SkillCatalog;
pub use dashboard::{PersonalDashboard, TeamDashboard};
pub use domain::{
    AssessmentEntry, AssessmentPolicy, CategoryId, CompetencyError, EntryId, Goal, GoalId, Role,
    Score, SkillCategory, UserId,
};
pub use export::{export_entries_csv, export_entries_csv_string, ExportError};
pub use growth::{top_growth_areas, GrowthArea};
pub use latest::{active_goal, latest_entry};
pub use schedule::{next_assessment_due, ASSESSMENT_INTERVAL};
pub use snapshot::{
    AssessmentSnapshot, RawSnapshot, SkippedRecord, SnapshotError, ValidatedSnapshot,
};
pub use team::{
    aggregate_team, round_one_decimal, TeamAggregate, TeamCategoryAverage, TeamOverview,
    WeakestCategory,
};
pub use vector::{build_vector, CompetencyPoint, CompetencyVector};
