//! Multi-user assessment campaigns launched by managers.

use super::access::{authorize, AccessError};
use super::domain::{AssessmentEntry, CategoryId, Role, SkillCategory, UserId};
use super::team::round_one_decimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Drafts open or get cancelled; active campaigns complete or get cancelled.
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Active)
                | (Self::Draft, Self::Cancelled)
                | (Self::Active, Self::Completed)
                | (Self::Active, Self::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Invited,
    InProgress,
    Completed,
}

impl ParticipantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Invited => "Invited",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

/// Manager input for a new campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub skill_category_ids: Vec<CategoryId>,
    pub participant_ids: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignRequirement {
    pub category_id: CategoryId,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignParticipant {
    pub user_id: UserId,
    pub status: ParticipantStatus,
    pub invited_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Campaign {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_by: UserId,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub status: CampaignStatus,
    pub requirements: Vec<CampaignRequirement>,
    pub participants: Vec<CampaignParticipant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignProgress {
    pub total: usize,
    pub invited: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub completion_pct: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CampaignError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("campaign title is required")]
    MissingTitle,
    #[error("select at least one skill category")]
    NoSkills,
    #[error("select at least one participant")]
    NoParticipants,
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("unknown skill category '{id}'")]
    UnknownCategory { id: CategoryId },
    #[error("a {} campaign cannot become {}", .from.label(), .to.label())]
    InvalidTransition {
        from: CampaignStatus,
        to: CampaignStatus,
    },
}

impl CampaignDraft {
    /// Validate the draft and open it, inviting every participant.
    pub fn launch(
        self,
        actor: Option<Role>,
        creator: UserId,
        categories: &[SkillCategory],
    ) -> Result<Campaign, CampaignError> {
        let mut campaign = self.save(actor, creator, categories)?;
        campaign.transition(actor, CampaignStatus::Active)?;
        Ok(campaign)
    }

    /// Validate the draft and keep it unopened.
    pub fn save(
        self,
        actor: Option<Role>,
        creator: UserId,
        categories: &[SkillCategory],
    ) -> Result<Campaign, CampaignError> {
        authorize(actor, Role::Manager)?;

        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(CampaignError::MissingTitle);
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(CampaignError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }

        let skills = unique(self.skill_category_ids);
        if skills.is_empty() {
            return Err(CampaignError::NoSkills);
        }
        if let Some(unknown) = skills
            .iter()
            .find(|id| !categories.iter().any(|category| &category.id == *id))
        {
            return Err(CampaignError::UnknownCategory {
                id: unknown.clone(),
            });
        }

        let participants = unique(self.participant_ids);
        if participants.is_empty() {
            return Err(CampaignError::NoParticipants);
        }

        tracing::debug!(
            %title,
            creator = %creator,
            skills = skills.len(),
            participants = participants.len(),
            "campaign drafted"
        );

        Ok(Campaign {
            title,
            description: self.description.filter(|text| !text.trim().is_empty()),
            start_date: self.start_date,
            end_date: self.end_date,
            status: CampaignStatus::Draft,
            requirements: skills
                .into_iter()
                .map(|category_id| CampaignRequirement {
                    category_id,
                    required: true,
                })
                .collect(),
            participants: participants
                .into_iter()
                .map(|user_id| CampaignParticipant {
                    user_id,
                    status: ParticipantStatus::Invited,
                    invited_by: creator.clone(),
                })
                .collect(),
            created_by: creator,
        })
    }
}

impl Campaign {
    /// Move the campaign to `next` on behalf of a manager.
    pub fn transition(
        &mut self,
        actor: Option<Role>,
        next: CampaignStatus,
    ) -> Result<(), CampaignError> {
        authorize(actor, Role::Manager)?;
        if !self.status.can_become(next) {
            return Err(CampaignError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::info!(
            title = %self.title,
            from = self.status.label(),
            to = next.label(),
            participants = self.participants.len(),
            "campaign status changed"
        );
        self.status = next;
        Ok(())
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }

    /// Progress of one participant, derived from entries inside the campaign window.
    pub fn participant_status(
        &self,
        entries: &[AssessmentEntry],
        user: &UserId,
    ) -> ParticipantStatus {
        let required: Vec<&CategoryId> = self
            .requirements
            .iter()
            .filter(|requirement| requirement.required)
            .map(|requirement| &requirement.category_id)
            .collect();

        let assessed: HashSet<&CategoryId> = entries
            .iter()
            .filter(|entry| &entry.user_id == user && self.covers(entry.assessment_date))
            .map(|entry| &entry.category_id)
            .collect();

        let covered = required
            .iter()
            .filter(|category| assessed.contains(*category))
            .count();

        if covered == 0 {
            ParticipantStatus::Invited
        } else if covered == required.len() {
            ParticipantStatus::Completed
        } else {
            ParticipantStatus::InProgress
        }
    }

    /// Participants with their status recomputed from `entries`.
    pub fn refreshed_participants(&self, entries: &[AssessmentEntry]) -> Vec<CampaignParticipant> {
        self.participants
            .iter()
            .map(|participant| CampaignParticipant {
                status: self.participant_status(entries, &participant.user_id),
                ..participant.clone()
            })
            .collect()
    }

    pub fn progress(&self, entries: &[AssessmentEntry]) -> CampaignProgress {
        let mut progress = CampaignProgress {
            total: self.participants.len(),
            invited: 0,
            in_progress: 0,
            completed: 0,
            completion_pct: 0.0,
        };

        for participant in self.refreshed_participants(entries) {
            match participant.status {
                ParticipantStatus::Invited => progress.invited += 1,
                ParticipantStatus::InProgress => progress.in_progress += 1,
                ParticipantStatus::Completed => progress.completed += 1,
            }
        }

        if progress.total > 0 {
            progress.completion_pct =
                round_one_decimal(progress.completed as f64 / progress.total as f64 * 100.0);
        }

        progress
    }
}

fn unique<T: Clone + Eq + std::hash::Hash>(values: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
