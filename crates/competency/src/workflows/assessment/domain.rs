use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validation failures raised at the boundary of the competency engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompetencyError {
    #[error("score {value} is outside the 1-5 scale")]
    ScoreOutOfRange { value: i64 },
    #[error("'{value}' is not a valid score")]
    InvalidScore { value: String },
    #[error("unknown role '{value}'")]
    UnknownRole { value: String },
    #[error("{field} is required")]
    MissingIdentifier { field: &'static str },
    #[error("skill category '{id}' is listed more than once")]
    DuplicateCategory { id: CategoryId },
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub(super) String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, CompetencyError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(CompetencyError::MissingIdentifier { field: $field });
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = CompetencyError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::new(value)
            }
        }
    };
}

identifier!(
    /// Opaque user identifier issued by the external auth provider.
    UserId,
    "user_id"
);
identifier!(CategoryId, "skill_category_id");
identifier!(EntryId, "entry id");
identifier!(GoalId, "goal id");

/// Ordinal proficiency level recorded for one category at one point in time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Score {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl Score {
    pub const MIN: Score = Score::One;
    pub const MAX: Score = Score::Five;

    pub fn new(value: u8) -> Result<Self, CompetencyError> {
        Self::from_i64(i64::from(value))
    }

    pub fn from_i64(value: i64) -> Result<Self, CompetencyError> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            other => Err(CompetencyError::ScoreOutOfRange { value: other }),
        }
    }

    /// Parses the textual form the backing store uses (`"1"` through `"5"`).
    pub fn parse(raw: &str) -> Result<Self, CompetencyError> {
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| CompetencyError::InvalidScore {
                value: raw.to_string(),
            })?;
        Self::from_i64(value)
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.value())
    }
}

impl TryFrom<u8> for Score {
    type Error = CompetencyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.value()
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Access tier attached to a user. Variants are declared lowest first so the
/// derived ordering is the permission hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    TeamMember,
    Manager,
    Admin,
}

impl Role {
    pub const fn ordered() -> [Self; 3] {
        [Self::TeamMember, Self::Manager, Self::Admin]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TeamMember => "team_member",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TeamMember => "Team Member",
            Self::Manager => "Manager",
            Self::Admin => "Admin",
        }
    }
}

impl FromStr for Role {
    type Err = CompetencyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "team_member" => Ok(Self::TeamMember),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(CompetencyError::UnknownRole {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sort_order: i32,
}

/// One dated self- or manager-assessment of a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub score: Score,
    pub assessment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub target_score: Score,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Product defaults applied when data is missing or a caller does not override them.
///
/// `default_target` of five means "aim for mastery" when a user has set no goal.
/// Team-level goals are not modelled, so team vectors use `team_target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPolicy {
    pub default_current: Score,
    pub default_target: Score,
    pub team_target: Score,
    pub growth_min_gap: f64,
    pub growth_limit: usize,
}

impl Default for AssessmentPolicy {
    fn default() -> Self {
        Self {
            default_current: Score::MIN,
            default_target: Score::MAX,
            team_target: Score::MAX,
            growth_min_gap: 2.0,
            growth_limit: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_rejects_values_outside_scale() {
        assert_eq!(
            Score::new(0),
            Err(CompetencyError::ScoreOutOfRange { value: 0 })
        );
        assert_eq!(
            Score::parse("6"),
            Err(CompetencyError::ScoreOutOfRange { value: 6 })
        );
        assert!(matches!(
            Score::parse("three"),
            Err(CompetencyError::InvalidScore { .. })
        ));
        assert_eq!(Score::parse(" 4 "), Ok(Score::Four));
    }

    #[test]
    fn score_serializes_as_integer() {
        let json = serde_json::to_string(&Score::Three).expect("score serializes");
        assert_eq!(json, "3");
        let parsed: Score = serde_json::from_str("5").expect("score deserializes");
        assert_eq!(parsed, Score::Five);
        assert!(serde_json::from_str::<Score>("9").is_err());
    }

    #[test]
    fn role_parsing_is_closed() {
        assert_eq!("manager".parse::<Role>(), Ok(Role::Manager));
        assert_eq!(" Admin ".parse::<Role>(), Ok(Role::Admin));
        assert!(matches!(
            "owner".parse::<Role>(),
            Err(CompetencyError::UnknownRole { .. })
        ));
        assert!(Role::Admin > Role::Manager && Role::Manager > Role::TeamMember);
    }

    #[test]
    fn identifiers_reject_blank_values() {
        assert_eq!(
            UserId::new("   "),
            Err(CompetencyError::MissingIdentifier { field: "user_id" })
        );
        assert_eq!(UserId::new(" u1 ").expect("valid id").as_str(), "u1");
    }
}
