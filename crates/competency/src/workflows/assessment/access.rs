use super::domain::{Role, UserId};
use serde::{Deserialize, Serialize};

/// Returns whether an actor holding `actual` may act at the `required` tier.
///
/// An absent role (unauthenticated or unresolved actor) never satisfies any tier.
pub fn has_role(actual: Option<Role>, required: Role) -> bool {
    match actual {
        Some(role) => role >= required,
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("requires the {} role", .required.as_str())]
    Forbidden { required: Role },
}

/// Gate an operation behind `required`, distinguishing missing from insufficient roles.
pub fn authorize(actual: Option<Role>, required: Role) -> Result<(), AccessError> {
    match actual {
        None => Err(AccessError::Unauthenticated),
        Some(_) if has_role(actual, required) => Ok(()),
        Some(_) => Err(AccessError::Forbidden { required }),
    }
}

/// Views exposed by the application shell, each gated by a minimum role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dashboard {
    Personal,
    Team,
    Campaigns,
    RoleAdmin,
}

impl Dashboard {
    pub const fn ordered() -> [Self; 4] {
        [Self::Personal, Self::Team, Self::Campaigns, Self::RoleAdmin]
    }

    pub const fn required_role(self) -> Role {
        match self {
            Self::Personal => Role::TeamMember,
            Self::Team | Self::Campaigns => Role::Manager,
            Self::RoleAdmin => Role::Admin,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "My Dashboard",
            Self::Team => "Team Dashboard",
            Self::Campaigns => "Assessment Campaigns",
            Self::RoleAdmin => "Role Management",
        }
    }

    /// Dashboards visible to `role`, in navigation order.
    pub fn visible_to(role: Option<Role>) -> Vec<Self> {
        Self::ordered()
            .into_iter()
            .filter(|dashboard| has_role(role, dashboard.required_role()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: UserId,
    pub role: Role,
}

/// Role an actor acts with. A stored assignment wins over the role asserted by
/// the auth gateway; an authenticated user with neither acts as a team member.
/// Anonymous callers only ever carry the asserted role.
pub fn effective_role<S: RoleStore + ?Sized>(
    store: &S,
    user: Option<&UserId>,
    asserted: Option<Role>,
) -> Result<Option<Role>, RoleAdminError> {
    let Some(user) = user else {
        return Ok(asserted);
    };
    let role = store
        .role_of(user)?
        .or(asserted)
        .unwrap_or(Role::TeamMember);
    Ok(Some(role))
}

/// Storage seam for role assignments, owned by the external backend in production.
pub trait RoleStore: Send + Sync {
    fn assign(&self, assignment: RoleAssignment) -> Result<(), RoleAdminError>;
    fn role_of(&self, user: &UserId) -> Result<Option<Role>, RoleAdminError>;
    fn list(&self) -> Result<Vec<RoleAssignment>, RoleAdminError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RoleAdminError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("role store unavailable: {0}")]
    Unavailable(String),
}

/// Assign `role` to `user` on behalf of `actor`, which must hold the admin tier.
pub fn assign_role<S: RoleStore + ?Sized>(
    store: &S,
    actor: Option<Role>,
    user: UserId,
    role: Role,
) -> Result<RoleAssignment, RoleAdminError> {
    authorize(actor, Role::Admin)?;
    let assignment = RoleAssignment { user_id: user, role };
    store.assign(assignment.clone())?;
    tracing::info!(user = %assignment.user_id, role = %assignment.role, "role assigned");
    Ok(assignment)
}
