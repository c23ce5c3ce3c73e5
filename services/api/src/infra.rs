use axum::http::HeaderMap;
use chrono::NaiveDate;
use competency::error::AppError;
use competency::workflows::assessment::{
    effective_role, AccessError, AssessmentPolicy, Role, RoleAdminError, RoleAssignment,
    RoleStore, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

/// Header carrying the caller's role as asserted by the auth gateway. Stored
/// role assignments take precedence over it.
pub(crate) const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Header carrying the caller's user id, injected by the auth gateway.
pub(crate) const ACTOR_ID_HEADER: &str = "x-actor-id";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) policy: AssessmentPolicy,
    pub(crate) roles: Arc<InMemoryRoleStore>,
}

/// Caller identified by the gateway headers, with its role resolved against the
/// role store.
#[derive(Debug, Clone, Default)]
pub(crate) struct Actor {
    pub(crate) id: Option<UserId>,
    pub(crate) role: Option<Role>,
}

impl Actor {
    pub(crate) fn resolve<S: RoleStore + ?Sized>(
        headers: &HeaderMap,
        roles: &S,
    ) -> Result<Self, AppError> {
        let asserted = Self::from_headers(headers)?;
        let role = effective_role(roles, asserted.id.as_ref(), asserted.role)?;
        Ok(Self {
            id: asserted.id,
            role,
        })
    }

    fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let role = header_str(headers, ACTOR_ROLE_HEADER)
            .map(str::parse::<Role>)
            .transpose()?;
        let id = header_str(headers, ACTOR_ID_HEADER)
            .map(UserId::new)
            .transpose()?;
        Ok(Self { id, role })
    }

    pub(crate) fn require_id(&self) -> Result<UserId, AppError> {
        self.id
            .clone()
            .ok_or(AppError::Access(AccessError::Unauthenticated))
    }

    /// Reading your own data needs any role; anyone else's needs manager.
    pub(crate) fn required_role_for(&self, subject: Option<&UserId>) -> Role {
        match (subject, &self.id) {
            (Some(subject), Some(actor)) if subject == actor => Role::TeamMember,
            _ => Role::Manager,
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("'{raw}' is not a YYYY-MM-DD date ({err})"))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRoleStore {
    assignments: Arc<Mutex<BTreeMap<UserId, Role>>>,
}

impl RoleStore for InMemoryRoleStore {
    fn assign(&self, assignment: RoleAssignment) -> Result<(), RoleAdminError> {
        let mut guard = self
            .assignments
            .lock()
            .map_err(|_| RoleAdminError::Unavailable("role store lock poisoned".to_string()))?;
        guard.insert(assignment.user_id, assignment.role);
        Ok(())
    }

    fn role_of(&self, user: &UserId) -> Result<Option<Role>, RoleAdminError> {
        let guard = self
            .assignments
            .lock()
            .map_err(|_| RoleAdminError::Unavailable("role store lock poisoned".to_string()))?;
        Ok(guard.get(user).copied())
    }

    fn list(&self) -> Result<Vec<RoleAssignment>, RoleAdminError> {
        let guard = self
            .assignments
            .lock()
            .map_err(|_| RoleAdminError::Unavailable("role store lock poisoned".to_string()))?;
        Ok(guard
            .iter()
            .map(|(user_id, role)| RoleAssignment {
                user_id: user_id.clone(),
                role: *role,
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use metrics_exporter_prometheus::PrometheusBuilder;

    AppState {
        readiness: Arc::new(AtomicBool::new(true)),
        metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        policy: AssessmentPolicy::default(),
        roles: Arc::new(InMemoryRoleStore::default()),
    }
}
