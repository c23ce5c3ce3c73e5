use crate::infra::{Actor, AppState};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use competency::error::AppError;
use competency::workflows::assessment::{
    assign_role, authorize, export_entries_csv_string, AssessmentSnapshot, CampaignDraft,
    CampaignProgress, Campaign, Dashboard, PersonalDashboard, RawSnapshot, Role, RoleAssignment,
    RoleStore, SkillCatalog, SkillCategory, SkippedRecord, TeamDashboard, UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardRequest {
    pub(crate) user_id: String,
    #[serde(default)]
    pub(crate) snapshot: RawSnapshot,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    pub(crate) dashboard: PersonalDashboard,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamRequest {
    pub(crate) member_ids: Vec<String>,
    #[serde(default)]
    pub(crate) focus_member: Option<String>,
    #[serde(default)]
    pub(crate) snapshot: RawSnapshot,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeamResponse {
    pub(crate) dashboard: TeamDashboard,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportRequest {
    #[serde(default)]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    pub(crate) snapshot: RawSnapshot,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CampaignRequest {
    #[serde(flatten)]
    pub(crate) draft: CampaignDraft,
    #[serde(default)]
    pub(crate) categories: Option<Vec<SkillCategory>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CampaignResponse {
    pub(crate) campaign: Campaign,
    pub(crate) progress: CampaignProgress,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleUpdate {
    pub(crate) role: Role,
}

#[derive(Debug, Serialize)]
pub(crate) struct NavigationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<Role>,
    pub(crate) dashboards: Vec<Dashboard>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/dashboards", get(navigation_endpoint))
        .route("/api/v1/competency/dashboard", post(dashboard_endpoint))
        .route("/api/v1/competency/team", post(team_endpoint))
        .route("/api/v1/competency/export", post(export_endpoint))
        .route("/api/v1/campaigns", post(campaign_endpoint))
        .route("/api/v1/roles", get(list_roles_endpoint))
        .route("/api/v1/roles/:user_id", put(assign_role_endpoint))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn navigation_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NavigationResponse>, AppError> {
    let actor = Actor::resolve(&headers, state.roles.as_ref())?;
    Ok(Json(NavigationResponse {
        role: actor.role,
        dashboards: Dashboard::visible_to(actor.role),
    }))
}

pub(crate) async fn dashboard_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DashboardRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let actor = Actor::resolve(&headers, state.roles.as_ref())?;
    let user = UserId::new(payload.user_id)?;
    authorize(actor.role, actor.required_role_for(Some(&user)))?;

    let validated = AssessmentSnapshot::from_raw(payload.snapshot);
    let dashboard = PersonalDashboard::build(&validated.snapshot, &user, &state.policy);

    Ok(Json(DashboardResponse {
        dashboard,
        skipped: validated.skipped,
    }))
}

pub(crate) async fn team_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TeamRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    let actor = Actor::resolve(&headers, state.roles.as_ref())?;
    authorize(actor.role, Dashboard::Team.required_role())?;

    let members = payload
        .member_ids
        .into_iter()
        .map(UserId::new)
        .collect::<Result<BTreeSet<_>, _>>()?;
    let focus = payload.focus_member.map(UserId::new).transpose()?;

    let validated = AssessmentSnapshot::from_raw(payload.snapshot);
    let dashboard = TeamDashboard::build(
        &validated.snapshot,
        &members,
        focus.as_ref(),
        &state.policy,
    );

    Ok(Json(TeamResponse {
        dashboard,
        skipped: validated.skipped,
    }))
}

pub(crate) async fn export_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::resolve(&headers, state.roles.as_ref())?;
    let user = payload.user_id.map(UserId::new).transpose()?;
    authorize(actor.role, actor.required_role_for(user.as_ref()))?;

    let validated = AssessmentSnapshot::from_raw(payload.snapshot);
    let snapshot = validated.snapshot;
    let body = export_entries_csv_string(&snapshot.categories, &snapshot.entries, user.as_ref())?;

    let filename = match &user {
        Some(user) => format!("assessment-data-{user}.csv"),
        None => "assessment-data.csv".to_string(),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}

pub(crate) async fn campaign_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CampaignRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::resolve(&headers, state.roles.as_ref())?;
    authorize(actor.role, Dashboard::Campaigns.required_role())?;
    let creator = actor.require_id()?;

    let categories = payload
        .categories
        .unwrap_or_else(|| SkillCatalog::standard().into_categories());
    let campaign = payload.draft.launch(actor.role, creator, &categories)?;
    let progress = campaign.progress(&[]);

    Ok((
        StatusCode::CREATED,
        Json(CampaignResponse { campaign, progress }),
    ))
}

pub(crate) async fn list_roles_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoleAssignment>>, AppError> {
    let actor = Actor::resolve(&headers, state.roles.as_ref())?;
    authorize(actor.role, Dashboard::RoleAdmin.required_role())?;
    Ok(Json(state.roles.list()?))
}

pub(crate) async fn assign_role_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(update): Json<RoleUpdate>,
) -> Result<Json<RoleAssignment>, AppError> {
    let actor = Actor::resolve(&headers, state.roles.as_ref())?;
    let user = UserId::new(user_id)?;
    let assignment = assign_role(state.roles.as_ref(), actor.role, user, update.role)?;
    Ok(Json(assignment))
}
