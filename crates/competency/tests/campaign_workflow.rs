use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use competency::workflows::assessment::{
    assign_role, effective_role, export_entries_csv_string, AccessError, AssessmentEntry,
    CampaignDraft, CampaignError, CampaignStatus, CategoryId, Dashboard, EntryId,
    ParticipantStatus, Role, RoleAdminError, RoleAssignment, RoleStore, Score, SkillCatalog,
    UserId,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Directory {
    roles: Mutex<HashMap<UserId, Role>>,
}

impl RoleStore for Directory {
    fn assign(&self, assignment: RoleAssignment) -> Result<(), RoleAdminError> {
        self.roles
            .lock()
            .expect("directory lock")
            .insert(assignment.user_id, assignment.role);
        Ok(())
    }

    fn role_of(&self, user: &UserId) -> Result<Option<Role>, RoleAdminError> {
        Ok(self.roles.lock().expect("directory lock").get(user).copied())
    }

    fn list(&self) -> Result<Vec<RoleAssignment>, RoleAdminError> {
        Ok(self
            .roles
            .lock()
            .expect("directory lock")
            .iter()
            .map(|(user_id, role)| RoleAssignment {
                user_id: user_id.clone(),
                role: *role,
            })
            .collect())
    }
}

fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

fn category(id: &str) -> CategoryId {
    CategoryId::new(id).expect("valid category id")
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
}

fn entry(
    id: &str,
    member: &str,
    category_key: &str,
    score: Score,
    on: NaiveDate,
) -> AssessmentEntry {
    AssessmentEntry {
        id: EntryId::new(id).expect("valid entry id"),
        user_id: user(member),
        category_id: category(category_key),
        score,
        assessment_date: on,
        created_at: Utc.from_utc_datetime(&on.and_time(NaiveTime::MIN)),
        notes: None,
    }
}

fn quarterly_draft() -> CampaignDraft {
    CampaignDraft {
        title: "  Q2 skills review ".to_string(),
        description: None,
        start_date: date(4, 1),
        end_date: Some(date(4, 30)),
        skill_category_ids: vec![category("leadership"), category("communication")],
        participant_ids: vec![user("u1"), user("u2"), user("u3"), user("u1")],
    }
}

#[test]
fn manager_launch_invites_each_participant_once() {
    let catalog = SkillCatalog::standard();
    let campaign = quarterly_draft()
        .launch(Some(Role::Manager), user("m1"), catalog.categories())
        .expect("campaign launches");

    assert_eq!(campaign.title, "Q2 skills review");
    assert_eq!(campaign.status, CampaignStatus::Active);
    assert_eq!(campaign.created_by, user("m1"));
    assert_eq!(campaign.requirements.len(), 2);
    assert_eq!(campaign.participants.len(), 3);
    assert!(campaign
        .participants
        .iter()
        .all(|participant| participant.status == ParticipantStatus::Invited
            && participant.invited_by == user("m1")));
}

#[test]
fn team_members_cannot_launch_campaigns() {
    let catalog = SkillCatalog::standard();
    let err = quarterly_draft()
        .launch(Some(Role::TeamMember), user("u1"), catalog.categories())
        .expect_err("team member rejected");
    assert_eq!(
        err,
        CampaignError::Access(AccessError::Forbidden {
            required: Role::Manager
        })
    );
}

#[test]
fn progress_tracks_assessments_inside_the_window() {
    let catalog = SkillCatalog::standard();
    let campaign = quarterly_draft()
        .launch(Some(Role::Admin), user("a1"), catalog.categories())
        .expect("campaign launches");

    let entries = vec![
        entry("e1", "u1", "leadership", Score::Three, date(4, 3)),
        entry("e2", "u1", "communication", Score::Four, date(4, 4)),
        entry("e3", "u2", "leadership", Score::Two, date(4, 10)),
        // before the window opened
        entry("e4", "u3", "leadership", Score::Two, date(3, 20)),
        entry("e5", "u3", "communication", Score::Two, date(3, 20)),
    ];

    assert_eq!(
        campaign.participant_status(&entries, &user("u1")),
        ParticipantStatus::Completed
    );
    assert_eq!(
        campaign.participant_status(&entries, &user("u2")),
        ParticipantStatus::InProgress
    );
    assert_eq!(
        campaign.participant_status(&entries, &user("u3")),
        ParticipantStatus::Invited
    );

    let progress = campaign.progress(&entries);
    assert_eq!(progress.total, 3);
    assert_eq!(progress.completed, 1);
    assert_eq!(progress.in_progress, 1);
    assert_eq!(progress.invited, 1);
    assert_eq!(progress.completion_pct, 33.3);
}

#[test]
fn unassigned_users_fall_back_to_team_member_navigation() {
    let directory = Directory::default();
    assign_role(&directory, Some(Role::Admin), user("m1"), Role::Manager).expect("assigned");
    assign_role(&directory, Some(Role::Admin), user("a1"), Role::Admin).expect("assigned");

    let manager = effective_role(&directory, Some(&user("m1")), None).expect("lookup");
    assert_eq!(manager, Some(Role::Manager));
    let newcomer = effective_role(&directory, Some(&user("new")), None).expect("lookup");
    assert_eq!(newcomer, Some(Role::TeamMember));
    assert_eq!(Dashboard::visible_to(newcomer), vec![Dashboard::Personal]);
    let anonymous = effective_role(&directory, None, None).expect("lookup");
    assert!(Dashboard::visible_to(anonymous).is_empty());
    assert_eq!(
        Dashboard::visible_to(Some(Role::Admin)),
        Dashboard::ordered().to_vec()
    );
}

#[test]
fn completed_campaigns_stay_closed() {
    let catalog = SkillCatalog::standard();
    let mut campaign = quarterly_draft()
        .launch(Some(Role::Manager), user("m1"), catalog.categories())
        .expect("campaign launches");

    campaign
        .transition(Some(Role::Manager), CampaignStatus::Completed)
        .expect("campaign completes");
    assert_eq!(
        campaign.transition(Some(Role::Manager), CampaignStatus::Active),
        Err(CampaignError::InvalidTransition {
            from: CampaignStatus::Completed,
            to: CampaignStatus::Active
        })
    );
}

#[test]
fn campaign_entries_export_newest_first() {
    let catalog = SkillCatalog::standard();
    let entries = vec![
        entry("e1", "u1", "leadership", Score::Three, date(4, 3)),
        entry("e2", "u1", "communication", Score::Four, date(4, 4)),
        entry("e3", "u2", "leadership", Score::Two, date(4, 10)),
    ];

    let csv = export_entries_csv_string(catalog.categories(), &entries, None)
        .expect("export succeeds");
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(
        rows,
        vec![
            "Date,Category,Score,Notes",
            "2024-04-10,Leadership,2,",
            "2024-04-04,Communication,4,",
            "2024-04-03,Leadership,3,",
        ]
    );
}
