use chrono::{Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;
use competency::config::AppConfig;
use competency::error::AppError;
use competency::workflows::assessment::{
    export_entries_csv, export_entries_csv_string, AssessmentEntry, AssessmentPolicy,
    AssessmentSnapshot, CampaignDraft, CategoryId, CompetencyVector, Dashboard, EntryId, Goal,
    GoalId, PersonalDashboard, Role, Score, SkillCatalog, TeamDashboard, UserId,
};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// Snapshot JSON with categories, entries and goals
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// User whose dashboard is rendered
    #[arg(long)]
    pub(crate) user: String,
}

#[derive(Args, Debug)]
pub(crate) struct TeamArgs {
    /// Snapshot JSON with categories, entries and goals
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Team member id (repeat for each member)
    #[arg(long = "member", required = true)]
    pub(crate) members: Vec<String>,
    /// Member to drill into below the team averages
    #[arg(long)]
    pub(crate) focus: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Snapshot JSON with categories, entries and goals
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Restrict the export to one user
    #[arg(long)]
    pub(crate) user: Option<String>,
    /// Write the CSV here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the sample data (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the dashboards as JSON payloads instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let policy = AppConfig::load()?.policy;
    let snapshot = load_snapshot(&args.snapshot)?;
    let user = UserId::new(args.user)?;

    let dashboard = PersonalDashboard::build(&snapshot, &user, &policy);
    render_personal_dashboard(&dashboard);
    Ok(())
}

pub(crate) fn run_team(args: TeamArgs) -> Result<(), AppError> {
    let policy = AppConfig::load()?.policy;
    let snapshot = load_snapshot(&args.snapshot)?;
    let members = args
        .members
        .into_iter()
        .map(UserId::new)
        .collect::<Result<BTreeSet<_>, _>>()?;
    let focus = args.focus.map(UserId::new).transpose()?;

    let dashboard = TeamDashboard::build(&snapshot, &members, focus.as_ref(), &policy);
    render_team_dashboard(&dashboard);
    if let (Some(focus), None) = (&focus, &dashboard.member) {
        println!("\n{focus} is not on this team; drill-down skipped");
    }
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let user = args.user.map(UserId::new).transpose()?;

    match args.output {
        Some(path) => {
            let writer = BufWriter::new(File::create(&path)?);
            let rows = export_entries_csv(
                writer,
                &snapshot.categories,
                &snapshot.entries,
                user.as_ref(),
            )?;
            println!("Exported {rows} assessment entries to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            export_entries_csv(
                &mut handle,
                &snapshot.categories,
                &snapshot.entries,
                user.as_ref(),
            )?;
            handle.flush()?;
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, json } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let policy = AssessmentPolicy::default();

    let snapshot = sample_snapshot(today)?;
    let alex = UserId::new("alex")?;
    let sam = UserId::new("sam")?;
    let jordan = UserId::new("jordan")?;
    let team: BTreeSet<UserId> = [alex.clone(), sam.clone(), jordan.clone()]
        .into_iter()
        .collect();

    println!("Competency dashboard demo (reference date {today})");
    println!(
        "Sample data: {} categories, {} assessments, {} goals",
        snapshot.categories.len(),
        snapshot.entries.len(),
        snapshot.goals.len()
    );

    println!("\nNavigation by role");
    for role in Role::ordered() {
        let labels: Vec<_> = Dashboard::visible_to(Some(role))
            .into_iter()
            .map(Dashboard::label)
            .collect();
        println!("- {}: {}", role.label(), labels.join(", "));
    }

    let personal = PersonalDashboard::build(&snapshot, &alex, &policy);
    let team_view = TeamDashboard::build(&snapshot, &team, Some(&sam), &policy);

    if json {
        print_json("Personal dashboard payload", &personal);
        print_json("Team dashboard payload", &team_view);
    } else {
        println!();
        render_personal_dashboard(&personal);
        println!();
        render_team_dashboard(&team_view);
    }

    println!("\nCSV export for {alex}");
    let csv = export_entries_csv_string(&snapshot.categories, &snapshot.entries, Some(&alex))?;
    print!("{csv}");

    let manager = UserId::new("morgan")?;
    let draft = CampaignDraft {
        title: "Quarterly skills check".to_string(),
        description: Some("Self-assessment on the two focus competencies".to_string()),
        start_date: today - Duration::days(14),
        end_date: Some(today + Duration::days(14)),
        skill_category_ids: vec![CategoryId::new("leadership")?, CategoryId::new("communication")?],
        participant_ids: team.iter().cloned().collect(),
    };
    let campaign = draft.launch(Some(Role::Manager), manager, &snapshot.categories)?;
    let progress = campaign.progress(&snapshot.entries);

    println!(
        "\nCampaign '{}' ({}) {} -> {}",
        campaign.title,
        campaign.status.label(),
        campaign.start_date,
        campaign
            .end_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "open".to_string())
    );
    for participant in campaign.refreshed_participants(&snapshot.entries) {
        println!("- {}: {}", participant.user_id, participant.status.label());
    }
    println!(
        "Progress: {}/{} completed ({:.1}%), {} in progress, {} invited",
        progress.completed,
        progress.total,
        progress.completion_pct,
        progress.in_progress,
        progress.invited
    );

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<AssessmentSnapshot, AppError> {
    let validated = AssessmentSnapshot::from_path(path)?;
    if !validated.skipped.is_empty() {
        eprintln!(
            "Skipped {} malformed record(s) in {}",
            validated.skipped.len(),
            path.display()
        );
        for skipped in &validated.skipped {
            eprintln!(
                "  - {} #{}{}: {}",
                skipped.kind.label(),
                skipped.index,
                skipped
                    .id
                    .as_deref()
                    .map(|id| format!(" ({id})"))
                    .unwrap_or_default(),
                skipped.reason
            );
        }
    }
    Ok(validated.snapshot)
}

fn print_json<T: serde::Serialize>(title: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("\n{title}:\n{json}"),
        Err(err) => println!("\n{title} unavailable: {err}"),
    }
}

pub(crate) fn render_personal_dashboard(dashboard: &PersonalDashboard) {
    println!("Dashboard for {}", dashboard.user_id);
    if !dashboard.has_assessments() {
        println!("No assessments yet; every category shows the starting score.");
    }

    render_vector(&dashboard.competencies);

    if dashboard.growth_areas.is_empty() {
        println!("\nTop growth areas: none");
    } else {
        println!("\nTop growth areas");
        for area in &dashboard.growth_areas {
            println!("- {} (gap {:.1})", area.category_name, area.gap);
        }
    }

    match dashboard.next_assessment_due {
        Some(date) => println!("\nNext assessment due {date}"),
        None => println!("\nNext assessment due: start your first assessment"),
    }
}

pub(crate) fn render_team_dashboard(dashboard: &TeamDashboard) {
    let overview = &dashboard.overview;
    println!("Team dashboard ({} members)", overview.member_count);
    match overview.overall_average {
        Some(average) => println!("Overall average {average:.1}"),
        None => println!("Overall average: no assessments yet"),
    }
    if let Some(weakest) = &overview.weakest_category {
        println!(
            "Weakest category: {} ({:.1})",
            weakest.category_name, weakest.average
        );
    }

    render_vector(&dashboard.team_competencies);

    if let Some(member) = &dashboard.member {
        println!();
        render_personal_dashboard(member);
    }
}

fn render_vector(vector: &CompetencyVector) {
    println!("\nCompetencies");
    for point in vector.iter() {
        let marker = if point.assessed { "" } else { " (not assessed)" };
        println!(
            "- {}: {:.1} / {:.1}{}",
            point.category_name, point.current_score, point.target_score, marker
        );
    }
}

fn sample_snapshot(today: NaiveDate) -> Result<AssessmentSnapshot, AppError> {
    let earlier = today - Duration::days(40);
    let recent = today - Duration::days(8);

    let rounds: [(&str, &str, &str, u8, NaiveDate, Option<&str>); 11] = [
        ("e01", "alex", "strategic_thinking", 2, earlier, None),
        ("e02", "alex", "communication", 3, earlier, None),
        ("e03", "alex", "leadership", 2, earlier, Some("first time leading standup")),
        ("e04", "alex", "data_analysis", 4, earlier, None),
        ("e05", "alex", "strategic_thinking", 3, recent, Some("drafted the roadmap")),
        ("e06", "alex", "leadership", 2, recent, None),
        ("e07", "alex", "communication", 4, recent, None),
        ("e08", "sam", "product_management", 4, earlier, None),
        ("e09", "sam", "user_research", 2, earlier, None),
        ("e10", "sam", "leadership", 3, earlier, None),
        ("e11", "sam", "communication", 3, recent, None),
    ];

    let entries = rounds
        .into_iter()
        .map(
            |(id, user, category, score, date, notes)| -> Result<AssessmentEntry, AppError> {
                Ok(AssessmentEntry {
                    id: EntryId::new(id)?,
                    user_id: UserId::new(user)?,
                    category_id: CategoryId::new(category)?,
                    score: Score::new(score)?,
                    assessment_date: date,
                    created_at: Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
                    notes: notes.map(str::to_string),
                })
            },
        )
        .collect::<Result<Vec<_>, _>>()?;

    let goals = vec![Goal {
        id: GoalId::new("g01")?,
        user_id: UserId::new("alex")?,
        category_id: CategoryId::new("leadership")?,
        target_score: Score::Four,
        target_date: Some(today + Duration::days(90)),
        created_at: Utc.from_utc_datetime(&earlier.and_time(NaiveTime::MIN)),
        notes: Some("lead the next planning cycle".to_string()),
    }];

    Ok(AssessmentSnapshot {
        categories: SkillCatalog::standard().into_categories(),
        entries,
        goals,
    })
}
