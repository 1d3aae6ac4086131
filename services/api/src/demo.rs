use crate::cli::AnalyticsCommand;
use crate::infra::load_store;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use hirehub::analytics::{
    AnalyticsFilter, AnalyticsService, DashboardView, GroupCount, Period, TopStatsView,
    TrendSeries, TrendType,
};
use hirehub::config::AppConfig;
use hirehub::error::AppError;
use hirehub::search::{EntityKind, SearchService, UniversalSearchRequest, UniversalSearchResult};
use hirehub::storage::{
    ApplicationRecord, ApplicationStatus, CandidateRecord, CompanyRecord, ExperienceLevel,
    JobRecord, JobType, StoredRecord, UserRecord, UserRole,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Free-text term matched against titles, descriptions, names and skills
    #[arg(long)]
    pub(crate) term: String,
    /// Restrict to entity kinds (job, candidate, company); repeat or comma-separate
    #[arg(long, value_delimiter = ',', value_parser = crate::infra::parse_kind)]
    pub(crate) types: Vec<EntityKind>,
    /// Maximum number of fused results (1-100)
    #[arg(long)]
    pub(crate) limit: Option<u32>,
    /// Only match records whose location contains this text
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Require these skills; repeat or comma-separate
    #[arg(long, value_delimiter = ',')]
    pub(crate) skills: Vec<String>,
    /// JSON array of tagged records to search instead of the demo data
    #[arg(long)]
    pub(crate) fixtures: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct AnalyticsArgs {
    /// Reporting period: day, week, month, quarter, year or all
    #[arg(long, default_value = "month", value_parser = crate::infra::parse_period)]
    pub(crate) period: Period,
    /// Explicit window start (YYYY-MM-DD or RFC3339); overrides the period offset
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) date_from: Option<DateTime<Utc>>,
    /// Explicit window end (YYYY-MM-DD or RFC3339); defaults to now
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) date_to: Option<DateTime<Utc>>,
    /// Bucket count for trends or row count for top stats
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Evaluate as if the current instant were this one
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// JSON array of tagged records to aggregate instead of the demo data
    #[arg(long)]
    pub(crate) fixtures: Option<PathBuf>,
}

impl AnalyticsArgs {
    fn filter(&self) -> AnalyticsFilter {
        AnalyticsFilter {
            period: self.period,
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct TrendArgs {
    #[command(flatten)]
    pub(crate) analytics: AnalyticsArgs,
    /// Metric to chart: users, jobs, applications, companies or hires
    #[arg(long = "type", default_value = "users", value_parser = crate::infra::parse_trend)]
    pub(crate) trend: TrendType,
}

pub(crate) async fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = load_store(args.fixtures.as_deref(), Utc::now())?;
    let service = SearchService::new(Arc::new(store), &config.search);

    let request = UniversalSearchRequest {
        term: Some(args.term),
        kinds: args.types,
        limit: args.limit,
        location: args.location,
        skills: args.skills,
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel_on_ctrl_c(cancel.clone());
    let outcome = service.universal_search(request, &cancel).await;
    interrupt.abort();

    render_search(&outcome?);
    Ok(())
}

pub(crate) async fn run_analytics(command: AnalyticsCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let args = match &command {
        AnalyticsCommand::Dashboard(args) | AnalyticsCommand::Top(args) => args,
        AnalyticsCommand::Trends(trend) => &trend.analytics,
    };
    let now = args.now.unwrap_or_else(Utc::now);
    let store = load_store(args.fixtures.as_deref(), now)?;
    let service = AnalyticsService::new(Arc::new(store), &config.analytics);
    let filter = args.filter();

    let cancel = CancellationToken::new();
    let interrupt = cancel_on_ctrl_c(cancel.clone());
    let outcome = match &command {
        AnalyticsCommand::Dashboard(_) => service
            .dashboard(&filter, now, &cancel)
            .await
            .map(|view| render_dashboard(&view)),
        AnalyticsCommand::Trends(trend) => service
            .trends(trend.trend, &filter, args.limit, now, &cancel)
            .await
            .map(|series| render_trends(&series)),
        AnalyticsCommand::Top(_) => service
            .top_stats(&filter, args.limit, now, &cancel)
            .await
            .map(|view| render_top(&view)),
    };
    interrupt.abort();

    outcome.map_err(AppError::from)
}

fn cancel_on_ctrl_c(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    })
}

fn render_search(result: &UniversalSearchResult) {
    println!(
        "{} results in {} ms (showing {})",
        result.total,
        result.search_time_ms,
        result.results.len()
    );
    for summary in &result.kinds {
        let note = if summary.failed { " (unavailable)" } else { "" };
        println!("- {}: {} matches{note}", summary.kind, summary.total);
    }
    if result.results.is_empty() {
        return;
    }
    println!("Ranked results:");
    for (position, ranked) in result.results.iter().enumerate() {
        let scored = &ranked.result;
        println!(
            "  {:>2}. [{}] {} | rank {:.2} | relevance {:.2} | score {:.2}",
            position + 1,
            scored.record.kind(),
            scored.record.title(),
            ranked.rank,
            scored.relevance,
            scored.score
        );
    }
}

fn render_dashboard(view: &DashboardView) {
    println!(
        "Dashboard ({}): {} to {}",
        view.period,
        view.window.from().format("%Y-%m-%d %H:%M"),
        view.window.to().format("%Y-%m-%d %H:%M")
    );

    let overview = &view.overview;
    println!("Overview:");
    println!(
        "- {} users | {} candidates | {} companies",
        overview.total_users, overview.total_candidates, overview.total_companies
    );
    println!(
        "- {} jobs ({} active) | {} applications",
        overview.total_jobs, overview.active_jobs, overview.total_applications
    );

    println!("Growth vs previous window:");
    for (name, rate) in [
        ("users", &view.growth.users),
        ("jobs", &view.growth.jobs),
        ("applications", &view.growth.applications),
        ("companies", &view.growth.companies),
    ] {
        println!(
            "- {name}: {} now, {} before ({:+.2}%)",
            rate.current, rate.previous, rate.percent
        );
    }

    let performance = &view.performance;
    println!("Hiring performance:");
    println!(
        "- {:.2} applications per 100 jobs | {:.2}% interviewed | {:.2}% hired",
        performance.application_rate, performance.interview_rate, performance.hire_rate
    );
    println!(
        "- {:.2} days average time to hire",
        performance.average_time_to_hire
    );

    if view.recent_activity.is_empty() {
        println!("No activity in this window.");
        return;
    }
    println!("Recent activity:");
    for entry in &view.recent_activity {
        println!(
            "  - {} {:?}: {}",
            entry.at.format("%Y-%m-%d %H:%M"),
            entry.kind,
            entry.label
        );
    }
}

fn render_trends(series: &TrendSeries) {
    println!(
        "{} trend ({}) over {} buckets",
        series.trend,
        series.period,
        series.points.len()
    );
    for point in &series.points {
        println!("  {} {:>6.0}", point.label, point.value);
    }
}

fn render_top(view: &TopStatsView) {
    println!(
        "Top stats ({}): {} to {}",
        view.period,
        view.window.from().format("%Y-%m-%d"),
        view.window.to().format("%Y-%m-%d")
    );
    render_groups("Skills", &view.top_skills);
    render_groups("Locations", &view.top_locations);
    render_groups("Companies", &view.top_companies);
    render_groups("Job types", &view.top_job_types);
}

fn render_groups(title: &str, groups: &[GroupCount]) {
    println!("{title}:");
    if groups.is_empty() {
        println!("  (none)");
    }
    for group in groups {
        println!("  - {}: {}", group.key, group.count);
    }
}

fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

struct DemoJob {
    id: &'static str,
    title: &'static str,
    company: (&'static str, &'static str),
    location: &'static str,
    job_type: JobType,
    level: ExperienceLevel,
    salary: (f64, f64),
    skills: &'static [&'static str],
    featured: bool,
    active: bool,
    age_days: i64,
}

const DEMO_JOBS: [DemoJob; 6] = [
    DemoJob {
        id: "job-1",
        title: "Senior React Developer",
        company: ("co-1", "Northwind Labs"),
        location: "Berlin",
        job_type: JobType::FullTime,
        level: ExperienceLevel::Senior,
        salary: (70_000.0, 90_000.0),
        skills: &["React", "TypeScript"],
        featured: true,
        active: true,
        age_days: 2,
    },
    DemoJob {
        id: "job-2",
        title: "Rust Platform Engineer",
        company: ("co-2", "Ferrous Systems Co"),
        location: "Remote",
        job_type: JobType::FullTime,
        level: ExperienceLevel::Mid,
        salary: (80_000.0, 110_000.0),
        skills: &["Rust", "Kubernetes"],
        featured: false,
        active: true,
        age_days: 5,
    },
    DemoJob {
        id: "job-3",
        title: "Data Engineer",
        company: ("co-1", "Northwind Labs"),
        location: "Berlin",
        job_type: JobType::Contract,
        level: ExperienceLevel::Mid,
        salary: (60_000.0, 75_000.0),
        skills: &["Python", "SQL"],
        featured: false,
        active: true,
        age_days: 12,
    },
    DemoJob {
        id: "job-4",
        title: "Frontend Intern",
        company: ("co-3", "Bright Harbor"),
        location: "Lisbon",
        job_type: JobType::Internship,
        level: ExperienceLevel::Entry,
        salary: (20_000.0, 25_000.0),
        skills: &["React", "CSS"],
        featured: false,
        active: true,
        age_days: 20,
    },
    DemoJob {
        id: "job-5",
        title: "Engineering Manager",
        company: ("co-2", "Ferrous Systems Co"),
        location: "Remote",
        job_type: JobType::FullTime,
        level: ExperienceLevel::Lead,
        salary: (120_000.0, 140_000.0),
        skills: &["Leadership", "Rust"],
        featured: true,
        active: false,
        age_days: 45,
    },
    DemoJob {
        id: "job-6",
        title: "Part-time QA Analyst",
        company: ("co-3", "Bright Harbor"),
        location: "Lisbon",
        job_type: JobType::PartTime,
        level: ExperienceLevel::Entry,
        salary: (25_000.0, 30_000.0),
        skills: &["Testing", "SQL"],
        featured: false,
        active: true,
        age_days: 70,
    },
];

fn demo_job(job: &DemoJob, now: DateTime<Utc>) -> StoredRecord {
    let created_at = days_ago(now, job.age_days);
    StoredRecord::Job(JobRecord {
        id: job.id.to_string(),
        title: job.title.to_string(),
        description: format!(
            "{} role working with {}.",
            job.title,
            job.skills.join(" and ")
        ),
        company_id: job.company.0.to_string(),
        company_name: job.company.1.to_string(),
        location: job.location.to_string(),
        job_type: job.job_type,
        experience_level: job.level,
        salary_min: Some(job.salary.0),
        salary_max: Some(job.salary.1),
        skills: tags(job.skills),
        is_remote: job.location == "Remote",
        is_featured: job.featured,
        is_active: job.active,
        created_at,
        updated_at: created_at,
    })
}

fn demo_candidate(
    id: &str,
    name: &str,
    headline: &str,
    skills: &[&str],
    (experience, rating): (f64, f64),
    verified: bool,
    created_at: DateTime<Utc>,
) -> StoredRecord {
    StoredRecord::Candidate(CandidateRecord {
        id: id.to_string(),
        name: name.to_string(),
        headline: headline.to_string(),
        bio: format!("{headline} with {experience} years of experience."),
        location: "Berlin".to_string(),
        skills: tags(skills),
        experience_years: Some(experience),
        rating: Some(rating),
        is_verified: verified,
        is_active: true,
        created_at,
        updated_at: created_at,
    })
}

fn demo_company(
    id: &str,
    name: &str,
    industry: &str,
    rating: f64,
    created_at: DateTime<Utc>,
) -> StoredRecord {
    StoredRecord::Company(CompanyRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} builds {industry} products."),
        industry: industry.to_string(),
        size: "51-200".to_string(),
        location: "Berlin".to_string(),
        rating: Some(rating),
        is_verified: true,
        is_featured: false,
        is_active: true,
        created_at,
        updated_at: created_at,
    })
}

fn demo_user(id: &str, role: UserRole, created_at: DateTime<Utc>) -> StoredRecord {
    StoredRecord::User(UserRecord {
        id: id.to_string(),
        email: format!("{id}@hirehub.example"),
        role,
        is_active: true,
        created_at,
    })
}

fn demo_application(
    id: &str,
    job_id: &str,
    candidate_id: &str,
    company_id: &str,
    status: ApplicationStatus,
    created_at: DateTime<Utc>,
    hired_after_days: Option<i64>,
) -> StoredRecord {
    let interviewed_at = matches!(
        status,
        ApplicationStatus::Interview | ApplicationStatus::Offered | ApplicationStatus::Hired
    )
    .then(|| created_at + Duration::days(2));
    StoredRecord::Application(ApplicationRecord {
        id: id.to_string(),
        job_id: job_id.to_string(),
        candidate_id: candidate_id.to_string(),
        company_id: company_id.to_string(),
        status,
        created_at,
        interviewed_at,
        hired_at: hired_after_days.map(|days| created_at + Duration::days(days)),
    })
}

/// Small deterministic data set, dated relative to `now`, used when no fixtures are given.
pub(crate) fn demo_records(now: DateTime<Utc>) -> Vec<StoredRecord> {
    let mut records: Vec<StoredRecord> = DEMO_JOBS.iter().map(|job| demo_job(job, now)).collect();

    records.extend([
        demo_candidate(
            "cand-1",
            "Ada Moreau",
            "Senior React engineer",
            &["React", "TypeScript", "GraphQL"],
            (8.0, 4.5),
            true,
            days_ago(now, 3),
        ),
        demo_candidate(
            "cand-2",
            "Ravi Kapoor",
            "Rust systems developer",
            &["Rust", "Linux"],
            (5.0, 4.0),
            false,
            days_ago(now, 9),
        ),
        demo_candidate(
            "cand-3",
            "Lena Fischer",
            "Data engineer",
            &["Python", "SQL", "Airflow"],
            (12.0, 3.5),
            true,
            days_ago(now, 40),
        ),
        demo_company("co-1", "Northwind Labs", "analytics", 4.2, days_ago(now, 4)),
        demo_company("co-2", "Ferrous Systems Co", "infrastructure", 4.7, days_ago(now, 35)),
        demo_company("co-3", "Bright Harbor", "e-commerce", 3.9, days_ago(now, 90)),
    ]);

    for (index, (role, age_days)) in [
        (UserRole::Candidate, 1),
        (UserRole::Candidate, 3),
        (UserRole::Employer, 4),
        (UserRole::Candidate, 9),
        (UserRole::Employer, 35),
        (UserRole::Admin, 90),
    ]
    .into_iter()
    .enumerate()
    {
        records.push(demo_user(
            &format!("user-{}", index + 1),
            role,
            days_ago(now, age_days),
        ));
    }

    records.extend([
        demo_application(
            "app-1",
            "job-1",
            "cand-1",
            "co-1",
            ApplicationStatus::Interview,
            days_ago(now, 1),
            None,
        ),
        demo_application(
            "app-2",
            "job-2",
            "cand-2",
            "co-2",
            ApplicationStatus::Pending,
            days_ago(now, 4),
            None,
        ),
        demo_application(
            "app-3",
            "job-3",
            "cand-3",
            "co-1",
            ApplicationStatus::Hired,
            days_ago(now, 11),
            Some(6),
        ),
        demo_application(
            "app-4",
            "job-4",
            "cand-1",
            "co-3",
            ApplicationStatus::Rejected,
            days_ago(now, 18),
            None,
        ),
        demo_application(
            "app-5",
            "job-6",
            "cand-3",
            "co-3",
            ApplicationStatus::Hired,
            days_ago(now, 60),
            Some(14),
        ),
    ]);

    records
}
