use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::analytics::AnalyticsService;
use crate::config::AnalyticsConfig;
use crate::storage::{
    ApplicationRecord, ApplicationStatus, CandidateRecord, CompanyRecord, ExperienceLevel,
    InMemoryStore, JobRecord, JobType, StoredRecord, UserRecord, UserRole,
};

pub(super) use crate::storage::testing::{FailingStore, StalledStore};

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Reporting instant for every fixture-based test; `week` resolves to [03-08, 03-15).
pub(super) fn now() -> DateTime<Utc> {
    at(2024, 3, 15, 0)
}

fn user(id: &str, created_at: DateTime<Utc>) -> StoredRecord {
    StoredRecord::User(UserRecord {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        role: UserRole::Candidate,
        is_active: true,
        created_at,
    })
}

fn company(id: &str, name: &str, created_at: DateTime<Utc>) -> StoredRecord {
    StoredRecord::Company(CompanyRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        industry: "Software".to_string(),
        size: "51-200".to_string(),
        location: "Berlin".to_string(),
        rating: None,
        is_verified: true,
        is_featured: false,
        is_active: true,
        created_at,
        updated_at: created_at,
    })
}

fn candidate(id: &str, created_at: DateTime<Utc>) -> StoredRecord {
    StoredRecord::Candidate(CandidateRecord {
        id: id.to_string(),
        name: id.to_string(),
        headline: String::new(),
        bio: String::new(),
        location: "Lisbon".to_string(),
        skills: Vec::new(),
        experience_years: None,
        rating: None,
        is_verified: false,
        is_active: true,
        created_at,
        updated_at: created_at,
    })
}

struct JobSpec<'a> {
    id: &'a str,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    job_type: JobType,
    skills: &'a [&'a str],
    active: bool,
    created_at: DateTime<Utc>,
}

fn job(spec: JobSpec<'_>) -> StoredRecord {
    StoredRecord::Job(JobRecord {
        id: spec.id.to_string(),
        title: spec.title.to_string(),
        description: String::new(),
        company_id: spec.company.to_ascii_lowercase(),
        company_name: spec.company.to_string(),
        location: spec.location.to_string(),
        job_type: spec.job_type,
        experience_level: ExperienceLevel::Mid,
        salary_min: None,
        salary_max: None,
        skills: spec.skills.iter().map(|skill| skill.to_string()).collect(),
        is_remote: false,
        is_featured: false,
        is_active: spec.active,
        created_at: spec.created_at,
        updated_at: spec.created_at,
    })
}

fn application(
    id: &str,
    job_id: &str,
    status: ApplicationStatus,
    created_at: DateTime<Utc>,
    hired_at: Option<DateTime<Utc>>,
) -> StoredRecord {
    StoredRecord::Application(ApplicationRecord {
        id: id.to_string(),
        job_id: job_id.to_string(),
        candidate_id: "cand-1".to_string(),
        company_id: "acme".to_string(),
        status,
        created_at,
        interviewed_at: None,
        hired_at,
    })
}

/// One reporting week of platform activity plus a little history before it.
pub(super) fn platform_fixture() -> Vec<StoredRecord> {
    vec![
        user("u1", at(2024, 3, 10, 9)),
        user("u2", at(2024, 3, 12, 9)),
        user("u3", at(2024, 3, 3, 9)),
        user("u4", at(2023, 12, 1, 9)),
        candidate("cand-1", at(2024, 3, 9, 8)),
        candidate("cand-2", at(2023, 11, 2, 8)),
        company("acme", "Acme", at(2024, 3, 9, 7)),
        company("globex", "Globex", at(2023, 6, 1, 7)),
        job(JobSpec {
            id: "j1",
            title: "Rust Engineer",
            company: "Acme",
            location: "Berlin",
            job_type: JobType::FullTime,
            skills: &["Rust", "Tokio"],
            active: true,
            created_at: at(2024, 3, 9, 10),
        }),
        job(JobSpec {
            id: "j2",
            title: "Frontend Developer",
            company: "Acme",
            location: "berlin",
            job_type: JobType::Contract,
            skills: &["React", "TypeScript"],
            active: true,
            created_at: at(2024, 3, 11, 10),
        }),
        job(JobSpec {
            id: "j3",
            title: "Data Analyst",
            company: "Globex",
            location: "Lisbon",
            job_type: JobType::PartTime,
            skills: &["SQL"],
            active: false,
            created_at: at(2024, 3, 13, 10),
        }),
        job(JobSpec {
            id: "j4",
            title: "Site Reliability Engineer",
            company: "Globex",
            location: "Remote",
            job_type: JobType::FullTime,
            skills: &["Rust"],
            active: true,
            created_at: at(2024, 2, 1, 10),
        }),
        application(
            "a1",
            "j1",
            ApplicationStatus::Hired,
            at(2024, 3, 9, 12),
            Some(at(2024, 3, 13, 12)),
        ),
        application("a2", "j1", ApplicationStatus::Interview, at(2024, 3, 10, 12), None),
        application("a3", "j2", ApplicationStatus::Pending, at(2024, 3, 11, 12), None),
        application("a4", "j2", ApplicationStatus::Rejected, at(2024, 3, 12, 12), None),
        application(
            "a5",
            "j4",
            ApplicationStatus::Hired,
            at(2024, 3, 2, 12),
            Some(at(2024, 3, 6, 12)),
        ),
    ]
}

pub(super) fn service_over(records: Vec<StoredRecord>) -> Arc<AnalyticsService<InMemoryStore>> {
    Arc::new(AnalyticsService::new(
        Arc::new(InMemoryStore::from_records(records)),
        &AnalyticsConfig::default(),
    ))
}
