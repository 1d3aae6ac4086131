use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::config::SearchConfig;
use crate::search::SearchService;
use crate::storage::{
    CandidateRecord, CompanyRecord, ExperienceLevel, InMemoryStore, JobRecord, JobType,
    StoredRecord,
};

pub(super) use crate::storage::testing::{FailingStore, StalledStore};

pub(super) fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(super) fn job(id: &str, title: &str, skills: &[&str], day: u32) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        company_id: "co-1".to_string(),
        company_name: String::new(),
        location: "Berlin".to_string(),
        job_type: JobType::FullTime,
        experience_level: ExperienceLevel::Mid,
        salary_min: None,
        salary_max: None,
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        is_remote: false,
        is_featured: false,
        is_active: true,
        created_at: at(day),
        updated_at: at(day),
    }
}

pub(super) fn candidate(id: &str, name: &str, skills: &[&str], day: u32) -> CandidateRecord {
    CandidateRecord {
        id: id.to_string(),
        name: name.to_string(),
        headline: String::new(),
        bio: String::new(),
        location: "Lisbon".to_string(),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        experience_years: None,
        rating: None,
        is_verified: false,
        is_active: true,
        created_at: at(day),
        updated_at: at(day),
    }
}

pub(super) fn company(id: &str, name: &str, industry: &str, day: u32) -> CompanyRecord {
    CompanyRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        industry: industry.to_string(),
        size: "11-50".to_string(),
        location: "Berlin".to_string(),
        rating: None,
        is_verified: false,
        is_featured: false,
        is_active: true,
        created_at: at(day),
        updated_at: at(day),
    }
}

/// Three jobs, two candidates, and one company whose name also contains "react".
pub(super) fn hiring_fixture() -> Vec<StoredRecord> {
    vec![
        StoredRecord::Job(job(
            "job-react",
            "Senior React Developer",
            &["React", "TypeScript"],
            3,
        )),
        StoredRecord::Job(job("job-rust", "Backend Rust Engineer", &["Rust"], 4)),
        StoredRecord::Job(job("job-data", "Data Analyst", &["SQL"], 5)),
        StoredRecord::Candidate(candidate("cand-ada", "Ada Park", &["React", "CSS"], 6)),
        StoredRecord::Candidate(candidate("cand-grace", "Grace Ito", &["Go"], 7)),
        StoredRecord::Company(company("co-reactive", "Reactive Labs", "Software", 8)),
    ]
}

/// Five active engineering jobs with distinct scores plus one inactive posting.
pub(super) fn engineering_jobs() -> Vec<StoredRecord> {
    let mut featured = job("eng-featured", "Platform Engineer", &["Kubernetes"], 1);
    featured.is_featured = true;
    let mut inactive = job("eng-closed", "Engineer (closed)", &[], 9);
    inactive.is_active = false;
    let mut wordy = job("eng-wordy", "Engineer", &["Go"], 2);
    wordy.description = "Engineer engineering engineers across the stack".to_string();

    vec![
        StoredRecord::Job(featured),
        StoredRecord::Job(wordy),
        StoredRecord::Job(job("eng-data", "Data Engineer", &["Spark"], 3)),
        StoredRecord::Job(job("eng-ml", "Machine Learning Engineer", &["Python"], 4)),
        StoredRecord::Job(job("eng-sec", "Security Engineer", &[], 5)),
        StoredRecord::Job(inactive),
    ]
}

pub(super) fn service_over(records: Vec<StoredRecord>) -> Arc<SearchService<InMemoryStore>> {
    Arc::new(SearchService::new(
        Arc::new(InMemoryStore::from_records(records)),
        &SearchConfig::default(),
    ))
}

pub(super) fn service_with_cap(
    records: Vec<StoredRecord>,
    relevance_candidate_cap: u32,
) -> Arc<SearchService<InMemoryStore>> {
    Arc::new(SearchService::new(
        Arc::new(InMemoryStore::from_records(records)),
        &SearchConfig {
            relevance_candidate_cap,
            ..SearchConfig::default()
        },
    ))
}
