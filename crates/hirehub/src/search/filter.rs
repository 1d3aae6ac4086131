//! Query parameter normalization.
//!
//! Raw parameters arrive as loosely typed strings. [`normalize`] is the single place where
//! they are decoded into a [`CanonicalFilter`]: unknown fields are dropped, unparsable values
//! fall back to their defaults, and pagination is clamped into range. The function never
//! fails, so every downstream component can rely on a fully populated filter.

use serde::{Deserialize, Serialize};

use crate::storage::{ExperienceLevel, JobType, SortOrder};

use super::record::EntityKind;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Query parameters as received from the HTTP layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub include_inactive: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub is_remote: Option<String>,
    pub company_id: Option<String>,
    pub experience_min: Option<String>,
    pub experience_max: Option<String>,
    pub is_verified: Option<String>,
    pub rating_min: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Relevance,
    CreatedAt,
    UpdatedAt,
    Title,
    Salary,
    Rating,
    Experience,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match canonical_token(raw).as_str() {
            "relevance" | "score" => Some(Self::Relevance),
            "createdat" | "created" | "date" | "newest" => Some(Self::CreatedAt),
            "updatedat" | "updated" => Some(Self::UpdatedAt),
            "title" | "name" => Some(Self::Title),
            "salary" => Some(Self::Salary),
            "rating" => Some(Self::Rating),
            "experience" | "experienceyears" => Some(Self::Experience),
            _ => None,
        }
    }

    /// Storage column for this sort key, when the kind has one.
    pub fn storage_field(self, kind: EntityKind) -> Option<&'static str> {
        match (self, kind) {
            (Self::Relevance, _) => None,
            (Self::CreatedAt, _) => Some("createdAt"),
            (Self::UpdatedAt, _) => Some("updatedAt"),
            (Self::Title, EntityKind::Job) => Some("title"),
            (Self::Title, _) => Some("name"),
            (Self::Salary, EntityKind::Job) => Some("salaryMax"),
            (Self::Rating, EntityKind::Candidate | EntityKind::Company) => Some("rating"),
            (Self::Experience, EntityKind::Candidate) => Some("experienceYears"),
            _ => None,
        }
    }
}

/// Inclusive numeric bounds; `min <= max` whenever both are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        match (min, max) {
            (Some(low), Some(high)) if low > high => Self {
                min: Some(high),
                max: Some(low),
            },
            _ => Self { min, max },
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub salary: NumericRange,
    pub skills: Vec<String>,
    pub is_remote: Option<bool>,
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFilter {
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub experience: NumericRange,
    pub is_verified: Option<bool>,
    pub rating_min: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    pub location: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub is_verified: Option<bool>,
    pub rating_min: Option<f64>,
}

/// Per-kind filter sections; each query builder reads only its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityFilters {
    pub job: JobFilter,
    pub candidate: CandidateFilter,
    pub company: CompanyFilter,
}

impl EntityFilters {
    /// Filters carrying only the signals shared across kinds in universal search.
    pub fn shared(location: Option<String>, skills: Vec<String>) -> Self {
        Self {
            job: JobFilter {
                location: location.clone(),
                skills: skills.clone(),
                ..JobFilter::default()
            },
            candidate: CandidateFilter {
                location: location.clone(),
                skills,
                ..CandidateFilter::default()
            },
            company: CompanyFilter {
                location,
                ..CompanyFilter::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalFilter {
    pub search_term: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub include_inactive: bool,
    pub filters: EntityFilters,
}

impl Default for CanonicalFilter {
    fn default() -> Self {
        Self {
            search_term: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: SortField::Relevance,
            sort_order: SortOrder::Desc,
            include_inactive: false,
            filters: EntityFilters::default(),
        }
    }
}

impl CanonicalFilter {
    pub fn term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    /// Relevance ordering only applies when there is a term to rank against.
    pub fn ranks_by_relevance(&self) -> bool {
        self.sort_by == SortField::Relevance && self.search_term.is_some()
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit.max(1)))
    }
}

pub fn normalize(raw: RawQuery) -> CanonicalFilter {
    let RawQuery {
        search,
        page,
        limit,
        sort_by,
        sort_order,
        include_inactive,
        location,
        skills,
        job_type,
        experience_level,
        salary_min,
        salary_max,
        is_remote,
        company_id,
        experience_min,
        experience_max,
        is_verified,
        rating_min,
        industry,
        size,
    } = raw;

    let location = non_blank(location);
    let skills = parse_list(skills.as_deref());
    let is_verified = is_verified.as_deref().and_then(parse_bool);
    let rating_min = parse_number(rating_min.as_deref());

    CanonicalFilter {
        search_term: non_blank(search),
        page: normalize_page(page.as_deref()),
        limit: normalize_limit(limit.as_deref()),
        sort_by: sort_by
            .as_deref()
            .and_then(SortField::parse)
            .unwrap_or_default(),
        sort_order: sort_order
            .as_deref()
            .and_then(parse_sort_order)
            .unwrap_or_default(),
        include_inactive: include_inactive
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(false),
        filters: EntityFilters {
            job: JobFilter {
                location: location.clone(),
                job_type: job_type.as_deref().and_then(parse_job_type),
                experience_level: experience_level
                    .as_deref()
                    .and_then(parse_experience_level),
                salary: NumericRange::new(
                    parse_number(salary_min.as_deref()),
                    parse_number(salary_max.as_deref()),
                ),
                skills: skills.clone(),
                is_remote: is_remote.as_deref().and_then(parse_bool),
                company_id: non_blank(company_id),
            },
            candidate: CandidateFilter {
                location: location.clone(),
                skills,
                experience: NumericRange::new(
                    parse_number(experience_min.as_deref()),
                    parse_number(experience_max.as_deref()),
                ),
                is_verified,
                rating_min,
            },
            company: CompanyFilter {
                location,
                industry: non_blank(industry),
                size: non_blank(size),
                is_verified,
                rating_min,
            },
        },
    }
}

pub fn normalize_page(raw: Option<&str>) -> u32 {
    match raw.and_then(|value| value.trim().parse::<i64>().ok()) {
        Some(page) if page >= 1 => u32::try_from(page).unwrap_or(u32::MAX),
        _ => DEFAULT_PAGE,
    }
}

pub fn normalize_limit(raw: Option<&str>) -> u32 {
    match raw.and_then(|value| value.trim().parse::<i64>().ok()) {
        Some(limit) if limit > i64::from(MAX_LIMIT) => MAX_LIMIT,
        Some(limit) if limit >= 1 => limit as u32,
        _ => DEFAULT_LIMIT,
    }
}

pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Comma separated list, trimmed and de-duplicated case-insensitively.
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.unwrap_or_default().split(',') {
        let item = item.trim();
        if item.is_empty() || items.iter().any(|seen| seen.eq_ignore_ascii_case(item)) {
            continue;
        }
        items.push(item.to_string());
    }
    items
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

fn parse_sort_order(raw: &str) -> Option<SortOrder> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "asc" | "ascending" => Some(SortOrder::Asc),
        "desc" | "descending" => Some(SortOrder::Desc),
        _ => None,
    }
}

fn canonical_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_ascii_lowercase()
}

fn parse_job_type(raw: &str) -> Option<JobType> {
    match canonical_token(raw).as_str() {
        "fulltime" => Some(JobType::FullTime),
        "parttime" => Some(JobType::PartTime),
        "contract" | "contractor" => Some(JobType::Contract),
        "internship" | "intern" => Some(JobType::Internship),
        "temporary" | "temp" => Some(JobType::Temporary),
        _ => None,
    }
}

fn parse_experience_level(raw: &str) -> Option<ExperienceLevel> {
    match canonical_token(raw).as_str() {
        "entry" | "junior" | "entrylevel" => Some(ExperienceLevel::Entry),
        "mid" | "midlevel" | "intermediate" => Some(ExperienceLevel::Mid),
        "senior" => Some(ExperienceLevel::Senior),
        "lead" | "principal" => Some(ExperienceLevel::Lead),
        "executive" => Some(ExperienceLevel::Executive),
        _ => None,
    }
}
