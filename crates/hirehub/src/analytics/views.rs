use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Collection, StoredRecord};

use super::aggregation::GroupCount;
use super::assembler::AnalyticsError;
use super::growth::GrowthRate;
use super::window::{Period, TimeWindow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_users: u64,
    pub total_candidates: u64,
    pub total_companies: u64,
    pub total_jobs: u64,
    pub active_jobs: u64,
    pub total_applications: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStats {
    pub users: GrowthRate,
    pub jobs: GrowthRate,
    pub applications: GrowthRate,
    pub companies: GrowthRate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub application_rate: f64,
    pub interview_rate: f64,
    pub hire_rate: f64,
    /// Days.
    pub average_time_to_hire: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Job,
    Application,
    Company,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub id: String,
    pub label: String,
    pub at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn from_record(record: StoredRecord) -> Option<Self> {
        match record {
            StoredRecord::Job(job) => Some(Self {
                kind: ActivityKind::Job,
                id: job.id,
                label: format!("{} at {}", job.title, job.company_name),
                at: job.created_at,
            }),
            StoredRecord::Company(company) => Some(Self {
                kind: ActivityKind::Company,
                id: company.id,
                label: company.name,
                at: company.created_at,
            }),
            StoredRecord::Application(application) => Some(Self {
                kind: ActivityKind::Application,
                label: format!(
                    "{} applied to {} ({})",
                    application.candidate_id,
                    application.job_id,
                    application.status.label()
                ),
                id: application.id,
                at: application.created_at,
            }),
            StoredRecord::Candidate(_) | StoredRecord::User(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub period: Period,
    pub window: TimeWindow,
    pub overview: OverviewStats,
    pub growth: GrowthStats,
    pub recent_activity: Vec<ActivityEntry>,
    pub performance: PerformanceMetrics,
}

/// Metric a trend series counts per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendType {
    #[default]
    Users,
    Jobs,
    Applications,
    Companies,
    Hires,
}

impl TrendType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Users,
            Self::Jobs,
            Self::Applications,
            Self::Companies,
            Self::Hires,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Jobs => "jobs",
            Self::Applications => "applications",
            Self::Companies => "companies",
            Self::Hires => "hires",
        }
    }

    pub const fn collection(self) -> Collection {
        match self {
            Self::Users => Collection::Users,
            Self::Jobs => Collection::Jobs,
            Self::Applications | Self::Hires => Collection::Applications,
            Self::Companies => Collection::Companies,
        }
    }

    /// Timestamp that places a record in a bucket.
    pub const fn timestamp_field(self) -> &'static str {
        match self {
            Self::Hires => "hiredAt",
            _ => "createdAt",
        }
    }
}

impl fmt::Display for TrendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TrendType {
    type Err = AnalyticsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label() == normalized)
            .ok_or_else(|| {
                AnalyticsError::Validation(format!(
                    "unknown trend type '{}'; expected users, jobs, applications, companies or hires",
                    raw.trim()
                ))
            })
    }
}

/// One sub-window of a trend series with the metrics measured inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub window: TimeWindow,
    pub metrics: BTreeMap<String, f64>,
}

impl Bucket {
    pub fn point(&self, metric: &str) -> TrendPoint {
        let from = self.window.from();
        TrendPoint {
            label: from.format("%Y-%m-%d").to_string(),
            value: self.metrics.get(metric).copied().unwrap_or(0.0),
            date: from,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub value: f64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    #[serde(rename = "type")]
    pub trend: TrendType,
    pub period: Period,
    pub window: TimeWindow,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopStatsView {
    pub period: Period,
    pub window: TimeWindow,
    pub top_skills: Vec<GroupCount>,
    pub top_locations: Vec<GroupCount>,
    pub top_companies: Vec<GroupCount>,
    pub top_job_types: Vec<GroupCount>,
}
