use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{
    CandidateRecord, Collection, CompanyRecord, JobRecord, StorageError, StoredRecord,
};

/// Entity category of a searchable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Job,
    Candidate,
    Company,
}

impl EntityKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Job, Self::Candidate, Self::Company]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Candidate => "candidate",
            Self::Company => "company",
        }
    }

    pub const fn collection(self) -> Collection {
        match self {
            Self::Job => Collection::Jobs,
            Self::Candidate => Collection::Candidates,
            Self::Company => Collection::Companies,
        }
    }

    /// Fields searched by the term predicate and concatenated for relevance scoring.
    pub const fn text_fields(self) -> &'static [&'static str] {
        match self {
            Self::Job => &["title", "description", "companyName", "skills"],
            Self::Candidate => &["name", "headline", "bio", "skills"],
            Self::Company => &["name", "description", "industry"],
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "job" | "jobs" => Some(Self::Job),
            "candidate" | "candidates" | "talent" => Some(Self::Candidate),
            "company" | "companies" => Some(Self::Company),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status and popularity signals consulted by the scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSignals {
    pub is_featured: bool,
    pub is_verified: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityPayload {
    Job(JobRecord),
    Candidate(CandidateRecord),
    Company(CompanyRecord),
}

/// A record tagged with its kind. The kind cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchableRecord {
    id: String,
    kind: EntityKind,
    title: String,
    #[serde(skip)]
    text: String,
    signals: RecordSignals,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    entity: EntityPayload,
}

impl SearchableRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Concatenated primary text fields, original casing.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn signals(&self) -> RecordSignals {
        self.signals
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn entity(&self) -> &EntityPayload {
        &self.entity
    }

    pub fn from_stored(kind: EntityKind, record: StoredRecord) -> Result<Self, StorageError> {
        match (kind, record) {
            (EntityKind::Job, StoredRecord::Job(job)) => Ok(job.into()),
            (EntityKind::Candidate, StoredRecord::Candidate(candidate)) => Ok(candidate.into()),
            (EntityKind::Company, StoredRecord::Company(company)) => Ok(company.into()),
            (kind, other) => Err(StorageError::MalformedRow(format!(
                "expected {} record, storage returned {} record {}",
                kind,
                other.collection().label(),
                other.id()
            ))),
        }
    }
}

fn join_text(parts: &[&str], tags: &[String]) -> String {
    parts
        .iter()
        .copied()
        .chain(tags.iter().map(String::as_str))
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl From<JobRecord> for SearchableRecord {
    fn from(job: JobRecord) -> Self {
        Self {
            id: job.id.clone(),
            kind: EntityKind::Job,
            title: job.title.clone(),
            text: join_text(
                &[job.title.as_str(), job.description.as_str(), job.company_name.as_str()],
                &job.skills,
            ),
            signals: RecordSignals {
                is_featured: job.is_featured,
                is_verified: false,
                is_active: job.is_active,
                rating: None,
                experience_years: None,
            },
            created_at: job.created_at,
            updated_at: job.updated_at,
            entity: EntityPayload::Job(job),
        }
    }
}

impl From<CandidateRecord> for SearchableRecord {
    fn from(candidate: CandidateRecord) -> Self {
        Self {
            id: candidate.id.clone(),
            kind: EntityKind::Candidate,
            title: candidate.name.clone(),
            text: join_text(
                &[
                    candidate.name.as_str(),
                    candidate.headline.as_str(),
                    candidate.bio.as_str(),
                ],
                &candidate.skills,
            ),
            signals: RecordSignals {
                is_featured: false,
                is_verified: candidate.is_verified,
                is_active: candidate.is_active,
                rating: candidate.rating,
                experience_years: candidate.experience_years,
            },
            created_at: candidate.created_at,
            updated_at: candidate.updated_at,
            entity: EntityPayload::Candidate(candidate),
        }
    }
}

impl From<CompanyRecord> for SearchableRecord {
    fn from(company: CompanyRecord) -> Self {
        Self {
            id: company.id.clone(),
            kind: EntityKind::Company,
            title: company.name.clone(),
            text: join_text(
                &[
                    company.name.as_str(),
                    company.description.as_str(),
                    company.industry.as_str(),
                ],
                &[],
            ),
            signals: RecordSignals {
                is_featured: company.is_featured,
                is_verified: company.is_verified,
                is_active: company.is_active,
                rating: company.rating,
                experience_years: None,
            },
            created_at: company.created_at,
            updated_at: company.updated_at,
            entity: EntityPayload::Company(company),
        }
    }
}
