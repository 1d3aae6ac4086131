use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Collection;

/// Typed view of a single stored field, the read model's equivalent of a column value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Flag(bool),
    Tags(&'a [String]),
    Timestamp(DateTime<Utc>),
}

/// Field lookup used by predicates, sorting, and aggregation.
pub trait Document {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

impl JobType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::PartTime => "part_time",
            Self::Contract => "contract",
            Self::Internship => "internship",
            Self::Temporary => "temporary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Lead => "lead",
            Self::Executive => "executive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Candidate,
    Employer,
    Admin,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Employer => "employer",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Interview,
    Offered,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Interview => "interview",
            Self::Offered => "offered",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub company_id: String,
    pub company_name: String,
    pub location: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for JobRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "title" => Some(FieldValue::Text(&self.title)),
            "description" => Some(FieldValue::Text(&self.description)),
            "companyId" => Some(FieldValue::Text(&self.company_id)),
            "companyName" => Some(FieldValue::Text(&self.company_name)),
            "location" => Some(FieldValue::Text(&self.location)),
            "jobType" => Some(FieldValue::Text(self.job_type.label())),
            "experienceLevel" => Some(FieldValue::Text(self.experience_level.label())),
            "salaryMin" => self.salary_min.map(FieldValue::Number),
            "salaryMax" => self.salary_max.map(FieldValue::Number),
            "skills" => Some(FieldValue::Tags(&self.skills)),
            "isRemote" => Some(FieldValue::Flag(self.is_remote)),
            "isFeatured" => Some(FieldValue::Flag(self.is_featured)),
            "isActive" => Some(FieldValue::Flag(self.is_active)),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            "updatedAt" => Some(FieldValue::Timestamp(self.updated_at)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for CandidateRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "name" => Some(FieldValue::Text(&self.name)),
            "headline" => Some(FieldValue::Text(&self.headline)),
            "bio" => Some(FieldValue::Text(&self.bio)),
            "location" => Some(FieldValue::Text(&self.location)),
            "skills" => Some(FieldValue::Tags(&self.skills)),
            "experienceYears" => self.experience_years.map(FieldValue::Number),
            "rating" => self.rating.map(FieldValue::Number),
            "isVerified" => Some(FieldValue::Flag(self.is_verified)),
            "isActive" => Some(FieldValue::Flag(self.is_active)),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            "updatedAt" => Some(FieldValue::Timestamp(self.updated_at)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for CompanyRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "name" => Some(FieldValue::Text(&self.name)),
            "description" => Some(FieldValue::Text(&self.description)),
            "industry" => Some(FieldValue::Text(&self.industry)),
            "size" => Some(FieldValue::Text(&self.size)),
            "location" => Some(FieldValue::Text(&self.location)),
            "rating" => self.rating.map(FieldValue::Number),
            "isVerified" => Some(FieldValue::Flag(self.is_verified)),
            "isFeatured" => Some(FieldValue::Flag(self.is_featured)),
            "isActive" => Some(FieldValue::Flag(self.is_active)),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            "updatedAt" => Some(FieldValue::Timestamp(self.updated_at)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Document for UserRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "email" => Some(FieldValue::Text(&self.email)),
            "role" => Some(FieldValue::Text(self.role.label())),
            "isActive" => Some(FieldValue::Flag(self.is_active)),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub company_id: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub interviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hired_at: Option<DateTime<Utc>>,
}

impl Document for ApplicationRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "jobId" => Some(FieldValue::Text(&self.job_id)),
            "candidateId" => Some(FieldValue::Text(&self.candidate_id)),
            "companyId" => Some(FieldValue::Text(&self.company_id)),
            "status" => Some(FieldValue::Text(self.status.label())),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            "interviewedAt" => self.interviewed_at.map(FieldValue::Timestamp),
            "hiredAt" => self.hired_at.map(FieldValue::Timestamp),
            _ => None,
        }
    }
}

fn default_active() -> bool {
    true
}

/// A record as held by the storage collaborator, tagged with its collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "collection", rename_all = "snake_case")]
pub enum StoredRecord {
    Job(JobRecord),
    Candidate(CandidateRecord),
    Company(CompanyRecord),
    User(UserRecord),
    Application(ApplicationRecord),
}

impl StoredRecord {
    pub const fn collection(&self) -> Collection {
        match self {
            Self::Job(_) => Collection::Jobs,
            Self::Candidate(_) => Collection::Candidates,
            Self::Company(_) => Collection::Companies,
            Self::User(_) => Collection::Users,
            Self::Application(_) => Collection::Applications,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Job(record) => &record.id,
            Self::Candidate(record) => &record.id,
            Self::Company(record) => &record.id,
            Self::User(record) => &record.id,
            Self::Application(record) => &record.id,
        }
    }
}

impl Document for StoredRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match self {
            Self::Job(record) => record.field(name),
            Self::Candidate(record) => record.field(name),
            Self::Company(record) => record.field(name),
            Self::User(record) => record.field(name),
            Self::Application(record) => record.field(name),
        }
    }
}
