//! Read-only storage contract consumed by the search and analytics paths.
//!
//! The persistence layer is owned elsewhere; this module only defines what the core
//! needs from it (counts, paged finds, group-bys, and a span average) together with an
//! in-memory implementation used by the demo service and the test suites.

pub mod memory;
pub mod predicate;
pub mod records;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use memory::InMemoryStore;
pub use predicate::Predicate;
pub use records::{
    ApplicationRecord, ApplicationStatus, CandidateRecord, CompanyRecord, Document,
    ExperienceLevel, FieldValue, JobRecord, JobType, StoredRecord, UserRecord, UserRole,
};

/// Collections exposed by the storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Jobs,
    Candidates,
    Companies,
    Users,
    Applications,
}

impl Collection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Candidates => "candidates",
            Self::Companies => "companies",
            Self::Users => "users",
            Self::Applications => "applications",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub order: SortOrder,
}

impl SortSpec {
    pub const fn newest_first() -> Self {
        Self {
            field: "createdAt",
            order: SortOrder::Desc,
        }
    }
}

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.limit as usize
    }
}

/// Page of records plus the total size of the full match set.
#[derive(Debug, Clone, Default)]
pub struct FindResult {
    pub records: Vec<StoredRecord>,
    pub total: u64,
}

/// Untyped group-by row as produced by the storage layer (`{"_id": .., "count": ..}`).
pub type GroupRow = Map<String, Value>;

#[async_trait]
pub trait ReadStore: Send + Sync {
    async fn count(
        &self,
        collection: Collection,
        predicate: &Predicate,
    ) -> Result<u64, StorageError>;

    async fn find(
        &self,
        collection: Collection,
        predicate: &Predicate,
        sort: &[SortSpec],
        page: Option<PageRequest>,
    ) -> Result<FindResult, StorageError>;

    async fn group_by(
        &self,
        collection: Collection,
        field: &'static str,
        predicate: &Predicate,
    ) -> Result<Vec<GroupRow>, StorageError>;

    /// Mean of `end_field - start_field` in days over matching records holding both.
    async fn average_span_days(
        &self,
        collection: Collection,
        start_field: &'static str,
        end_field: &'static str,
        predicate: &Predicate,
    ) -> Result<Option<f64>, StorageError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage query timed out")]
    Timeout,
    #[error("malformed query: {0}")]
    InvalidQuery(String),
    #[error("malformed aggregate row: {0}")]
    MalformedRow(String),
}
