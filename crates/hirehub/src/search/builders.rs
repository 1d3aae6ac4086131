use crate::storage::{PageRequest, Predicate, ReadStore, SortSpec, StorageError};

use super::filter::CanonicalFilter;
use super::record::{EntityKind, SearchableRecord};

pub const DEFAULT_RELEVANCE_CANDIDATE_CAP: u32 = 1000;

/// Records returned by a builder together with the exact size of the match set.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub records: Vec<SearchableRecord>,
    pub total: u64,
    /// Set when the records are an unpaged candidate set whose final ordering and
    /// pagination are left to the relevance scorer. Relevance pages beyond the scored
    /// window come back already paged, newest first, with this unset.
    pub ranking_deferred: bool,
}

/// Translates a canonical filter into storage predicates for one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct EntityQueryBuilder {
    kind: EntityKind,
    relevance_candidate_cap: u32,
}

impl EntityQueryBuilder {
    pub const fn for_kind(kind: EntityKind) -> Self {
        Self {
            kind,
            relevance_candidate_cap: DEFAULT_RELEVANCE_CANDIDATE_CAP,
        }
    }

    pub const fn jobs() -> Self {
        Self::for_kind(EntityKind::Job)
    }

    pub const fn candidates() -> Self {
        Self::for_kind(EntityKind::Candidate)
    }

    pub const fn companies() -> Self {
        Self::for_kind(EntityKind::Company)
    }

    pub const fn with_candidate_cap(mut self, cap: u32) -> Self {
        self.relevance_candidate_cap = if cap == 0 { 1 } else { cap };
        self
    }

    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Size of the relevance-scored candidate set for pages of `limit`: the cap rounded
    /// down to whole pages, never less than one page.
    pub fn scored_window(&self, limit: u32) -> u64 {
        let cap = u64::from(self.relevance_candidate_cap);
        let limit = u64::from(limit.max(1));
        (cap / limit).max(1) * limit
    }

    pub fn predicate(&self, filter: &CanonicalFilter) -> Predicate {
        let mut terms = Vec::new();
        if !filter.include_inactive {
            terms.push(Predicate::Flag {
                field: "isActive",
                value: true,
            });
        }
        if let Some(term) = filter.term() {
            terms.push(Predicate::any_text_contains(self.kind.text_fields(), term));
        }

        match self.kind {
            EntityKind::Job => job_terms(filter, &mut terms),
            EntityKind::Candidate => candidate_terms(filter, &mut terms),
            EntityKind::Company => company_terms(filter, &mut terms),
        }

        Predicate::and(terms)
    }

    pub fn sort(&self, filter: &CanonicalFilter) -> Vec<SortSpec> {
        let newest = SortSpec::newest_first();
        match filter.sort_by.storage_field(self.kind) {
            Some("createdAt") => vec![SortSpec {
                field: "createdAt",
                order: filter.sort_order,
            }],
            Some(field) => vec![
                SortSpec {
                    field,
                    order: filter.sort_order,
                },
                newest,
            ],
            None => vec![newest],
        }
    }

    pub async fn query<S>(
        &self,
        store: &S,
        filter: &CanonicalFilter,
    ) -> Result<QueryPage, StorageError>
    where
        S: ReadStore + ?Sized,
    {
        let predicate = self.predicate(filter);
        let collection = self.kind.collection();

        let scored_window = self.scored_window(filter.limit);
        let offset = u64::from(filter.page.max(1) - 1) * u64::from(filter.limit);

        let (result, ranking_deferred) = if filter.ranks_by_relevance() && offset < scored_window
        {
            let candidates = PageRequest {
                page: 1,
                limit: scored_window as u32,
            };
            let result = store
                .find(
                    collection,
                    &predicate,
                    &[SortSpec::newest_first()],
                    Some(candidates),
                )
                .await?;
            (result, true)
        } else {
            // Past the scored window relevance pages continue in the candidate draw
            // order, so every page up to `total_pages` is reachable exactly once.
            let sort = if filter.ranks_by_relevance() {
                vec![SortSpec::newest_first()]
            } else {
                self.sort(filter)
            };
            let page = PageRequest {
                page: filter.page,
                limit: filter.limit,
            };
            let result = store
                .find(collection, &predicate, &sort, Some(page))
                .await?;
            (result, false)
        };

        let records = result
            .records
            .into_iter()
            .map(|record| SearchableRecord::from_stored(self.kind, record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryPage {
            records,
            total: result.total,
            ranking_deferred,
        })
    }
}

fn job_terms(filter: &CanonicalFilter, terms: &mut Vec<Predicate>) {
    let job = &filter.filters.job;
    if let Some(location) = &job.location {
        terms.push(contains("location", location));
    }
    if let Some(job_type) = job.job_type {
        terms.push(equals("jobType", job_type.label()));
    }
    if let Some(level) = job.experience_level {
        terms.push(equals("experienceLevel", level.label()));
    }
    // Salary filters select overlapping bands rather than nested ones.
    if let Some(min) = job.salary.min {
        terms.push(Predicate::Range {
            field: "salaryMax",
            min: Some(min),
            max: None,
        });
    }
    if let Some(max) = job.salary.max {
        terms.push(Predicate::Range {
            field: "salaryMin",
            min: None,
            max: Some(max),
        });
    }
    if !job.skills.is_empty() {
        terms.push(Predicate::AnyOf {
            field: "skills",
            values: job.skills.clone(),
        });
    }
    if let Some(remote) = job.is_remote {
        terms.push(Predicate::Flag {
            field: "isRemote",
            value: remote,
        });
    }
    if let Some(company_id) = &job.company_id {
        terms.push(equals("companyId", company_id));
    }
}

fn candidate_terms(filter: &CanonicalFilter, terms: &mut Vec<Predicate>) {
    let candidate = &filter.filters.candidate;
    if let Some(location) = &candidate.location {
        terms.push(contains("location", location));
    }
    if !candidate.skills.is_empty() {
        terms.push(Predicate::AnyOf {
            field: "skills",
            values: candidate.skills.clone(),
        });
    }
    if !candidate.experience.is_unbounded() {
        terms.push(Predicate::Range {
            field: "experienceYears",
            min: candidate.experience.min,
            max: candidate.experience.max,
        });
    }
    if let Some(verified) = candidate.is_verified {
        terms.push(Predicate::Flag {
            field: "isVerified",
            value: verified,
        });
    }
    if let Some(rating) = candidate.rating_min {
        terms.push(Predicate::Range {
            field: "rating",
            min: Some(rating),
            max: None,
        });
    }
}

fn company_terms(filter: &CanonicalFilter, terms: &mut Vec<Predicate>) {
    let company = &filter.filters.company;
    if let Some(location) = &company.location {
        terms.push(contains("location", location));
    }
    if let Some(industry) = &company.industry {
        terms.push(equals("industry", industry));
    }
    if let Some(size) = &company.size {
        terms.push(equals("size", size));
    }
    if let Some(verified) = company.is_verified {
        terms.push(Predicate::Flag {
            field: "isVerified",
            value: verified,
        });
    }
    if let Some(rating) = company.rating_min {
        terms.push(Predicate::Range {
            field: "rating",
            min: Some(rating),
            max: None,
        });
    }
}

fn contains(field: &'static str, needle: &str) -> Predicate {
    Predicate::Contains {
        field,
        needle: needle.to_string(),
    }
}

fn equals(field: &'static str, value: &str) -> Predicate {
    Predicate::Equals {
        field,
        value: value.to_string(),
    }
}
