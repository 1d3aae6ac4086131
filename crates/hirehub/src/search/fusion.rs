//! Universal search: fan out one query per entity kind, score, and merge into a single
//! ranked list.
//!
//! A kind whose query fails contributes nothing and is reported in the per-kind summary;
//! the request as a whole only fails when the caller cancels it.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::storage::{ReadStore, SortOrder};

use super::builders::QueryPage;
use super::filter::{CanonicalFilter, EntityFilters, SortField, DEFAULT_LIMIT, MAX_LIMIT};
use super::record::EntityKind;
use super::scorer::ScoredResult;
use super::service::{SearchError, SearchService};

/// Blend of textual relevance and status score used to order merged results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub relevance: f64,
    pub score: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            relevance: 0.7,
            score: 0.3,
        }
    }
}

impl FusionWeights {
    pub fn rank(&self, result: &ScoredResult) -> f64 {
        self.relevance * result.relevance + self.score * result.score
    }
}

#[derive(Debug, Clone, Default)]
pub struct UniversalSearchRequest {
    pub term: Option<String>,
    /// Kinds to search; empty means all kinds.
    pub kinds: Vec<EntityKind>,
    pub limit: Option<u32>,
    pub location: Option<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    #[serde(flatten)]
    pub result: ScoredResult,
    pub rank: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSummary {
    pub kind: EntityKind,
    pub total: u64,
    pub failed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalSearchResult {
    pub results: Vec<RankedResult>,
    pub total: u64,
    pub search_time_ms: u64,
    pub kinds: Vec<KindSummary>,
}

impl UniversalSearchResult {
    fn empty(started: Instant) -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            search_time_ms: started.elapsed().as_millis() as u64,
            kinds: Vec::new(),
        }
    }
}

/// Aborts the per-kind tasks if the request is dropped or cancelled mid-flight.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

impl<S> SearchService<S>
where
    S: ReadStore + 'static,
{
    pub async fn universal_search(
        &self,
        request: UniversalSearchRequest,
        cancel: &CancellationToken,
    ) -> Result<UniversalSearchResult, SearchError> {
        let started = Instant::now();
        let UniversalSearchRequest {
            term,
            kinds,
            limit,
            location,
            skills,
        } = request;

        let Some(term) = term
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty())
        else {
            return Ok(UniversalSearchResult::empty(started));
        };

        let limit = limit.map_or(DEFAULT_LIMIT, |limit| limit.clamp(1, MAX_LIMIT));
        let kinds: Vec<EntityKind> = EntityKind::ordered()
            .into_iter()
            .filter(|kind| kinds.is_empty() || kinds.contains(kind))
            .collect();

        let filter = CanonicalFilter {
            search_term: Some(term.clone()),
            page: 1,
            limit,
            sort_by: SortField::Relevance,
            sort_order: SortOrder::Desc,
            include_inactive: false,
            filters: EntityFilters::shared(location, skills),
        };

        let mut handles = Vec::with_capacity(kinds.len());
        for kind in &kinds {
            let builder = self.builder(*kind);
            let store = Arc::clone(&self.store);
            let filter = filter.clone();
            handles.push(tokio::spawn(async move {
                builder.query(store.as_ref(), &filter).await
            }));
        }
        let _abort = AbortOnDrop(handles.iter().map(|handle| handle.abort_handle()).collect());

        let outcomes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            outcomes = join_all(handles) => outcomes,
        };

        let mut summaries = Vec::with_capacity(kinds.len());
        let mut merged: Vec<RankedResult> = Vec::new();
        let mut total = 0u64;

        for (kind, outcome) in kinds.iter().copied().zip(outcomes) {
            let page: QueryPage = match outcome {
                Ok(Ok(page)) => page,
                Ok(Err(error)) => {
                    warn!(kind = %kind, %error, "search kind failed; contributing no results");
                    summaries.push(KindSummary {
                        kind,
                        total: 0,
                        failed: true,
                    });
                    continue;
                }
                Err(error) => {
                    warn!(kind = %kind, %error, "search task aborted; contributing no results");
                    summaries.push(KindSummary {
                        kind,
                        total: 0,
                        failed: true,
                    });
                    continue;
                }
            };

            total += page.total;
            summaries.push(KindSummary {
                kind,
                total: page.total,
                failed: false,
            });
            merged.extend(page.records.into_iter().map(|record| {
                let result = self.scorer.scored(record, Some(term.as_str()));
                let rank = self.fusion.rank(&result);
                RankedResult { result, rank }
            }));
        }

        // Stable: equal ranks keep kind order, then storage order within a kind.
        merged.sort_by(|left, right| {
            right
                .rank
                .partial_cmp(&left.rank)
                .unwrap_or(Ordering::Equal)
        });
        merged.truncate(limit as usize);

        let search_time_ms = started.elapsed().as_millis() as u64;
        debug!(
            term = %term,
            total,
            returned = merged.len(),
            search_time_ms,
            "universal search complete"
        );

        Ok(UniversalSearchResult {
            results: merged,
            total,
            search_time_ms,
            kinds: summaries,
        })
    }
}
