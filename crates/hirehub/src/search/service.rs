use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::SearchConfig;
use crate::storage::{ReadStore, SortOrder, StorageError};

use super::builders::EntityQueryBuilder;
use super::filter::{normalize, CanonicalFilter, RawQuery};
use super::fusion::FusionWeights;
use super::record::EntityKind;
use super::scorer::{RelevanceScorer, ScoredResult, ScoringWeights};

/// Paged per-kind search response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult {
    pub kind: EntityKind,
    pub items: Vec<ScoredResult>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// Entry point for the search path: per-kind search, universal search, and suggestions.
pub struct SearchService<S> {
    pub(super) store: Arc<S>,
    pub(super) scorer: RelevanceScorer,
    pub(super) fusion: FusionWeights,
    pub(super) candidate_cap: u32,
}

impl<S> SearchService<S>
where
    S: ReadStore + 'static,
{
    pub fn new(store: Arc<S>, config: &SearchConfig) -> Self {
        Self {
            store,
            scorer: RelevanceScorer::new(ScoringWeights::default()),
            fusion: FusionWeights {
                relevance: config.relevance_weight,
                score: config.score_weight,
            },
            candidate_cap: config.relevance_candidate_cap,
        }
    }

    pub fn with_scoring(mut self, weights: ScoringWeights) -> Self {
        self.scorer = RelevanceScorer::new(weights);
        self
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    pub(super) fn builder(&self, kind: EntityKind) -> EntityQueryBuilder {
        EntityQueryBuilder::for_kind(kind).with_candidate_cap(self.candidate_cap)
    }

    pub async fn search_raw(
        &self,
        kind: EntityKind,
        raw: RawQuery,
    ) -> Result<PagedResult, SearchError> {
        self.search(kind, &normalize(raw)).await
    }

    /// Runs one kind's query and scores the page. With relevance ordering the scorer
    /// sorts the candidate set (stable, so ties keep storage order) before paging.
    pub async fn search(
        &self,
        kind: EntityKind,
        filter: &CanonicalFilter,
    ) -> Result<PagedResult, SearchError> {
        let page = self
            .builder(kind)
            .query(self.store.as_ref(), filter)
            .await
            .map_err(|source| SearchError::Storage { kind, source })?;

        let term = filter.term();
        let mut items: Vec<ScoredResult> = page
            .records
            .into_iter()
            .map(|record| self.scorer.scored(record, term))
            .collect();

        if page.ranking_deferred {
            items.sort_by(|left, right| {
                let ordering = left.score.partial_cmp(&right.score).unwrap_or(Ordering::Equal);
                match filter.sort_order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
            let offset = (filter.page as usize - 1).saturating_mul(filter.limit as usize);
            items = items
                .into_iter()
                .skip(offset)
                .take(filter.limit as usize)
                .collect();
        }

        debug!(
            kind = %kind,
            total = page.total,
            returned = items.len(),
            "entity search complete"
        );

        Ok(PagedResult {
            kind,
            items,
            total: page.total,
            page: filter.page,
            limit: filter.limit,
            total_pages: filter.total_pages(page.total),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("{kind} search failed: {source}")]
    Storage {
        kind: EntityKind,
        #[source]
        source: StorageError,
    },
    #[error("search request cancelled")]
    Cancelled,
}
