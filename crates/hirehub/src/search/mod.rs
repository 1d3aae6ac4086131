//! Search path: filter normalization, per-kind query builders, relevance scoring, and
//! cross-kind result fusion.

pub mod builders;
pub mod filter;
pub mod fusion;
pub mod record;
pub mod router;
pub mod scorer;
pub mod service;
mod suggestions;

#[cfg(test)]
mod tests;

pub use builders::{EntityQueryBuilder, QueryPage};
pub use filter::{
    normalize, CandidateFilter, CanonicalFilter, CompanyFilter, EntityFilters, JobFilter,
    NumericRange, RawQuery, SortField,
};
pub use fusion::{
    FusionWeights, KindSummary, RankedResult, UniversalSearchRequest, UniversalSearchResult,
};
pub use record::{EntityKind, EntityPayload, RecordSignals, SearchableRecord};
pub use router::search_router;
pub use scorer::{RelevanceScorer, ScoredResult, Scores, ScoringWeights};
pub use service::{PagedResult, SearchError, SearchService};
