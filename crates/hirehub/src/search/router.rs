use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::envelope::ApiResponse;
use crate::error::AppError;
use crate::storage::ReadStore;

use super::filter::{non_blank, normalize_limit, parse_list, RawQuery};
use super::fusion::{UniversalSearchRequest, UniversalSearchResult};
use super::record::EntityKind;
use super::service::{PagedResult, SearchService};

/// Query string accepted by the universal search route.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UniversalQuery {
    pub search: Option<String>,
    pub q: Option<String>,
    pub types: Option<String>,
    pub limit: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
}

impl UniversalQuery {
    pub fn into_request(self) -> UniversalSearchRequest {
        let requested = parse_list(self.types.as_deref());
        let kinds: Vec<EntityKind> = requested
            .iter()
            .filter_map(|kind| EntityKind::parse(kind))
            .collect();
        let mut term = non_blank(self.search).or_else(|| non_blank(self.q));
        // Only unknown types: nothing can match, and an empty kind list would mean "all".
        if !requested.is_empty() && kinds.is_empty() {
            debug!(types = ?requested, "no recognised entity types requested");
            term = None;
        }
        UniversalSearchRequest {
            term,
            kinds,
            limit: self.limit.map(|limit| normalize_limit(Some(limit.as_str()))),
            location: non_blank(self.location),
            skills: parse_list(self.skills.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SuggestionQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
}

impl SuggestionQuery {
    /// Unparsable limits fall back to the default instead of rejecting the request.
    pub fn limit(&self) -> Option<usize> {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
    }
}

/// Router exposing per-kind search, universal search, and suggestions.
pub fn search_router<S>(service: Arc<SearchService<S>>) -> Router
where
    S: ReadStore + 'static,
{
    Router::new()
        .route("/api/v1/search", get(universal_handler::<S>))
        .route("/api/v1/search/jobs", get(jobs_handler::<S>))
        .route("/api/v1/search/candidates", get(candidates_handler::<S>))
        .route("/api/v1/search/companies", get(companies_handler::<S>))
        .route("/api/v1/search/suggestions", get(suggestions_handler::<S>))
        .with_state(service)
}

pub(crate) async fn universal_handler<S>(
    State(service): State<Arc<SearchService<S>>>,
    Query(query): Query<UniversalQuery>,
) -> Result<Json<ApiResponse<UniversalSearchResult>>, AppError>
where
    S: ReadStore + 'static,
{
    // Dropping the handler future (client gone) trips the guard and cancels the fan-out.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let result = service
        .universal_search(query.into_request(), &cancel)
        .await?;
    let message = format!("{} results", result.total);
    Ok(Json(ApiResponse::ok(result).with_message(message)))
}

async fn kind_search<S>(
    service: &SearchService<S>,
    kind: EntityKind,
    raw: RawQuery,
) -> Result<Json<ApiResponse<PagedResult>>, AppError>
where
    S: ReadStore + 'static,
{
    let page = service.search_raw(kind, raw).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub(crate) async fn jobs_handler<S>(
    State(service): State<Arc<SearchService<S>>>,
    Query(raw): Query<RawQuery>,
) -> Result<Json<ApiResponse<PagedResult>>, AppError>
where
    S: ReadStore + 'static,
{
    kind_search(&service, EntityKind::Job, raw).await
}

pub(crate) async fn candidates_handler<S>(
    State(service): State<Arc<SearchService<S>>>,
    Query(raw): Query<RawQuery>,
) -> Result<Json<ApiResponse<PagedResult>>, AppError>
where
    S: ReadStore + 'static,
{
    kind_search(&service, EntityKind::Candidate, raw).await
}

pub(crate) async fn companies_handler<S>(
    State(service): State<Arc<SearchService<S>>>,
    Query(raw): Query<RawQuery>,
) -> Result<Json<ApiResponse<PagedResult>>, AppError>
where
    S: ReadStore + 'static,
{
    kind_search(&service, EntityKind::Company, raw).await
}

pub(crate) async fn suggestions_handler<S>(
    State(service): State<Arc<SearchService<S>>>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError>
where
    S: ReadStore + 'static,
{
    let limit = query.limit();
    let prefix = query.q.unwrap_or_default();
    let suggestions = service.suggestions(&prefix, limit).await?;
    Ok(Json(ApiResponse::ok(suggestions)))
}
