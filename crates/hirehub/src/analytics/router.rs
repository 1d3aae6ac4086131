use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::envelope::ApiResponse;
use crate::error::AppError;
use crate::storage::ReadStore;

use super::assembler::{AnalyticsError, AnalyticsFilter, AnalyticsService};
use super::views::{DashboardView, TopStatsView, TrendSeries, TrendType};
use super::window::Period;

/// Raw analytics query string; every field is validated before use.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsQuery {
    pub period: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    #[serde(rename = "type")]
    pub trend: Option<String>,
    pub limit: Option<String>,
}

impl AnalyticsQuery {
    pub fn filter(&self) -> Result<AnalyticsFilter, AnalyticsError> {
        let period = match non_blank(self.period.as_deref()) {
            Some(period) => period.parse()?,
            None => Period::default(),
        };
        Ok(AnalyticsFilter {
            period,
            date_from: non_blank(self.date_from.as_deref())
                .map(parse_instant)
                .transpose()?,
            date_to: non_blank(self.date_to.as_deref())
                .map(parse_instant)
                .transpose()?,
        })
    }

    pub fn trend(&self) -> Result<TrendType, AnalyticsError> {
        match non_blank(self.trend.as_deref()) {
            Some(trend) => trend.parse(),
            None => Ok(TrendType::default()),
        }
    }

    pub fn limit(&self) -> Result<Option<usize>, AnalyticsError> {
        non_blank(self.limit.as_deref())
            .map(|raw| {
                raw.parse::<usize>().map_err(|_| {
                    AnalyticsError::Validation(format!(
                        "limit must be a positive integer, got '{raw}'"
                    ))
                })
            })
            .transpose()
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Accepts `YYYY-MM-DD` (UTC midnight) or RFC 3339.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, AnalyticsError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            AnalyticsError::Validation(format!(
                "'{raw}' is not a YYYY-MM-DD or RFC 3339 timestamp"
            ))
        })
}

pub fn analytics_router<S>(service: Arc<AnalyticsService<S>>) -> Router
where
    S: ReadStore + 'static,
{
    Router::new()
        .route("/api/v1/analytics/dashboard", get(dashboard_handler::<S>))
        .route("/api/v1/analytics/trends", get(trends_handler::<S>))
        .route("/api/v1/analytics/top", get(top_handler::<S>))
        .with_state(service)
}

pub(crate) async fn dashboard_handler<S>(
    State(service): State<Arc<AnalyticsService<S>>>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<DashboardView>>, AppError>
where
    S: ReadStore + 'static,
{
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let filter = query.filter()?;
    let view = service.dashboard(&filter, Utc::now(), &cancel).await?;
    Ok(Json(ApiResponse::ok(view)))
}

pub(crate) async fn trends_handler<S>(
    State(service): State<Arc<AnalyticsService<S>>>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<TrendSeries>>, AppError>
where
    S: ReadStore + 'static,
{
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let filter = query.filter()?;
    let series = service
        .trends(query.trend()?, &filter, query.limit()?, Utc::now(), &cancel)
        .await?;
    Ok(Json(ApiResponse::ok(series)))
}

pub(crate) async fn top_handler<S>(
    State(service): State<Arc<AnalyticsService<S>>>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<TopStatsView>>, AppError>
where
    S: ReadStore + 'static,
{
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let filter = query.filter()?;
    let top = service
        .top_stats(&filter, query.limit()?, Utc::now(), &cancel)
        .await?;
    Ok(Json(ApiResponse::ok(top)))
}
