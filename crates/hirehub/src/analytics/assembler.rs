//! Composes windows and aggregates into the dashboard, trend and top-stats views.
//!
//! Unlike search, analytics never degrades: the first failing aggregate fails the call.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::AnalyticsConfig;
use crate::storage::{ApplicationStatus, Collection, Predicate, ReadStore, StorageError};

use super::aggregation::AggregationEngine;
use super::views::{
    ActivityEntry, Bucket, DashboardView, GrowthStats, OverviewStats, TopStatsView, TrendPoint,
    TrendSeries, TrendType,
};
use super::window::{Period, TimeBucketer, TimeWindow, MAX_BUCKETS};

pub const RECENT_ACTIVITY_PER_KIND: u32 = 5;
pub const DEFAULT_TOP_LIMIT: usize = 10;
pub const MAX_TOP_LIMIT: usize = 50;
/// Trend buckets evaluated concurrently; output order is still bucket order.
const BUCKET_CONCURRENCY: usize = 4;

/// Period plus optional explicit bounds, as accepted by every analytics view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyticsFilter {
    pub period: Period,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl AnalyticsFilter {
    pub fn period(period: Period) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("invalid analytics request: {0}")]
    Validation(String),
    #[error("analytics stage '{stage}' failed: {source}")]
    Storage {
        stage: String,
        #[source]
        source: StorageError,
    },
    #[error("analytics request cancelled")]
    Cancelled,
}

pub struct AnalyticsService<S> {
    engine: AggregationEngine<S>,
    bucketer: TimeBucketer,
}

impl<S> AnalyticsService<S>
where
    S: ReadStore + 'static,
{
    pub fn new(store: Arc<S>, config: &AnalyticsConfig) -> Self {
        Self {
            engine: AggregationEngine::new(store),
            bucketer: TimeBucketer::new(config),
        }
    }

    pub fn engine(&self) -> &AggregationEngine<S> {
        &self.engine
    }

    pub fn bucketer(&self) -> &TimeBucketer {
        &self.bucketer
    }

    pub fn resolve(
        &self,
        filter: &AnalyticsFilter,
        now: DateTime<Utc>,
    ) -> Result<TimeWindow, AnalyticsError> {
        self.bucketer
            .resolve_window(filter.period, filter.date_from, filter.date_to, now)
    }

    pub async fn dashboard(
        &self,
        filter: &AnalyticsFilter,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<DashboardView, AnalyticsError> {
        let started = Instant::now();
        let window = self.resolve(filter, now)?;

        let (overview, growth, recent_activity, performance) = guarded(cancel, async {
            futures::try_join!(
                self.overview(),
                self.growth(&window),
                self.recent_activity(&window),
                self.engine.performance(&window),
            )
        })
        .await?;

        debug!(
            period = %filter.period,
            activity = recent_activity.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dashboard assembled"
        );

        Ok(DashboardView {
            period: filter.period,
            window,
            overview,
            growth,
            recent_activity,
            performance,
        })
    }

    /// Counts of `trend` per sub-window, oldest first. `limit` caps the bucket count.
    pub async fn trends(
        &self,
        trend: TrendType,
        filter: &AnalyticsFilter,
        limit: Option<usize>,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<TrendSeries, AnalyticsError> {
        let window = self.resolve(filter, now)?;
        let max_buckets = limit.map_or(MAX_BUCKETS, |limit| limit.clamp(1, MAX_BUCKETS));
        let windows = super::window::subdivide(&window, max_buckets);
        let metric = trend.label();

        let buckets: Vec<Bucket> = guarded(
            cancel,
            stream::iter(windows)
                .map(|bucket| async move {
                    // Checked per bucket so a cancelled request stops issuing queries.
                    if cancel.is_cancelled() {
                        return Err(AnalyticsError::Cancelled);
                    }
                    let value = self.trend_value(trend, &bucket).await?;
                    Ok(Bucket {
                        window: bucket,
                        metrics: BTreeMap::from([(metric.to_string(), value as f64)]),
                    })
                })
                .buffered(BUCKET_CONCURRENCY)
                .try_collect(),
        )
        .await?;

        let points: Vec<TrendPoint> = buckets.iter().map(|bucket| bucket.point(metric)).collect();
        debug!(trend = %trend, buckets = points.len(), "trend series assembled");

        Ok(TrendSeries {
            trend,
            period: filter.period,
            window,
            points,
        })
    }

    pub async fn top_stats(
        &self,
        filter: &AnalyticsFilter,
        limit: Option<usize>,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<TopStatsView, AnalyticsError> {
        let window = self.resolve(filter, now)?;
        let limit = limit.map_or(DEFAULT_TOP_LIMIT, |limit| limit.clamp(1, MAX_TOP_LIMIT));
        let engine = &self.engine;

        let (top_skills, top_locations, top_companies, top_job_types) = guarded(cancel, async {
            futures::try_join!(
                engine.group_by(Collection::Jobs, "skills", &window, limit),
                engine.group_by(Collection::Jobs, "location", &window, limit),
                engine.group_by(Collection::Jobs, "companyName", &window, limit),
                engine.group_by(Collection::Jobs, "jobType", &window, limit),
            )
        })
        .await?;

        Ok(TopStatsView {
            period: filter.period,
            window,
            top_skills,
            top_locations,
            top_companies,
            top_job_types,
        })
    }

    async fn overview(&self) -> Result<OverviewStats, AnalyticsError> {
        let engine = &self.engine;
        let active = Predicate::Flag {
            field: "isActive",
            value: true,
        };
        let (
            total_users,
            total_candidates,
            total_companies,
            total_jobs,
            active_jobs,
            total_applications,
        ) = futures::try_join!(
            engine.count_all(Collection::Users, None),
            engine.count_all(Collection::Candidates, None),
            engine.count_all(Collection::Companies, None),
            engine.count_all(Collection::Jobs, None),
            engine.count_all(Collection::Jobs, Some(active)),
            engine.count_all(Collection::Applications, None),
        )?;

        Ok(OverviewStats {
            total_users,
            total_candidates,
            total_companies,
            total_jobs,
            active_jobs,
            total_applications,
        })
    }

    async fn growth(&self, window: &TimeWindow) -> Result<GrowthStats, AnalyticsError> {
        let engine = &self.engine;
        let (users, jobs, applications, companies) = futures::try_join!(
            engine.growth(Collection::Users, window),
            engine.growth(Collection::Jobs, window),
            engine.growth(Collection::Applications, window),
            engine.growth(Collection::Companies, window),
        )?;
        Ok(GrowthStats {
            users,
            jobs,
            applications,
            companies,
        })
    }

    /// Newest first across kinds; equal timestamps keep job, application, company order.
    async fn recent_activity(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<ActivityEntry>, AnalyticsError> {
        let engine = &self.engine;
        let (jobs, applications, companies) = futures::try_join!(
            engine.recent(Collection::Jobs, window, RECENT_ACTIVITY_PER_KIND),
            engine.recent(Collection::Applications, window, RECENT_ACTIVITY_PER_KIND),
            engine.recent(Collection::Companies, window, RECENT_ACTIVITY_PER_KIND),
        )?;

        let mut entries: Vec<ActivityEntry> = jobs
            .into_iter()
            .chain(applications)
            .chain(companies)
            .filter_map(ActivityEntry::from_record)
            .collect();
        entries.sort_by(|left, right| right.at.cmp(&left.at));
        Ok(entries)
    }

    async fn trend_value(
        &self,
        trend: TrendType,
        bucket: &TimeWindow,
    ) -> Result<u64, AnalyticsError> {
        let extra = match trend {
            TrendType::Hires => Some(Predicate::Equals {
                field: "status",
                value: ApplicationStatus::Hired.label().to_string(),
            }),
            _ => None,
        };
        self.engine
            .count_between(trend.collection(), bucket, trend.timestamp_field(), extra)
            .await
    }
}

/// Races `work` against the caller's token and logs failures with their stage.
async fn guarded<T, F>(cancel: &CancellationToken, work: F) -> Result<T, AnalyticsError>
where
    F: Future<Output = Result<T, AnalyticsError>>,
{
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AnalyticsError::Cancelled),
        outcome = work => outcome,
    };
    if let Err(AnalyticsError::Storage { stage, source }) = &outcome {
        warn!(%stage, error = %source, "analytics aggregation failed");
    }
    outcome
}
