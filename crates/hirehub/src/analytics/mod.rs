//! Time-windowed analytics: period resolution, bucketing, aggregate counts and growth,
//! assembled into dashboard, trend and top-stats views.

pub mod aggregation;
pub mod assembler;
pub mod growth;
pub mod router;
pub mod views;
pub mod window;

#[cfg(test)]
mod tests;

pub use aggregation::{AggregationEngine, GroupCount};
pub use assembler::{AnalyticsError, AnalyticsFilter, AnalyticsService};
pub use growth::GrowthRate;
pub use router::{analytics_router, parse_instant, AnalyticsQuery};
pub use views::{
    ActivityEntry, ActivityKind, Bucket, DashboardView, GrowthStats, OverviewStats,
    PerformanceMetrics, TopStatsView, TrendPoint, TrendSeries, TrendType,
};
pub use window::{subdivide, Period, TimeBucketer, TimeWindow, MAX_BUCKETS};
