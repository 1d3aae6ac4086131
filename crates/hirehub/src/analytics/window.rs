use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::storage::Predicate;

use super::assembler::AnalyticsError;

/// Upper bound on the number of sub-windows a trend series is split into.
pub const MAX_BUCKETS: usize = 30;

/// Named reporting period, resolved against "now" into a concrete window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
    Quarter,
    Year,
    All,
}

impl Period {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Day,
            Self::Week,
            Self::Month,
            Self::Quarter,
            Self::Year,
            Self::All,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = AnalyticsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|period| period.label() == normalized)
            .ok_or_else(|| {
                AnalyticsError::Validation(format!(
                    "unknown period '{}'; expected one of day, week, month, quarter, year, all",
                    raw.trim()
                ))
            })
    }
}

/// Half-open `[from, to)` interval with `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, AnalyticsError> {
        if from >= to {
            return Err(AnalyticsError::Validation(format!(
                "window start {} must be before end {}",
                from.to_rfc3339(),
                to.to_rfc3339()
            )));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn length(&self) -> Duration {
        self.to - self.from
    }

    /// Window of equal length ending where this one starts.
    pub fn previous(&self) -> Self {
        Self {
            from: self.from - self.length(),
            to: self.from,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }

    /// Records whose `field` timestamp falls inside the window.
    pub fn predicate(&self, field: &'static str) -> Predicate {
        Predicate::TimeRange {
            field,
            from: self.from,
            to: self.to,
        }
    }

    pub fn created_within(&self) -> Predicate {
        self.predicate("createdAt")
    }
}

/// Resolves period keywords and splits windows into bounded trend buckets.
#[derive(Debug, Clone)]
pub struct TimeBucketer {
    platform_launch: DateTime<Utc>,
    max_buckets: usize,
}

impl Default for TimeBucketer {
    fn default() -> Self {
        Self::new(&AnalyticsConfig::default())
    }
}

impl TimeBucketer {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            platform_launch: config.platform_launch,
            max_buckets: MAX_BUCKETS,
        }
    }

    pub fn platform_launch(&self) -> DateTime<Utc> {
        self.platform_launch
    }

    pub fn max_buckets(&self) -> usize {
        self.max_buckets
    }

    /// Explicit bounds override the keyword: `from` replaces the period offset and
    /// `to` replaces `now`.
    pub fn resolve_window(
        &self,
        period: Period,
        explicit_from: Option<DateTime<Utc>>,
        explicit_to: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<TimeWindow, AnalyticsError> {
        let to = explicit_to.unwrap_or(now);
        let from = match explicit_from {
            Some(from) => from,
            None => self.period_start(period, to)?,
        };
        TimeWindow::new(from, to)
    }

    fn period_start(
        &self,
        period: Period,
        to: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, AnalyticsError> {
        let start = match period {
            Period::Day => to.checked_sub_signed(Duration::days(1)),
            Period::Week => to.checked_sub_signed(Duration::days(7)),
            Period::Month => to.checked_sub_months(Months::new(1)),
            Period::Quarter => to.checked_sub_months(Months::new(3)),
            Period::Year => to.checked_sub_months(Months::new(12)),
            Period::All => Some(self.platform_launch),
        };
        start.ok_or_else(|| {
            AnalyticsError::Validation(format!("period '{period}' is out of range"))
        })
    }

    pub fn subdivide(&self, window: &TimeWindow) -> Vec<TimeWindow> {
        subdivide(window, self.max_buckets)
    }
}

/// Splits `window` into at most `max_buckets` contiguous windows of whole days. The last
/// window is clipped to `window.to()`, so the union is exactly the input window.
pub fn subdivide(window: &TimeWindow, max_buckets: usize) -> Vec<TimeWindow> {
    let max_buckets = max_buckets.max(1) as i64;
    let seconds = window.length().num_seconds().max(1);
    let days = (seconds + 86_399) / 86_400;
    let interval_days = ((days + max_buckets - 1) / max_buckets).max(1);
    let interval = Duration::days(interval_days);

    let mut buckets = Vec::new();
    let mut start = window.from;
    while start < window.to {
        let end = start
            .checked_add_signed(interval)
            .map_or(window.to, |end| end.min(window.to));
        buckets.push(TimeWindow { from: start, to: end });
        start = end;
    }
    buckets
}
