use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::storage::{
    ApplicationStatus, Collection, GroupRow, PageRequest, Predicate, ReadStore, SortSpec,
    StorageError, StoredRecord,
};

use super::assembler::AnalyticsError;
use super::growth::{percentage, round2, GrowthRate};
use super::views::PerformanceMetrics;
use super::window::TimeWindow;

/// Typed group-by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

impl GroupCount {
    pub fn from_row(row: &GroupRow) -> Result<Self, StorageError> {
        let key = match row.get("_id") {
            Some(Value::String(key)) => key.clone(),
            Some(Value::Number(key)) => key.to_string(),
            Some(Value::Bool(key)) => key.to_string(),
            other => {
                return Err(StorageError::MalformedRow(format!(
                    "group key must be a scalar, got {other:?}"
                )))
            }
        };
        let count = row
            .get("count")
            .and_then(Value::as_i64)
            .ok_or_else(|| StorageError::MalformedRow(format!("group '{key}' has no count")))?;
        Ok(Self { key, count })
    }
}

/// Statuses that imply the applicant reached the interview stage.
const INTERVIEWED: [ApplicationStatus; 3] = [
    ApplicationStatus::Interview,
    ApplicationStatus::Offered,
    ApplicationStatus::Hired,
];

fn status_is(status: ApplicationStatus) -> Predicate {
    Predicate::Equals {
        field: "status",
        value: status.label().to_string(),
    }
}

fn storage_stage(stage: String) -> impl FnOnce(StorageError) -> AnalyticsError {
    move |source| AnalyticsError::Storage { stage, source }
}

/// Pushes every metric down to the store as a single aggregate query.
pub struct AggregationEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for AggregationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> AggregationEngine<S>
where
    S: ReadStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn count_all(
        &self,
        collection: Collection,
        extra: Option<Predicate>,
    ) -> Result<u64, AnalyticsError> {
        let predicate = extra.unwrap_or(Predicate::All);
        self.store
            .count(collection, &predicate)
            .await
            .map_err(storage_stage(format!("count {}", collection.label())))
    }

    /// Records created inside `window`, optionally narrowed by `extra`.
    pub async fn count_in_window(
        &self,
        collection: Collection,
        window: &TimeWindow,
        extra: Option<Predicate>,
    ) -> Result<u64, AnalyticsError> {
        self.count_between(collection, window, "createdAt", extra)
            .await
    }

    /// Records whose `field` timestamp falls inside `window`.
    pub async fn count_between(
        &self,
        collection: Collection,
        window: &TimeWindow,
        field: &'static str,
        extra: Option<Predicate>,
    ) -> Result<u64, AnalyticsError> {
        let mut terms = vec![window.predicate(field)];
        terms.extend(extra);
        self.store
            .count(collection, &Predicate::and(terms))
            .await
            .map_err(storage_stage(format!(
                "count {} by {field}",
                collection.label()
            )))
    }

    /// Top `top_n` values of `field` over records created in `window`, by count
    /// descending then key ascending.
    pub async fn group_by(
        &self,
        collection: Collection,
        field: &'static str,
        window: &TimeWindow,
        top_n: usize,
    ) -> Result<Vec<GroupCount>, AnalyticsError> {
        let stage = format!("group {} by {field}", collection.label());
        let rows = self
            .store
            .group_by(collection, field, &window.created_within())
            .await
            .map_err(storage_stage(stage.clone()))?;

        let mut groups = rows
            .iter()
            .map(GroupCount::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_stage(stage))?;
        groups.sort_by(|left, right| {
            right
                .count
                .cmp(&left.count)
                .then_with(|| left.key.cmp(&right.key))
        });
        groups.truncate(top_n);
        Ok(groups)
    }

    pub async fn growth(
        &self,
        collection: Collection,
        window: &TimeWindow,
    ) -> Result<GrowthRate, AnalyticsError> {
        let previous = window.previous();
        let (current, previous) = futures::try_join!(
            self.count_in_window(collection, window, None),
            self.count_in_window(collection, &previous, None),
        )?;
        Ok(GrowthRate::between(current, previous))
    }

    /// Mean days from application to hire over hires created in `window`; zero when
    /// nobody was hired.
    pub async fn average_time_to_hire(&self, window: &TimeWindow) -> Result<f64, AnalyticsError> {
        let predicate = Predicate::and(vec![
            window.created_within(),
            status_is(ApplicationStatus::Hired),
        ]);
        let average = self
            .store
            .average_span_days(Collection::Applications, "createdAt", "hiredAt", &predicate)
            .await
            .map_err(storage_stage("average time to hire".to_string()))?;
        Ok(average.map_or(0.0, round2))
    }

    pub async fn performance(
        &self,
        window: &TimeWindow,
    ) -> Result<PerformanceMetrics, AnalyticsError> {
        let interviewed = Predicate::AnyOf {
            field: "status",
            values: INTERVIEWED
                .iter()
                .map(|status| status.label().to_string())
                .collect(),
        };
        let (jobs, applications, interviews, hires, average_time_to_hire) = futures::try_join!(
            self.count_in_window(Collection::Jobs, window, None),
            self.count_in_window(Collection::Applications, window, None),
            self.count_in_window(Collection::Applications, window, Some(interviewed)),
            self.count_in_window(
                Collection::Applications,
                window,
                Some(status_is(ApplicationStatus::Hired))
            ),
            self.average_time_to_hire(window),
        )?;

        Ok(PerformanceMetrics {
            application_rate: percentage(applications, jobs),
            interview_rate: percentage(interviews, applications),
            hire_rate: percentage(hires, applications),
            average_time_to_hire,
        })
    }

    /// Newest `limit` records created in `window`.
    pub async fn recent(
        &self,
        collection: Collection,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<StoredRecord>, AnalyticsError> {
        let page = PageRequest { page: 1, limit };
        self.store
            .find(
                collection,
                &window.created_within(),
                &[SortSpec::newest_first()],
                Some(page),
            )
            .await
            .map(|found| found.records)
            .map_err(storage_stage(format!("recent {}", collection.label())))
    }
}
