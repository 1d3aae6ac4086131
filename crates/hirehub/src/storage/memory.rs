use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{json, Map};
use tracing::warn;

use super::records::{Document, FieldValue, StoredRecord};
use super::{
    Collection, FindResult, GroupRow, PageRequest, Predicate, ReadStore, SortOrder, SortSpec,
    StorageError,
};

/// Insertion-ordered in-memory read model.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<StoredRecord>>>>,
}

impl InMemoryStore {
    pub fn from_records(records: impl IntoIterator<Item = StoredRecord>) -> Self {
        let store = Self::default();
        store.extend(records);
        store
    }

    pub fn insert(&self, record: StoredRecord) {
        self.extend(std::iter::once(record));
    }

    pub fn extend(&self, records: impl IntoIterator<Item = StoredRecord>) {
        let mut guard = match self.collections.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for record in records {
            guard.entry(record.collection()).or_default().push(record);
        }
    }

    pub fn record_count(&self, collection: Collection) -> usize {
        self.snapshot(collection).map(|records| records.len()).unwrap_or(0)
    }

    fn snapshot(&self, collection: Collection) -> Result<Vec<StoredRecord>, StorageError> {
        let guard = self
            .collections
            .read()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(guard.get(&collection).cloned().unwrap_or_default())
    }

    fn matching(
        &self,
        collection: Collection,
        predicate: &Predicate,
    ) -> Result<Vec<StoredRecord>, StorageError> {
        Ok(self
            .snapshot(collection)?
            .into_iter()
            .filter(|record| predicate.matches(record))
            .collect())
    }
}

#[async_trait]
impl ReadStore for InMemoryStore {
    async fn count(
        &self,
        collection: Collection,
        predicate: &Predicate,
    ) -> Result<u64, StorageError> {
        Ok(self.matching(collection, predicate)?.len() as u64)
    }

    async fn find(
        &self,
        collection: Collection,
        predicate: &Predicate,
        sort: &[SortSpec],
        page: Option<PageRequest>,
    ) -> Result<FindResult, StorageError> {
        let mut records = self.matching(collection, predicate)?;
        let total = records.len() as u64;

        if !sort.is_empty() {
            records.sort_by(|left, right| compare_by(left, right, sort));
        }

        let records = match page {
            Some(page) if page.limit == 0 => {
                return Err(StorageError::InvalidQuery("page limit must be positive".to_string()))
            }
            Some(page) => records
                .into_iter()
                .skip(page.offset())
                .take(page.limit as usize)
                .collect(),
            None => records,
        };

        Ok(FindResult { records, total })
    }

    async fn group_by(
        &self,
        collection: Collection,
        field: &'static str,
        predicate: &Predicate,
    ) -> Result<Vec<GroupRow>, StorageError> {
        let mut counts: BTreeMap<String, (String, u64)> = BTreeMap::new();
        for record in self.matching(collection, predicate)? {
            let keys: Vec<String> = match record.field(field) {
                Some(FieldValue::Text(text)) if !text.trim().is_empty() => {
                    vec![text.trim().to_string()]
                }
                Some(FieldValue::Tags(tags)) => tags
                    .iter()
                    .map(|tag| tag.trim().to_string())
                    .filter(|tag| !tag.is_empty())
                    .collect(),
                Some(FieldValue::Flag(flag)) => vec![flag.to_string()],
                Some(FieldValue::Number(number)) => vec![number.to_string()],
                _ => Vec::new(),
            };
            for key in keys {
                let entry = counts
                    .entry(key.to_lowercase())
                    .or_insert_with(|| (key.clone(), 0));
                entry.1 += 1;
            }
        }

        Ok(counts
            .into_values()
            .map(|(key, count)| {
                let mut row = Map::new();
                row.insert("_id".to_string(), json!(key));
                row.insert("count".to_string(), json!(count));
                row
            })
            .collect())
    }

    async fn average_span_days(
        &self,
        collection: Collection,
        start_field: &'static str,
        end_field: &'static str,
        predicate: &Predicate,
    ) -> Result<Option<f64>, StorageError> {
        let (spans, inverted): (Vec<f64>, Vec<f64>) = self
            .matching(collection, predicate)?
            .iter()
            .filter_map(|record| {
                match (record.field(start_field), record.field(end_field)) {
                    (Some(FieldValue::Timestamp(start)), Some(FieldValue::Timestamp(end))) => {
                        Some((end - start).num_seconds() as f64 / 86_400.0)
                    }
                    _ => None,
                }
            })
            .partition(|span| *span >= 0.0);

        // An end before its start is bad data, not a negative duration.
        if !inverted.is_empty() {
            warn!(
                collection = collection.label(),
                start_field,
                end_field,
                skipped = inverted.len(),
                "ignoring spans that end before they start"
            );
        }

        if spans.is_empty() {
            return Ok(None);
        }
        Ok(Some(spans.iter().sum::<f64>() / spans.len() as f64))
    }
}

fn compare_by(left: &StoredRecord, right: &StoredRecord, sort: &[SortSpec]) -> Ordering {
    for spec in sort {
        let ordering = compare_values(left.field(spec.field), right.field(spec.field));
        let ordering = match spec.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// Missing values sort after present ones in ascending order.
fn compare_values(left: Option<FieldValue<'_>>, right: Option<FieldValue<'_>>) -> Ordering {
    match (left, right) {
        (Some(FieldValue::Text(a)), Some(FieldValue::Text(b))) => {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
        (Some(FieldValue::Number(a)), Some(FieldValue::Number(b))) => {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(FieldValue::Flag(a)), Some(FieldValue::Flag(b))) => a.cmp(&b),
        (Some(FieldValue::Timestamp(a)), Some(FieldValue::Timestamp(b))) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::records::{JobRecord, JobType, ExperienceLevel};
    use chrono::{Duration, TimeZone, Utc};

    fn job(id: &str, title: &str, days_ago: i64, skills: &[&str]) -> StoredRecord {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let at = now - Duration::days(days_ago);
        StoredRecord::Job(JobRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            company_id: "co-1".to_string(),
            company_name: "Acme".to_string(),
            location: "Remote".to_string(),
            job_type: JobType::FullTime,
            experience_level: ExperienceLevel::Mid,
            salary_min: None,
            salary_max: None,
            skills: skills.iter().map(|skill| skill.to_string()).collect(),
            is_remote: true,
            is_featured: false,
            is_active: true,
            created_at: at,
            updated_at: at,
        })
    }

    #[tokio::test]
    async fn find_pages_after_sorting_and_reports_full_total() {
        let store = InMemoryStore::from_records(vec![
            job("j-1", "Oldest", 9, &[]),
            job("j-2", "Newest", 1, &[]),
            job("j-3", "Middle", 5, &[]),
        ]);

        let result = store
            .find(
                Collection::Jobs,
                &Predicate::All,
                &[SortSpec::newest_first()],
                Some(PageRequest { page: 2, limit: 2 }),
            )
            .await
            .expect("find succeeds");

        assert_eq!(result.total, 3);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].id(), "j-1");
    }

    #[tokio::test]
    async fn group_by_unwinds_tags_case_insensitively() {
        let store = InMemoryStore::from_records(vec![
            job("j-1", "A", 1, &["Rust", "SQL"]),
            job("j-2", "B", 1, &["rust"]),
        ]);

        let rows = store
            .group_by(Collection::Jobs, "skills", &Predicate::All)
            .await
            .expect("group by succeeds");

        let rust = rows
            .iter()
            .find(|row| row["_id"] == json!("Rust"))
            .expect("rust bucket");
        assert_eq!(rust["count"], json!(2));
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn average_span_skips_inverted_spans() {
        use crate::storage::records::{ApplicationRecord, ApplicationStatus};

        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let hire = |id: &str, hired_after: i64| {
            StoredRecord::Application(ApplicationRecord {
                id: id.to_string(),
                job_id: "j-1".to_string(),
                candidate_id: "c-1".to_string(),
                company_id: "co-1".to_string(),
                status: ApplicationStatus::Hired,
                created_at: created,
                interviewed_at: None,
                hired_at: Some(created + Duration::days(hired_after)),
            })
        };
        let store = InMemoryStore::from_records(vec![hire("a-1", 4), hire("a-2", 8), hire("a-3", -30)]);

        let average = store
            .average_span_days(Collection::Applications, "createdAt", "hiredAt", &Predicate::All)
            .await
            .expect("average succeeds");
        assert_eq!(average, Some(6.0));

        let only_inverted = InMemoryStore::from_records(vec![hire("a-4", -1)]);
        let average = only_inverted
            .average_span_days(Collection::Applications, "createdAt", "hiredAt", &Predicate::All)
            .await
            .expect("average succeeds");
        assert_eq!(average, None);
    }

    #[tokio::test]
    async fn zero_limit_is_rejected() {
        let store = InMemoryStore::default();
        let err = store
            .find(
                Collection::Jobs,
                &Predicate::All,
                &[],
                Some(PageRequest { page: 1, limit: 0 }),
            )
            .await
            .expect_err("zero limit rejected");
        assert!(matches!(err, StorageError::InvalidQuery(_)));
    }
}
