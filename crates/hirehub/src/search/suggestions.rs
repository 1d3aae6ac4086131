use std::collections::BTreeMap;

use crate::storage::{
    Collection, Document, FieldValue, PageRequest, Predicate, ReadStore, SortSpec,
};

use super::record::EntityKind;
use super::service::{SearchError, SearchService};

pub const MIN_SUGGESTION_PREFIX: usize = 2;
pub const DEFAULT_SUGGESTIONS: usize = 10;
pub const MAX_SUGGESTIONS: usize = 20;
/// Records scanned per collection for each suggestion requested, newest first.
pub const SUGGESTION_SCAN_FACTOR: usize = 10;

impl<S> SearchService<S>
where
    S: ReadStore + 'static,
{
    /// Type-ahead suggestions from active job titles, job skills, and company names.
    /// Prefix matches come first, then alphabetical order.
    pub async fn suggestions(
        &self,
        prefix: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>, SearchError> {
        let prefix = prefix.trim();
        if prefix.chars().count() < MIN_SUGGESTION_PREFIX {
            return Ok(Vec::new());
        }
        let limit = limit.map_or(DEFAULT_SUGGESTIONS, |limit| limit.clamp(1, MAX_SUGGESTIONS));
        let active = Predicate::Flag {
            field: "isActive",
            value: true,
        };
        let sort = [SortSpec::newest_first()];
        let scan = Some(PageRequest {
            page: 1,
            limit: (limit * SUGGESTION_SCAN_FACTOR) as u32,
        });

        let jobs = Predicate::and(vec![
            active.clone(),
            Predicate::any_text_contains(&["title", "skills"], prefix),
        ]);
        let companies = Predicate::and(vec![
            active,
            Predicate::Contains {
                field: "name",
                needle: prefix.to_string(),
            },
        ]);

        let (jobs, companies) = futures::try_join!(
            async {
                self.store
                    .find(Collection::Jobs, &jobs, &sort, scan)
                    .await
                    .map_err(|source| SearchError::Storage {
                        kind: EntityKind::Job,
                        source,
                    })
            },
            async {
                self.store
                    .find(Collection::Companies, &companies, &sort, scan)
                    .await
                    .map_err(|source| SearchError::Storage {
                        kind: EntityKind::Company,
                        source,
                    })
            },
        )?;

        let needle = prefix.to_lowercase();
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        let mut offer = |value: &str| {
            let value = value.trim();
            let key = value.to_lowercase();
            if !value.is_empty() && key.contains(&needle) {
                seen.entry(key).or_insert_with(|| value.to_string());
            }
        };

        for record in jobs.records.iter() {
            if let Some(FieldValue::Text(title)) = record.field("title") {
                offer(title);
            }
            if let Some(FieldValue::Tags(skills)) = record.field("skills") {
                skills.iter().for_each(|skill| offer(skill));
            }
        }
        for record in companies.records.iter() {
            if let Some(FieldValue::Text(name)) = record.field("name") {
                offer(name);
            }
        }

        let mut suggestions: Vec<(String, String)> = seen.into_iter().collect();
        // BTreeMap order is alphabetical; a stable sort lifts prefix matches to the front.
        suggestions.sort_by_key(|(key, _)| !key.starts_with(&needle));
        Ok(suggestions
            .into_iter()
            .take(limit)
            .map(|(_, value)| value)
            .collect())
    }
}
