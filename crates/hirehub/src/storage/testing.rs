//! Store doubles shared by unit tests across modules.

use async_trait::async_trait;

use super::{
    Collection, FindResult, GroupRow, InMemoryStore, PageRequest, Predicate, ReadStore,
    SortSpec, StorageError, StoredRecord,
};

/// Delegates to an in-memory store but fails every call against one collection.
pub(crate) struct FailingStore {
    pub(crate) inner: InMemoryStore,
    pub(crate) failing: Collection,
}

impl FailingStore {
    pub(crate) fn new(records: Vec<StoredRecord>, failing: Collection) -> Self {
        Self {
            inner: InMemoryStore::from_records(records),
            failing,
        }
    }

    fn check(&self, collection: Collection) -> Result<(), StorageError> {
        if collection == self.failing {
            return Err(StorageError::Unavailable(format!(
                "{} replica offline",
                collection.label()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ReadStore for FailingStore {
    async fn count(
        &self,
        collection: Collection,
        predicate: &Predicate,
    ) -> Result<u64, StorageError> {
        self.check(collection)?;
        self.inner.count(collection, predicate).await
    }

    async fn find(
        &self,
        collection: Collection,
        predicate: &Predicate,
        sort: &[SortSpec],
        page: Option<PageRequest>,
    ) -> Result<FindResult, StorageError> {
        self.check(collection)?;
        self.inner.find(collection, predicate, sort, page).await
    }

    async fn group_by(
        &self,
        collection: Collection,
        field: &'static str,
        predicate: &Predicate,
    ) -> Result<Vec<GroupRow>, StorageError> {
        self.check(collection)?;
        self.inner.group_by(collection, field, predicate).await
    }

    async fn average_span_days(
        &self,
        collection: Collection,
        start_field: &'static str,
        end_field: &'static str,
        predicate: &Predicate,
    ) -> Result<Option<f64>, StorageError> {
        self.check(collection)?;
        self.inner
            .average_span_days(collection, start_field, end_field, predicate)
            .await
    }
}

/// Never answers; used to observe cancellation.
pub(crate) struct StalledStore;

#[async_trait]
impl ReadStore for StalledStore {
    async fn count(&self, _: Collection, _: &Predicate) -> Result<u64, StorageError> {
        std::future::pending().await
    }

    async fn find(
        &self,
        _: Collection,
        _: &Predicate,
        _: &[SortSpec],
        _: Option<PageRequest>,
    ) -> Result<FindResult, StorageError> {
        std::future::pending().await
    }

    async fn group_by(
        &self,
        _: Collection,
        _: &'static str,
        _: &Predicate,
    ) -> Result<Vec<GroupRow>, StorageError> {
        std::future::pending().await
    }

    async fn average_span_days(
        &self,
        _: Collection,
        _: &'static str,
        _: &'static str,
        _: &Predicate,
    ) -> Result<Option<f64>, StorageError> {
        std::future::pending().await
    }
}
