use chrono::{DateTime, Utc};
use hirehub::analytics::{self, Period, TrendType};
use hirehub::error::AppError;
use hirehub::search::EntityKind;
use hirehub::storage::{InMemoryStore, StoredRecord};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

use crate::demo::demo_records;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    analytics::parse_instant(raw).map_err(|err| err.to_string())
}

pub(crate) fn parse_kind(raw: &str) -> Result<EntityKind, String> {
    EntityKind::parse(raw).ok_or_else(|| format!("unknown entity kind '{raw}'"))
}

pub(crate) fn parse_period(raw: &str) -> Result<Period, String> {
    raw.parse::<Period>().map_err(|err| err.to_string())
}

pub(crate) fn parse_trend(raw: &str) -> Result<TrendType, String> {
    raw.parse::<TrendType>().map_err(|err| err.to_string())
}

/// Seeds the in-memory read model from a JSON array of tagged records, or from the
/// built-in demo data when no file is given.
pub(crate) fn load_store(
    fixtures: Option<&Path>,
    now: DateTime<Utc>,
) -> Result<InMemoryStore, AppError> {
    let records = match fixtures {
        Some(path) => read_fixtures(path)?,
        None => demo_records(now),
    };
    info!(records = records.len(), "read model seeded");
    Ok(InMemoryStore::from_records(records))
}

fn read_fixtures(path: &Path) -> Result<Vec<StoredRecord>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} is not a valid fixture file: {err}", path.display()),
        ))
    })
}
