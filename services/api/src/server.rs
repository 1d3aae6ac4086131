use crate::cli::ServeArgs;
use crate::infra::{load_store, AppState};
use crate::routes::with_platform_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use hirehub::analytics::AnalyticsService;
use hirehub::config::AppConfig;
use hirehub::error::AppError;
use hirehub::search::SearchService;
use hirehub::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(load_store(args.fixtures.as_deref(), Utc::now())?);
    let search = Arc::new(SearchService::new(Arc::clone(&store), &config.search));
    let analytics = Arc::new(AnalyticsService::new(store, &config.analytics));

    let app = with_platform_routes(search, analytics)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "search and analytics service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
