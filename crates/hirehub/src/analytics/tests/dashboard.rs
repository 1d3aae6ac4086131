use super::common::*;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::analytics::{
    ActivityKind, AnalyticsError, AnalyticsFilter, AnalyticsService, GrowthRate, Period,
};
use crate::config::AnalyticsConfig;
use crate::storage::{Collection, StorageError};

fn week() -> AnalyticsFilter {
    AnalyticsFilter::period(Period::Week)
}

#[tokio::test]
async fn dashboard_reports_overview_totals_across_all_time() {
    let service = service_over(platform_fixture());
    let view = service
        .dashboard(&week(), now(), &CancellationToken::new())
        .await
        .expect("dashboard assembles");

    assert_eq!(view.overview.total_users, 4);
    assert_eq!(view.overview.total_candidates, 2);
    assert_eq!(view.overview.total_companies, 2);
    assert_eq!(view.overview.total_jobs, 4);
    assert_eq!(view.overview.active_jobs, 3);
    assert_eq!(view.overview.total_applications, 5);
    assert_eq!(view.window.from(), at(2024, 3, 8, 0));
    assert_eq!(view.window.to(), now());
}

#[tokio::test]
async fn dashboard_growth_compares_against_the_previous_week() {
    let service = service_over(platform_fixture());
    let view = service
        .dashboard(&week(), now(), &CancellationToken::new())
        .await
        .expect("dashboard assembles");

    assert_eq!(view.growth.users, GrowthRate::between(2, 1));
    assert_eq!(view.growth.users.percent, 100.0);
    assert_eq!(view.growth.jobs.current, 3);
    assert_eq!(view.growth.jobs.percent, 100.0);
    assert_eq!(view.growth.applications.percent, 300.0);
    assert_eq!(view.growth.companies.current, 1);
    assert_eq!(view.growth.companies.previous, 0);
}

#[tokio::test]
async fn dashboard_performance_uses_window_ratios() {
    let service = service_over(platform_fixture());
    let view = service
        .dashboard(&week(), now(), &CancellationToken::new())
        .await
        .expect("dashboard assembles");

    assert_eq!(view.performance.application_rate, 133.33);
    assert_eq!(view.performance.interview_rate, 50.0);
    assert_eq!(view.performance.hire_rate, 25.0);
    assert_eq!(view.performance.average_time_to_hire, 4.0);
}

#[tokio::test]
async fn recent_activity_is_newest_first_across_kinds() {
    let service = service_over(platform_fixture());
    let view = service
        .dashboard(&week(), now(), &CancellationToken::new())
        .await
        .expect("dashboard assembles");

    let ids: Vec<&str> = view
        .recent_activity
        .iter()
        .map(|entry| entry.id.as_str())
        .collect();
    assert_eq!(ids, vec!["j3", "a4", "a3", "j2", "a2", "a1", "j1", "acme"]);
    assert_eq!(view.recent_activity[0].kind, ActivityKind::Job);
    assert_eq!(view.recent_activity[0].label, "Data Analyst at Globex");
    assert_eq!(view.recent_activity[7].kind, ActivityKind::Company);
}

#[tokio::test]
async fn empty_platform_yields_zeroed_growth_and_ratios() {
    let service = service_over(Vec::new());
    let view = service
        .dashboard(&week(), now(), &CancellationToken::new())
        .await
        .expect("empty store is not an error");

    assert_eq!(
        view.growth.users,
        GrowthRate {
            current: 0,
            previous: 0,
            percent: 0.0
        }
    );
    assert_eq!(view.performance.application_rate, 0.0);
    assert_eq!(view.performance.average_time_to_hire, 0.0);
    assert!(view.recent_activity.is_empty());
}

#[tokio::test]
async fn any_failing_aggregate_fails_the_dashboard() {
    let store = FailingStore::new(platform_fixture(), Collection::Applications);
    let service = AnalyticsService::new(Arc::new(store), &AnalyticsConfig::default());
    let outcome = service
        .dashboard(&week(), now(), &CancellationToken::new())
        .await;

    assert!(matches!(
        outcome,
        Err(AnalyticsError::Storage {
            source: StorageError::Unavailable(_),
            ..
        })
    ));
}

#[tokio::test]
async fn top_stats_fail_when_jobs_are_unreadable() {
    let store = FailingStore::new(platform_fixture(), Collection::Jobs);
    let service = AnalyticsService::new(Arc::new(store), &AnalyticsConfig::default());
    let outcome = service
        .top_stats(&week(), None, now(), &CancellationToken::new())
        .await;

    match outcome {
        Err(AnalyticsError::Storage { stage, .. }) => assert!(stage.contains("jobs")),
        other => panic!("expected storage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_dashboard_stops_waiting() {
    let service = AnalyticsService::new(Arc::new(StalledStore), &AnalyticsConfig::default());
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        trigger.cancel();
    });

    let outcome = service.dashboard(&week(), now(), &token).await;
    assert!(matches!(outcome, Err(AnalyticsError::Cancelled)));
}

#[tokio::test]
async fn inverted_explicit_window_is_rejected() {
    let service = service_over(platform_fixture());
    let filter = AnalyticsFilter {
        period: Period::Month,
        date_from: Some(at(2024, 3, 10, 0)),
        date_to: Some(at(2024, 3, 1, 0)),
    };
    let outcome = service
        .dashboard(&filter, now(), &CancellationToken::new())
        .await;
    assert!(matches!(outcome, Err(AnalyticsError::Validation(_))));
}

#[tokio::test]
async fn top_stats_rank_by_count_then_key() {
    let service = service_over(platform_fixture());
    let top = service
        .top_stats(&week(), None, now(), &CancellationToken::new())
        .await
        .expect("top stats");

    let keys = |groups: &[crate::analytics::GroupCount]| {
        groups
            .iter()
            .map(|group| (group.key.clone(), group.count))
            .collect::<Vec<_>>()
    };
    assert_eq!(
        keys(&top.top_locations),
        vec![("Berlin".to_string(), 2), ("Lisbon".to_string(), 1)]
    );
    assert_eq!(
        keys(&top.top_companies),
        vec![("Acme".to_string(), 2), ("Globex".to_string(), 1)]
    );
    assert_eq!(
        top.top_job_types
            .iter()
            .map(|group| group.key.as_str())
            .collect::<Vec<_>>(),
        vec!["contract", "full_time", "part_time"]
    );
    assert_eq!(top.top_skills.len(), 5);
    assert_eq!(top.top_skills[0].key, "React");

    let limited = service
        .top_stats(&week(), Some(2), now(), &CancellationToken::new())
        .await
        .expect("top stats");
    assert_eq!(
        limited
            .top_skills
            .iter()
            .map(|group| group.key.as_str())
            .collect::<Vec<_>>(),
        vec!["React", "Rust"]
    );
}
