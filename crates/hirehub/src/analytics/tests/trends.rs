use super::common::*;

use tokio_util::sync::CancellationToken;

use crate::analytics::{AnalyticsError, AnalyticsFilter, Period, TrendType};

#[tokio::test]
async fn weekly_user_trend_has_one_point_per_day_in_order() {
    let service = service_over(platform_fixture());
    let series = service
        .trends(
            TrendType::Users,
            &AnalyticsFilter::period(Period::Week),
            None,
            now(),
            &CancellationToken::new(),
        )
        .await
        .expect("trend assembles");

    let values: Vec<f64> = series.points.iter().map(|point| point.value).collect();
    assert_eq!(values, vec![0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
    assert_eq!(series.points[0].label, "2024-03-08");
    assert_eq!(series.points[6].date, at(2024, 3, 14, 0));
    assert!(series
        .points
        .windows(2)
        .all(|pair| pair[0].date < pair[1].date));
}

#[tokio::test]
async fn limit_caps_the_bucket_count() {
    let service = service_over(platform_fixture());
    let series = service
        .trends(
            TrendType::Users,
            &AnalyticsFilter::period(Period::Week),
            Some(3),
            now(),
            &CancellationToken::new(),
        )
        .await
        .expect("trend assembles");

    let values: Vec<f64> = series.points.iter().map(|point| point.value).collect();
    assert_eq!(values, vec![1.0, 1.0, 0.0]);
}

#[tokio::test]
async fn hires_are_bucketed_by_hire_date() {
    let service = service_over(platform_fixture());
    let series = service
        .trends(
            TrendType::Hires,
            &AnalyticsFilter::period(Period::Month),
            Some(500),
            now(),
            &CancellationToken::new(),
        )
        .await
        .expect("trend assembles");

    assert_eq!(series.points.len(), 29);
    assert_eq!(series.points[0].label, "2024-02-15");
    let total: f64 = series.points.iter().map(|point| point.value).sum();
    assert_eq!(total, 2.0);
}

#[tokio::test]
async fn all_time_trend_stays_within_the_bucket_bound() {
    let service = service_over(platform_fixture());
    let series = service
        .trends(
            TrendType::Jobs,
            &AnalyticsFilter::period(Period::All),
            None,
            now(),
            &CancellationToken::new(),
        )
        .await
        .expect("trend assembles");

    assert!(series.points.len() <= 30);
    let total: f64 = series.points.iter().map(|point| point.value).sum();
    assert_eq!(total, 4.0);
}

#[tokio::test]
async fn cancelled_trend_returns_cancelled() {
    let service = service_over(platform_fixture());
    let token = CancellationToken::new();
    token.cancel();

    let outcome = service
        .trends(
            TrendType::Jobs,
            &AnalyticsFilter::period(Period::Year),
            None,
            now(),
            &token,
        )
        .await;
    assert!(matches!(outcome, Err(AnalyticsError::Cancelled)));
}

#[test]
fn unknown_trend_type_is_a_validation_error() {
    assert_eq!("Hires".parse::<TrendType>().unwrap(), TrendType::Hires);
    assert!(matches!(
        "visits".parse::<TrendType>(),
        Err(AnalyticsError::Validation(_))
    ));
}
