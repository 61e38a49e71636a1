//! Analytics over approved reports stored in SQLite.

mod common;

use common::{
    date, operator, report_input, second_operator, supervisor, TestApp, CUSTOMER_A, MACHINE_A,
    MACHINE_B,
};
use cutting_reports::{
    models::{Actor, QualityRating},
    services::{
        analytics::{forecast::Confidence, scoring::Badge, DateWindow, RollupDimension},
        reports::{ReportInput, ReviewRequest},
    },
};

async fn approved(app: &TestApp, input: ReportInput, actor: &Actor) {
    let reports = &app.state.services.reports;
    let report = reports.create(input, true, actor).await.unwrap();
    reports
        .approve(report.id, ReviewRequest::default(), &supervisor())
        .await
        .unwrap();
}

/// Operator A on machine A for three days at 95%, operator B on machine B
/// once at 60%, plus a draft, a rejection and one approved report in the
/// preceding week.
async fn seed(app: &TestApp) {
    for day in 1..=3 {
        approved(app, report_input(date(2026, 10, day)), &operator()).await;
    }

    let mut slow = report_input(date(2026, 10, 2));
    slow.machine_id = MACHINE_B;
    slow.actual_quantity = 60;
    approved(app, slow, &second_operator()).await;

    let reports = &app.state.services.reports;
    reports
        .create(report_input(date(2026, 10, 4)), false, &operator())
        .await
        .unwrap();
    let rejected = reports
        .create(report_input(date(2026, 10, 5)), true, &operator())
        .await
        .unwrap();
    reports
        .reject(
            rejected.id,
            ReviewRequest {
                note: "wrong marker".into(),
                revision_items: vec![],
            },
            &supervisor(),
        )
        .await
        .unwrap();

    approved(app, report_input(date(2026, 9, 28)), &operator()).await;
}

fn first_week() -> DateWindow {
    DateWindow::new(date(2026, 10, 1), date(2026, 10, 7)).unwrap()
}

#[tokio::test]
async fn empty_window_yields_zeroed_views() {
    let app = TestApp::new().await;
    let analytics = &app.state.services.analytics;
    let window = DateWindow::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap();

    let overview = analytics.overview(window).await.unwrap();
    assert_eq!(overview.status_counts.total, 0);
    assert_eq!(overview.current.report_count, 0);
    assert_eq!(overview.current.average_efficiency, 0.0);
    assert_eq!(overview.growth.total_quantity, 0.0);
    assert_eq!(overview.previous_window.end, date(2024, 12, 31));

    assert!(analytics.daily_trend(window).await.unwrap().is_empty());
    assert!(analytics.leaderboard(window, None).await.unwrap().is_empty());

    let forecast = analytics.forecast(window).await.unwrap();
    assert_eq!(forecast.data_points, 0);
    assert_eq!(forecast.next_30_days, 0.0);

    let capacity = analytics.capacity(window).await.unwrap();
    assert_eq!(capacity.machine_count, 0);
    assert_eq!(capacity.utilization_percentage, 0.0);

    let quality = analytics.quality(window).await.unwrap();
    assert_eq!(quality.total_reports, 0);
    assert_eq!(quality.ratings.len(), 4);
    assert!(quality.ratings.iter().all(|bucket| bucket.percentage == 0.0));

    let bottlenecks = analytics.bottlenecks(window).await.unwrap();
    assert!(bottlenecks.low_efficiency_machines.is_empty());
}

#[tokio::test]
async fn overview_counts_only_approved_production() {
    let app = TestApp::new().await;
    seed(&app).await;

    let overview = app
        .state
        .services
        .analytics
        .overview(first_week())
        .await
        .unwrap();

    assert_eq!(overview.status_counts.approved, 4);
    assert_eq!(overview.status_counts.draft, 1);
    assert_eq!(overview.status_counts.rejected, 1);
    assert_eq!(overview.status_counts.total, 6);

    assert_eq!(overview.current.report_count, 4);
    assert_eq!(overview.current.total_quantity, 345);
    assert_eq!(overview.current.average_efficiency, 86.25);
    assert_eq!(overview.current.total_defects, 8);

    assert_eq!(overview.previous_window.start, date(2026, 9, 24));
    assert_eq!(overview.previous.report_count, 1);
    assert_eq!(overview.growth.report_count, 300.0);
    assert_eq!(overview.growth.total_quantity, 263.16);
}

#[tokio::test]
async fn trends_bucket_by_day_and_week() {
    let app = TestApp::new().await;
    seed(&app).await;
    let analytics = &app.state.services.analytics;

    let daily = analytics.daily_trend(first_week()).await.unwrap();
    assert_eq!(daily.len(), 3);
    assert_eq!(daily[1].bucket, "2026-10-02");
    assert_eq!(daily[1].report_count, 2);
    assert_eq!(daily[1].total_quantity, 155);
    assert_eq!(daily[1].average_efficiency, 77.5);

    let weekly = analytics.weekly_efficiency(first_week()).await.unwrap();
    let reports: u64 = weekly.iter().map(|point| point.report_count).sum();
    assert_eq!(reports, 4);
}

#[tokio::test]
async fn rollups_rank_by_primary_metric_with_labels() {
    let app = TestApp::new().await;
    seed(&app).await;
    let analytics = &app.state.services.analytics;

    let machines = analytics
        .rollup(first_week(), RollupDimension::Machine)
        .await
        .unwrap();
    assert_eq!(machines.len(), 2);
    assert_eq!(machines[0].entity_id, MACHINE_A);
    assert_eq!(machines[0].label, "Cutter 01");
    assert_eq!(machines[0].average_efficiency, 95.0);
    assert_eq!(machines[0].total_duration_minutes, 270);
    assert_eq!(machines[1].entity_id, MACHINE_B);

    let customers = analytics
        .rollup(first_week(), RollupDimension::Customer)
        .await
        .unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].entity_id, CUSTOMER_A);
    assert_eq!(customers[0].label, "Northwind Apparel");
    assert_eq!(customers[0].total_quantity, 345);

    let operators = analytics
        .rollup(first_week(), RollupDimension::Operator)
        .await
        .unwrap();
    assert_eq!(operators[0].label, "Sari Operator");
}

#[tokio::test]
async fn leaderboard_ranks_and_badges_operators() {
    let app = TestApp::new().await;
    seed(&app).await;
    let analytics = &app.state.services.analytics;

    let board = analytics.leaderboard(first_week(), None).await.unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].operator_id, operator().id);
    assert_eq!(board[0].rank, Some(1));
    assert_eq!(board[0].badge, Some(Badge::Gold));
    assert_eq!(board[1].operator_id, second_operator().id);
    assert_eq!(board[1].badge, Some(Badge::Silver));

    let top = analytics.leaderboard(first_week(), Some(1)).await.unwrap();
    assert_eq!(top.len(), 1);

    let cards = analytics.operator_scorecards(first_week()).await.unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].report_count, 3);
    assert_eq!(cards[0].efficiency_std_dev, 0.0);
}

#[tokio::test]
async fn capacity_bottlenecks_quality_and_forecast() {
    let app = TestApp::new().await;
    seed(&app).await;
    let analytics = &app.state.services.analytics;

    let capacity = analytics.capacity(first_week()).await.unwrap();
    assert_eq!(capacity.elapsed_days, 7);
    assert_eq!(capacity.machine_count, 2);
    assert_eq!(capacity.operational_hours, 6.0);
    assert_eq!(capacity.available_hours, 336.0);
    assert_eq!(capacity.utilization_percentage, 1.79);

    let bottlenecks = analytics.bottlenecks(first_week()).await.unwrap();
    assert_eq!(bottlenecks.low_efficiency_machines.len(), 1);
    assert_eq!(bottlenecks.low_efficiency_machines[0].entity_id, MACHINE_B);
    assert!(bottlenecks.high_defect_machines.is_empty());
    assert!(bottlenecks.low_efficiency_shifts.is_empty());

    let quality = analytics.quality(first_week()).await.unwrap();
    assert_eq!(quality.total_reports, 4);
    let good = quality
        .ratings
        .iter()
        .find(|bucket| bucket.rating == QualityRating::Good)
        .unwrap();
    assert_eq!(good.count, 4);
    assert_eq!(good.percentage, 100.0);
    assert_eq!(quality.defect_categories[0].category, "fraying");
    assert_eq!(quality.defect_categories[0].total_defects, 8);

    let forecast = analytics.forecast(first_week()).await.unwrap();
    assert_eq!(forecast.data_points, 3);
    assert_eq!(forecast.confidence, Confidence::Low);
    assert!(forecast.daily_estimate >= 0.0);
}

#[tokio::test]
async fn dashboard_matches_individual_views() {
    let app = TestApp::new().await;
    seed(&app).await;
    let analytics = &app.state.services.analytics;

    let dashboard = analytics.dashboard(first_week()).await.unwrap();
    let overview = analytics.overview(first_week()).await.unwrap();

    assert_eq!(dashboard.overview, overview);
    assert_eq!(dashboard.daily_trend.len(), 3);
    assert_eq!(dashboard.top_machines[0].entity_id, MACHINE_A);
    assert_eq!(dashboard.consistency.sample_count, 4);
    assert_eq!(dashboard.bottlenecks.low_efficiency_machines.len(), 1);
}
