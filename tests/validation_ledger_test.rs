//! Validation ledger: one current decision per report, the pending queue,
//! decision history filters and statistics.

mod common;

use chrono::{Duration, Utc};
use common::{date, operator, report_input, supervisor, TestApp};
use cutting_reports::{
    models::{Actor, Decision, ReportStatus},
    repositories::ValidationFilter,
    services::{analytics::DateWindow, reports::ReviewRequest},
};
use uuid::Uuid;

fn review(note: &str) -> ReviewRequest {
    ReviewRequest {
        note: note.to_string(),
        revision_items: vec![],
    }
}

fn around_today() -> DateWindow {
    let today = Utc::now().date_naive();
    DateWindow::new(today - Duration::days(1), today + Duration::days(1)).unwrap()
}

#[tokio::test]
async fn pending_queue_lists_submitted_reports_oldest_first() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;
    let ledger = &app.state.services.validations;

    let first = reports
        .create(report_input(date(2026, 10, 5)), true, &operator())
        .await
        .unwrap();
    let draft = reports
        .create(report_input(date(2026, 10, 1)), false, &operator())
        .await
        .unwrap();
    let second = reports.submit(draft.id, &operator()).await.unwrap();
    reports
        .create(report_input(date(2026, 10, 2)), false, &operator())
        .await
        .unwrap();

    let (pending, total) = ledger.pending(1, 20).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(pending[0].id, first.id);
    assert_eq!(pending[1].id, second.id);
    assert!(pending
        .iter()
        .all(|report| report.status == ReportStatus::Submitted));

    reports
        .approve(first.id, ReviewRequest::default(), &supervisor())
        .await
        .unwrap();
    let (pending, total) = ledger.pending(1, 20).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(pending[0].id, second.id);
}

#[tokio::test]
async fn a_report_keeps_only_its_latest_decision() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;
    let ledger = &app.state.services.validations;

    let report = reports
        .create(report_input(date(2026, 10, 1)), true, &operator())
        .await
        .unwrap();
    reports
        .request_revision(report.id, review("recount the pieces"), &supervisor())
        .await
        .unwrap();
    reports.submit(report.id, &operator()).await.unwrap();

    let second_supervisor = Actor::new(Uuid::from_u128(0xB002), "Rina Supervisor");
    reports
        .reject(report.id, review("wrong batch"), &second_supervisor)
        .await
        .unwrap();

    let current = ledger.current_decision(report.id).await.unwrap().unwrap();
    assert_eq!(current.decision, Decision::Rejected);
    assert_eq!(current.validator_name, "Rina Supervisor");
    assert_eq!(current.note, "wrong batch");

    let (history, total) = ledger
        .history(&ValidationFilter::default(), 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(history[0].record.report_id, report.id);
    assert_eq!(
        history[0].report.as_ref().map(|r| r.status),
        Some(ReportStatus::Rejected)
    );
}

#[tokio::test]
async fn history_filters_by_decision_validator_and_status() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;
    let ledger = &app.state.services.validations;

    let approved = reports
        .create(report_input(date(2026, 10, 1)), true, &operator())
        .await
        .unwrap();
    let rejected = reports
        .create(report_input(date(2026, 10, 2)), true, &operator())
        .await
        .unwrap();
    reports
        .approve(approved.id, ReviewRequest::default(), &supervisor())
        .await
        .unwrap();
    let other = Actor::new(Uuid::from_u128(0xB003), "Agus Supervisor");
    reports
        .reject(rejected.id, review("stains on the lay"), &other)
        .await
        .unwrap();

    let by_decision = ValidationFilter {
        decision: Some(Decision::Approved),
        ..Default::default()
    };
    let (rows, total) = ledger.history(&by_decision, 1, 20).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].record.report_id, approved.id);

    let by_validator = ValidationFilter {
        validator_id: Some(other.id),
        ..Default::default()
    };
    let (rows, _) = ledger.history(&by_validator, 1, 20).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.decision, Decision::Rejected);

    let by_status = ValidationFilter {
        report_status: Some(ReportStatus::Approved),
        ..Default::default()
    };
    let (rows, _) = ledger.history(&by_status, 1, 20).await.unwrap();
    assert_eq!(rows.len(), 1);

    let today = Utc::now().date_naive();
    let yesterday = ValidationFilter {
        date_from: Some(today - Duration::days(2)),
        date_to: Some(today - Duration::days(1)),
        ..Default::default()
    };
    let (_, total) = ledger.history(&yesterday, 1, 20).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn stats_count_decisions_taken_in_the_window() {
    let app = TestApp::new().await;
    let reports = &app.state.services.reports;
    let ledger = &app.state.services.validations;

    for day in 1..=4 {
        let report = reports
            .create(report_input(date(2026, 10, day)), true, &operator())
            .await
            .unwrap();
        match day {
            1 | 2 | 3 => reports
                .approve(report.id, ReviewRequest::default(), &supervisor())
                .await
                .map(|_| ())
                .unwrap(),
            _ => reports
                .reject(report.id, review("blade marks"), &supervisor())
                .await
                .map(|_| ())
                .unwrap(),
        }
    }

    let stats = ledger.stats(around_today()).await.unwrap();
    assert_eq!(stats.approved, 3);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.need_revision, 0);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.approval_rate, 75.0);

    let today = Utc::now().date_naive();
    let long_ago = DateWindow::new(today - Duration::days(400), today - Duration::days(300)).unwrap();
    let empty = ledger.stats(long_ago).await.unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.approval_rate, 0.0);
}
