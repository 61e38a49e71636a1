//! HTTP-level tests: routing, actor headers, status codes and response envelopes.

mod common;

use axum::http::{header, Method, StatusCode};
use common::{
    date, operator, report_input, response_json, response_text, supervisor, TestApp,
};
use serde_json::{json, Value};

fn create_body(production_date: chrono::NaiveDate, submit: bool) -> Value {
    let mut body = serde_json::to_value(report_input(production_date)).unwrap();
    body["submit"] = json!(submit);
    body
}

#[tokio::test]
async fn health_endpoints_report_up() {
    let app = TestApp::new().await;

    let live = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(live.status(), StatusCode::OK);
    let body = response_json(live).await;
    assert_eq!(body["status"], "up");

    let ready = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(ready.status(), StatusCode::OK);
    let body = response_json(ready).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["database"]["status"], "up");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = response_json(response).await;
    assert!(doc["paths"]["/api/v1/reports"].is_object());
}

#[tokio::test]
async fn writes_require_actor_headers() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/reports",
            Some(create_body(date(2026, 10, 1), false)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn create_and_fetch_report() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/reports",
            Some(create_body(date(2026, 10, 1), false)),
            Some(&operator()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(body["data"]["total_yard"], 16.4);
    assert_eq!(body["data"]["efficiency_percentage"], 95.0);
    assert_eq!(body["data"]["duration_minutes"], 90);
    assert!(body["meta"]["request_id"].is_string());

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let response = app
        .request(Method::GET, &format!("/api/v1/reports/{}", id), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["operator_name"], "Sari Operator");
    assert_eq!(body["data"]["labels"]["machine"], "Cutter 01");
    assert_eq!(body["data"]["details"].as_array().unwrap().len(), 1);
    assert!(body["data"]["validation"].is_null());
}

#[tokio::test]
async fn invalid_fields_come_back_per_field() {
    let app = TestApp::new().await;
    let mut body = create_body(date(2026, 10, 1), false);
    body["target_quantity"] = json!(-5);
    body["humidity_pct"] = json!(120.0);
    body["details"][0]["piece_count"] = json!(-1);

    let response = app
        .request(Method::POST, "/api/v1/reports", Some(body), Some(&operator()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["details"]["target_quantity"].is_array());
    assert!(body["details"]["humidity_pct"].is_array());
    assert!(body["details"]["details[0].piece_count"].is_array());
}

#[tokio::test]
async fn review_flow_over_http() {
    let app = TestApp::new().await;

    let created = response_json(
        app.request(
            Method::POST,
            "/api/v1/reports",
            Some(create_body(date(2026, 10, 1), true)),
            Some(&operator()),
        )
        .await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let pending = response_json(
        app.request(Method::GET, "/api/v1/validations/pending", None, None)
            .await,
    )
    .await;
    assert_eq!(pending["data"]["pagination"]["total"], 1);

    let missing_note = app
        .request(
            Method::POST,
            &format!("/api/v1/reports/{}/reject", id),
            Some(json!({ "note": "" })),
            Some(&supervisor()),
        )
        .await;
    assert_eq!(missing_note.status(), StatusCode::BAD_REQUEST);
    let body = response_json(missing_note).await;
    assert!(body["details"]["note"].is_array());

    let rejected = app
        .request(
            Method::POST,
            &format!("/api/v1/reports/{}/reject", id),
            Some(json!({ "note": "marker does not match the order" })),
            Some(&supervisor()),
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::OK);
    let body = response_json(rejected).await;
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["validation"]["decision"], "rejected");

    let approve = app
        .request(
            Method::POST,
            &format!("/api/v1/reports/{}/approve", id),
            None,
            Some(&supervisor()),
        )
        .await;
    assert_eq!(approve.status(), StatusCode::CONFLICT);

    let decision = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/validations/report/{}", id),
            None,
            None,
        )
        .await,
    )
    .await;
    assert_eq!(decision["data"]["validator_name"], "Dewi Supervisor");
}

#[tokio::test]
async fn approve_accepts_an_empty_body() {
    let app = TestApp::new().await;
    let created = response_json(
        app.request(
            Method::POST,
            "/api/v1/reports",
            Some(create_body(date(2026, 10, 1), true)),
            Some(&operator()),
        )
        .await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/reports/{}/approve", id),
            None,
            Some(&supervisor()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "approved");
}

#[tokio::test]
async fn stale_update_is_a_conflict_and_delete_returns_no_content() {
    let app = TestApp::new().await;
    let created = response_json(
        app.request(
            Method::POST,
            "/api/v1/reports",
            Some(create_body(date(2026, 10, 1), false)),
            Some(&operator()),
        )
        .await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let mut update = serde_json::to_value(report_input(date(2026, 10, 1))).unwrap();
    update["expected_version"] = json!(7);
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/reports/{}", id),
            Some(update),
            Some(&operator()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/reports/{}", id),
            None,
            Some(&operator()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, &format!("/api/v1/reports/{}", id), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_filters_and_pagination() {
    let app = TestApp::new().await;
    for day in 1..=3 {
        app.request(
            Method::POST,
            "/api/v1/reports",
            Some(create_body(date(2026, 10, day), day == 2)),
            Some(&operator()),
        )
        .await;
    }

    let body = response_json(
        app.request(
            Method::GET,
            "/api/v1/reports?per_page=2&page=1",
            None,
            None,
        )
        .await,
    )
    .await;
    assert_eq!(body["data"]["pagination"]["total"], 3);
    assert_eq!(body["data"]["pagination"]["total_pages"], 2);
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 2);

    let body = response_json(
        app.request(Method::GET, "/api/v1/reports?status=submitted", None, None)
            .await,
    )
    .await;
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let response = app
        .request(
            Method::GET,
            "/api/v1/reports?date_from=2026-10-03&date_to=2026-10-01",
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_exports_are_attachments() {
    let app = TestApp::new().await;
    app.request(
        Method::POST,
        "/api/v1/reports",
        Some(create_body(date(2026, 10, 1), false)),
        Some(&operator()),
    )
    .await;

    let response = app
        .request(Method::GET, "/api/v1/reports/export", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.starts_with("attachment;"));
    let text = response_text(response).await;
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("Order Number,Batch Number"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("PO-2026-118,B-07,2026-10-01,Sari Operator,Morning,Cutter 01"));
    assert!(row.contains("95.00"));

    let response = app
        .request(Method::GET, "/api/v1/validations/export", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn exports_spanning_several_pages_arrive_complete() {
    let app = TestApp::with_config(|cfg| cfg.export_batch_size = 2).await;

    let mut ids = Vec::new();
    for batch in 1..=5 {
        let mut body = create_body(date(2026, 10, 1), true);
        body["batch_number"] = json!(format!("B-{:02}", batch));
        let created = response_json(
            app.request(Method::POST, "/api/v1/reports", Some(body), Some(&operator()))
                .await,
        )
        .await;
        ids.push(created["data"]["id"].as_str().unwrap().to_string());
    }
    for id in ids.iter().take(3) {
        let response = app
            .request(
                Method::POST,
                &format!("/api/v1/reports/{}/approve", id),
                None,
                Some(&supervisor()),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .request(Method::GET, "/api/v1/reports/export", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = response_text(response).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("Order Number,Batch Number"));
    for batch in 1..=5 {
        let needle = format!("PO-2026-118,B-{:02},", batch);
        assert_eq!(lines.iter().filter(|l| l.starts_with(&needle)).count(), 1);
    }

    let response = app
        .request(Method::GET, "/api/v1/validations/export", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = response_text(response).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1..].iter().all(|l| l.contains("approved")));
}

#[tokio::test]
async fn reject_and_revision_without_body_ask_for_a_note() {
    let app = TestApp::new().await;
    let created = response_json(
        app.request(
            Method::POST,
            "/api/v1/reports",
            Some(create_body(date(2026, 10, 1), true)),
            Some(&operator()),
        )
        .await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    for action in ["reject", "request-revision"] {
        let response = app
            .request(
                Method::POST,
                &format!("/api/v1/reports/{}/{}", id, action),
                None,
                Some(&supervisor()),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{action}");
        let body = response_json(response).await;
        assert!(body["details"]["note"].is_array(), "{action}");
    }

    let report = response_json(
        app.request(Method::GET, &format!("/api/v1/reports/{}", id), None, None)
            .await,
    )
    .await;
    assert_eq!(report["data"]["status"], "submitted");
}

#[tokio::test]
async fn analytics_windows_are_validated() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/analytics/overview?start_date=2026-10-01&end_date=2026-10-07",
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["window"]["start"], "2026-10-01");
    assert_eq!(body["data"]["previous_window"]["end"], "2026-09-30");

    let inverted = app
        .request(
            Method::GET,
            "/api/v1/analytics/dashboard?start_date=2026-10-07&end_date=2026-10-01",
            None,
            None,
        )
        .await;
    assert_eq!(inverted.status(), StatusCode::BAD_REQUEST);

    let bad_limit = app
        .request(Method::GET, "/api/v1/analytics/leaderboard?limit=0", None, None)
        .await;
    assert_eq!(bad_limit.status(), StatusCode::BAD_REQUEST);

    let stats = app
        .request(Method::GET, "/api/v1/validations/stats?days=7", None, None)
        .await;
    assert_eq!(stats.status(), StatusCode::OK);
}
