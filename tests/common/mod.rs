#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use cutting_reports::{
    build_router,
    config::AppConfig,
    db, events,
    models::{Actor, MachineCondition, QualityRating},
    services::{
        master_data::{InMemoryMasterData, MasterDataKind},
        reports::{DetailInput, ReportInput},
    },
    AppState,
};

pub const MACHINE_A: Uuid = Uuid::from_u128(0x1001);
pub const MACHINE_B: Uuid = Uuid::from_u128(0x1002);
pub const SHIFT_MORNING: Uuid = Uuid::from_u128(0x2001);
pub const CUSTOMER_A: Uuid = Uuid::from_u128(0x3001);

/// Helper harness for an application backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub master_data: Arc<InMemoryMasterData>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with a fresh schema.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestApp::new`], letting the test adjust configuration first.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // One connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.analytics.ranking_min_reports = 1;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let master_data = Arc::new(InMemoryMasterData::new());
        master_data.register(MasterDataKind::Machine, MACHINE_A, "Cutter 01");
        master_data.register(MasterDataKind::Machine, MACHINE_B, "Cutter 02");
        master_data.register(MasterDataKind::Shift, SHIFT_MORNING, "Morning");
        master_data.register(MasterDataKind::Customer, CUSTOMER_A, "Northwind Apparel");

        let (event_sender, event_rx) = events::channel(cfg.event_channel_capacity);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender, master_data.clone());
        let router = build_router(state.clone());

        Self {
            router,
            state,
            master_data,
            _event_task: event_task,
        }
    }

    /// Send a request, optionally as `actor`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        actor: Option<&Actor>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder
                .header("x-actor-id", actor.id.to_string())
                .header("x-actor-name", actor.name.as_str());
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn operator() -> Actor {
    Actor::new(Uuid::from_u128(0xA001), "Sari Operator")
}

pub fn second_operator() -> Actor {
    Actor::new(Uuid::from_u128(0xA002), "Budi Operator")
}

pub fn supervisor() -> Actor {
    Actor::new(Uuid::from_u128(0xB001), "Dewi Supervisor")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// 95 of 100 pieces from 10 m x 150 cm in 90 minutes on machine A
pub fn report_input(production_date: NaiveDate) -> ReportInput {
    let start = Utc
        .from_utc_datetime(&production_date.and_hms_opt(8, 0, 0).expect("valid time"));
    ReportInput {
        order_number: "PO-2026-118".into(),
        batch_number: "B-07".into(),
        production_date,
        machine_id: MACHINE_A,
        shift_id: SHIFT_MORNING,
        production_line_id: None,
        customer_id: Some(CUSTOMER_A),
        pattern_id: None,
        fabric_type_id: None,
        target_quantity: 100,
        actual_quantity: 95,
        layer_count: 20,
        fabric_length_m: 10.0,
        fabric_width_cm: 150.0,
        cutting_start: Some(start),
        cutting_end: Some(start + chrono::Duration::minutes(90)),
        machine_condition: MachineCondition::Good,
        quality_rating: QualityRating::Good,
        defect_count: 2,
        defect_categories: vec!["fraying".into()],
        temperature_c: Some(27.5),
        humidity_pct: Some(60.0),
        operator_note: None,
        details: vec![DetailInput {
            piece_name: "Front panel".into(),
            size_label: "M".into(),
            piece_count: 40,
            length_cm: Some(72.0),
            width_cm: Some(55.0),
            waste_percentage: Some(3.5),
        }],
    }
}
