//! Read-only production analytics over a window of approved reports.
//!
//! The service loads the window's [`ReportFacts`] once per call and hands them
//! to pure aggregation functions, one per submodule.

pub mod bottlenecks;
pub mod capacity;
pub mod forecast;
pub mod overview;
pub mod quality;
pub mod rollups;
pub mod scoring;
pub mod stats;
pub mod trends;
pub mod window;

use chrono::{DateTime, Utc};
use metrics::histogram;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AnalyticsConfig;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::ReportFacts;
use crate::repositories::ReportRepository;
use crate::services::master_data::{MasterDataKind, MasterDataLookup};

pub use bottlenecks::{BottleneckThresholds, Bottlenecks};
pub use capacity::CapacityUtilization;
pub use forecast::ProductionForecast;
pub use overview::OverviewStats;
pub use quality::QualityDistribution;
pub use rollups::{EntityRollup, RollupDimension};
pub use scoring::{OperatorScorecard, TeamConsistency};
pub use trends::TrendPoint;
pub use window::DateWindow;

/// Everything the production dashboard shows, computed from one window load
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub overview: OverviewStats,
    pub daily_trend: Vec<TrendPoint>,
    pub top_machines: Vec<EntityRollup>,
    pub top_operators: Vec<EntityRollup>,
    pub top_customers: Vec<EntityRollup>,
    pub top_shifts: Vec<EntityRollup>,
    pub quality: QualityDistribution,
    pub consistency: TeamConsistency,
    pub forecast: ProductionForecast,
    pub bottlenecks: Bottlenecks,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    reports: ReportRepository,
    master_data: Arc<dyn MasterDataLookup>,
    config: AnalyticsConfig,
}

impl AnalyticsService {
    pub fn new(
        db: Arc<DbPool>,
        master_data: Arc<dyn MasterDataLookup>,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            reports: ReportRepository::new(db),
            master_data,
            config,
        }
    }

    async fn load(&self, window: DateWindow) -> Result<Vec<ReportFacts>, ServiceError> {
        let facts = self.reports.approved_facts(window.start, window.end).await?;
        debug!(
            start = %window.start,
            end = %window.end,
            reports = facts.len(),
            "Loaded analytics window"
        );
        Ok(facts)
    }

    fn labels<F>(&self, kind: MasterDataKind, facts: &[ReportFacts], key: F) -> HashMap<Uuid, String>
    where
        F: Fn(&ReportFacts) -> Option<Uuid>,
    {
        let ids: Vec<Uuid> = facts
            .iter()
            .filter_map(key)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return HashMap::new();
        }
        self.master_data.labels(kind, &ids)
    }

    fn rollup_of(
        &self,
        facts: &[ReportFacts],
        dimension: RollupDimension,
        top_n: usize,
    ) -> Vec<EntityRollup> {
        let labels = match dimension.master_data_kind() {
            Some(kind) => self.labels(kind, facts, |f| dimension.key(f)),
            None => HashMap::new(),
        };
        rollups::rollup(facts, dimension, &labels, top_n)
    }

    fn bottlenecks_of(&self, facts: &[ReportFacts]) -> Bottlenecks {
        let machine_labels = self.labels(MasterDataKind::Machine, facts, |f| Some(f.machine_id));
        let shift_labels = self.labels(MasterDataKind::Shift, facts, |f| Some(f.shift_id));
        bottlenecks::detect_bottlenecks(
            facts,
            &machine_labels,
            &shift_labels,
            BottleneckThresholds {
                efficiency: self.config.efficiency_threshold,
                defect_rate: self.config.defect_rate_threshold,
            },
        )
    }

    fn record_timing(view: &'static str, started: Instant) {
        histogram!(
            "cutting_reports_analytics.compute_duration",
            started.elapsed(),
            "view" => view
        );
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn overview(&self, window: DateWindow) -> Result<OverviewStats, ServiceError> {
        let started = Instant::now();
        let previous_window = window.previous();

        let status_rows = self.reports.status_counts(window.start, window.end).await?;
        let current = self.load(window).await?;
        let previous = self.load(previous_window).await?;

        let stats = overview::overview(window, &status_rows, &current, &previous);
        Self::record_timing("overview", started);
        Ok(stats)
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn daily_trend(&self, window: DateWindow) -> Result<Vec<TrendPoint>, ServiceError> {
        let facts = self.load(window).await?;
        Ok(trends::daily_trend(&facts))
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn weekly_efficiency(
        &self,
        window: DateWindow,
    ) -> Result<Vec<TrendPoint>, ServiceError> {
        let facts = self.load(window).await?;
        Ok(trends::weekly_trend(&facts))
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end, dimension = %dimension))]
    pub async fn rollup(
        &self,
        window: DateWindow,
        dimension: RollupDimension,
    ) -> Result<Vec<EntityRollup>, ServiceError> {
        let started = Instant::now();
        let facts = self.load(window).await?;
        let rows = self.rollup_of(&facts, dimension, self.config.top_n);
        Self::record_timing("rollup", started);
        Ok(rows)
    }

    /// Ranked operators; `limit` falls back to the configured leaderboard size
    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn leaderboard(
        &self,
        window: DateWindow,
        limit: Option<usize>,
    ) -> Result<Vec<OperatorScorecard>, ServiceError> {
        let facts = self.load(window).await?;
        let limit = limit.unwrap_or(self.config.leaderboard_limit).max(1);
        Ok(scoring::leaderboard(
            &facts,
            self.config.ranking_min_reports,
            limit,
        ))
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn operator_scorecards(
        &self,
        window: DateWindow,
    ) -> Result<Vec<OperatorScorecard>, ServiceError> {
        let started = Instant::now();
        let facts = self.load(window).await?;
        let cards = scoring::operator_scorecards(&facts, self.config.ranking_min_reports);
        Self::record_timing("scorecards", started);
        Ok(cards)
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn team_consistency(
        &self,
        window: DateWindow,
    ) -> Result<TeamConsistency, ServiceError> {
        let facts = self.load(window).await?;
        Ok(scoring::team_consistency_summary(&facts))
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn forecast(&self, window: DateWindow) -> Result<ProductionForecast, ServiceError> {
        let facts = self.load(window).await?;
        Ok(forecast::forecast(
            window,
            &facts,
            self.config.trend_slope_threshold,
        ))
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn capacity(&self, window: DateWindow) -> Result<CapacityUtilization, ServiceError> {
        let facts = self.load(window).await?;
        let labels = self.labels(MasterDataKind::Machine, &facts, |f| Some(f.machine_id));
        Ok(capacity::capacity_utilization(window, &facts, &labels))
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn bottlenecks(&self, window: DateWindow) -> Result<Bottlenecks, ServiceError> {
        let facts = self.load(window).await?;
        Ok(self.bottlenecks_of(&facts))
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn quality(&self, window: DateWindow) -> Result<QualityDistribution, ServiceError> {
        let facts = self.load(window).await?;
        Ok(quality::quality_distribution(&facts))
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn dashboard(&self, window: DateWindow) -> Result<Dashboard, ServiceError> {
        let started = Instant::now();

        let status_rows = self.reports.status_counts(window.start, window.end).await?;
        let facts = self.load(window).await?;
        let previous = self.load(window.previous()).await?;
        let top_n = self.config.top_n;

        let dashboard = Dashboard {
            overview: overview::overview(window, &status_rows, &facts, &previous),
            daily_trend: trends::daily_trend(&facts),
            top_machines: self.rollup_of(&facts, RollupDimension::Machine, top_n),
            top_operators: self.rollup_of(&facts, RollupDimension::Operator, top_n),
            top_customers: self.rollup_of(&facts, RollupDimension::Customer, top_n),
            top_shifts: self.rollup_of(&facts, RollupDimension::Shift, top_n),
            quality: quality::quality_distribution(&facts),
            consistency: scoring::team_consistency_summary(&facts),
            forecast: forecast::forecast(window, &facts, self.config.trend_slope_threshold),
            bottlenecks: self.bottlenecks_of(&facts),
            generated_at: Utc::now(),
        };

        Self::record_timing("dashboard", started);
        Ok(dashboard)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, NaiveDate};
    use uuid::Uuid;

    use super::window::DateWindow;
    use crate::entities::StringList;
    use crate::models::{QualityRating, ReportFacts};

    pub const OPERATOR_A: Uuid = Uuid::from_u128(0xA0);
    pub const MACHINE_A: Uuid = Uuid::from_u128(0xB0);
    pub const MACHINE_B: Uuid = Uuid::from_u128(0xB1);
    pub const SHIFT_A: Uuid = Uuid::from_u128(0xD0);

    /// 2026-10-01 through 2026-10-30
    pub fn window() -> DateWindow {
        let start = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        DateWindow::new(start, start + Duration::days(29)).unwrap()
    }

    /// An approved report on `day` days after the window start, cut on
    /// machine A during shift A in one hour
    pub fn fact(day: i64, actual: i32, target: i32) -> ReportFacts {
        ReportFacts {
            id: Uuid::new_v4(),
            production_date: window().start + Duration::days(day),
            operator_id: OPERATOR_A,
            operator_name: "Operator A".to_string(),
            machine_id: MACHINE_A,
            shift_id: SHIFT_A,
            customer_id: None,
            target_quantity: target,
            actual_quantity: actual,
            efficiency_percentage: crate::services::derived_metrics::efficiency_percentage(
                actual, target,
            ),
            total_yard: 10.0,
            duration_minutes: Some(60),
            defect_count: 0,
            defect_categories: StringList::default(),
            quality_rating: QualityRating::Good,
        }
    }
}
