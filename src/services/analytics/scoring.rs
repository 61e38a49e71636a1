//! Consistency, productivity and ranking of operators.

use serde::Serialize;
use std::cmp::Ordering;
use utoipa::ToSchema;
use uuid::Uuid;

use super::rollups::{group_by, RollupDimension};
use super::stats::{mean, population_std_dev, ratio};
use crate::models::{QualityRating, ReportFacts};
use crate::services::derived_metrics::round2;

/// Team-level stability: `max(0, 100 - min(sd, 100))`, 100 below two samples
pub fn team_consistency(efficiencies: &[f64]) -> f64 {
    if efficiencies.len() < 2 {
        return 100.0;
    }
    let sd = population_std_dev(efficiencies);
    (100.0 - sd.min(100.0)).max(0.0)
}

/// Operator-level stability: `max(0, 100 - 2 * sd)`, 100 below two samples
pub fn operator_consistency(efficiencies: &[f64]) -> f64 {
    if efficiencies.len() < 2 {
        return 100.0;
    }
    let sd = population_std_dev(efficiencies);
    (100.0 - sd * 2.0).max(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamConsistency {
    pub sample_count: u64,
    pub average_efficiency: f64,
    pub std_dev: f64,
    pub score: f64,
}

pub fn team_consistency_summary(facts: &[ReportFacts]) -> TeamConsistency {
    let efficiencies: Vec<f64> = facts.iter().map(|f| f.efficiency_percentage).collect();
    TeamConsistency {
        sample_count: efficiencies.len() as u64,
        average_efficiency: round2(mean(&efficiencies)),
        std_dev: round2(population_std_dev(&efficiencies)),
        score: round2(team_consistency(&efficiencies)),
    }
}

/// The four capped parts of the productivity score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ProductivityScore {
    pub efficiency_points: f64,
    pub volume_points: f64,
    pub quality_points: f64,
    pub consistency_points: f64,
    pub total: f64,
}

pub const EFFICIENCY_WEIGHT: f64 = 40.0;
pub const VOLUME_WEIGHT: f64 = 30.0;
pub const QUALITY_WEIGHT: f64 = 20.0;
pub const CONSISTENCY_WEIGHT: f64 = 10.0;

/// Units that earn the full volume weight
const VOLUME_UNITS_FOR_FULL_SCORE: f64 = 1000.0;

pub fn productivity_score(
    average_efficiency: f64,
    total_units: i64,
    excellent_share: f64,
    efficiency_std_dev: f64,
) -> ProductivityScore {
    let efficiency_points =
        (average_efficiency / 100.0 * EFFICIENCY_WEIGHT).clamp(0.0, EFFICIENCY_WEIGHT);
    let volume_points = (total_units as f64 / VOLUME_UNITS_FOR_FULL_SCORE * VOLUME_WEIGHT)
        .clamp(0.0, VOLUME_WEIGHT);
    let quality_points = (excellent_share * QUALITY_WEIGHT).clamp(0.0, QUALITY_WEIGHT);
    let consistency_points = ((100.0 - efficiency_std_dev) / 100.0 * CONSISTENCY_WEIGHT)
        .clamp(0.0, CONSISTENCY_WEIGHT);

    ProductivityScore {
        efficiency_points: round2(efficiency_points),
        volume_points: round2(volume_points),
        quality_points: round2(quality_points),
        consistency_points: round2(consistency_points),
        total: round2(efficiency_points + volume_points + quality_points + consistency_points),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Badge {
    Gold,
    Silver,
    Bronze,
    HighPerformer,
    SolidPerformer,
}

/// Badge for a 1-based rank and the operator's average efficiency
pub fn badge_for(rank: usize, average_efficiency: f64) -> Option<Badge> {
    match rank {
        1 => Some(Badge::Gold),
        2 => Some(Badge::Silver),
        3 => Some(Badge::Bronze),
        _ if average_efficiency >= 90.0 => Some(Badge::HighPerformer),
        _ if average_efficiency >= 80.0 => Some(Badge::SolidPerformer),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OperatorScorecard {
    pub operator_id: Uuid,
    pub operator_name: String,
    pub report_count: u64,
    pub average_efficiency: f64,
    pub total_quantity: i64,
    pub total_yard: f64,
    pub excellent_share: f64,
    pub efficiency_std_dev: f64,
    pub consistency_score: f64,
    pub productivity: ProductivityScore,
    /// `None` when the operator has too few approved reports to be ranked
    pub rank: Option<usize>,
    pub badge: Option<Badge>,
}

/// Scorecards for every operator in the window: ranked operators first in
/// rank order, then the ineligible ones by average efficiency.
pub fn operator_scorecards(facts: &[ReportFacts], min_reports: usize) -> Vec<OperatorScorecard> {
    let mut cards: Vec<(f64, OperatorScorecard)> = group_by(facts, RollupDimension::Operator)
        .into_iter()
        .map(|(operator_id, group)| {
            let efficiencies: Vec<f64> = group.iter().map(|f| f.efficiency_percentage).collect();
            let average = mean(&efficiencies);
            let sd = population_std_dev(&efficiencies);
            let total_quantity: i64 = group.iter().map(|f| f.actual_quantity as i64).sum();
            let excellent = group
                .iter()
                .filter(|f| f.quality_rating == QualityRating::Excellent)
                .count();
            let excellent_share = ratio(excellent as f64, group.len() as f64);

            let card = OperatorScorecard {
                operator_id,
                operator_name: group[0].operator_name.clone(),
                report_count: group.len() as u64,
                average_efficiency: round2(average),
                total_quantity,
                total_yard: round2(group.iter().map(|f| f.total_yard).sum()),
                excellent_share: round2(excellent_share),
                efficiency_std_dev: round2(sd),
                consistency_score: round2(operator_consistency(&efficiencies)),
                productivity: productivity_score(average, total_quantity, excellent_share, sd),
                rank: None,
                badge: None,
            };
            (average, card)
        })
        .collect();

    cards.sort_by(|(avg_a, a), (avg_b, b)| {
        let eligible_a = a.report_count as usize >= min_reports;
        let eligible_b = b.report_count as usize >= min_reports;
        eligible_b
            .cmp(&eligible_a)
            .then_with(|| avg_b.partial_cmp(avg_a).unwrap_or(Ordering::Equal))
            .then_with(|| b.report_count.cmp(&a.report_count))
            .then_with(|| a.operator_id.cmp(&b.operator_id))
    });

    let mut rank = 0;
    cards
        .into_iter()
        .map(|(average, mut card)| {
            if card.report_count as usize >= min_reports {
                rank += 1;
                card.rank = Some(rank);
                card.badge = badge_for(rank, average);
            }
            card
        })
        .collect()
}

/// Ranked operators only, truncated to `limit`
pub fn leaderboard(
    facts: &[ReportFacts],
    min_reports: usize,
    limit: usize,
) -> Vec<OperatorScorecard> {
    operator_scorecards(facts, min_reports)
        .into_iter()
        .filter(|card| card.rank.is_some())
        .take(limit)
        .collect()
}
