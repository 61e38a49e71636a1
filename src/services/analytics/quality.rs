use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use super::stats::percent;
use crate::models::{QualityRating, ReportFacts};
use crate::services::derived_metrics::round2;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QualityBucket {
    pub rating: QualityRating,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DefectCategoryCount {
    pub category: String,
    /// Reports listing the category
    pub report_count: u64,
    /// Defects on those reports
    pub total_defects: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QualityDistribution {
    pub total_reports: u64,
    pub total_defects: i64,
    /// Always one bucket per rating, best first
    pub ratings: Vec<QualityBucket>,
    pub defect_categories: Vec<DefectCategoryCount>,
}

const RATINGS: [QualityRating; 4] = [
    QualityRating::Excellent,
    QualityRating::Good,
    QualityRating::Fair,
    QualityRating::Poor,
];

pub fn quality_distribution(facts: &[ReportFacts]) -> QualityDistribution {
    let total = facts.len() as u64;

    let ratings = RATINGS
        .iter()
        .map(|&rating| {
            let count = facts.iter().filter(|f| f.quality_rating == rating).count() as u64;
            QualityBucket {
                rating,
                count,
                percentage: round2(percent(count as f64, total as f64)),
            }
        })
        .collect();

    let mut categories: HashMap<String, (u64, i64)> = HashMap::new();
    for fact in facts {
        for category in fact.defect_categories.iter() {
            let category = category.trim();
            if category.is_empty() {
                continue;
            }
            let entry = categories.entry(category.to_string()).or_default();
            entry.0 += 1;
            entry.1 += fact.defect_count as i64;
        }
    }

    let mut defect_categories: Vec<DefectCategoryCount> = categories
        .into_iter()
        .map(|(category, (report_count, total_defects))| DefectCategoryCount {
            category,
            report_count,
            total_defects,
        })
        .collect();
    defect_categories.sort_by(|a, b| {
        b.report_count
            .cmp(&a.report_count)
            .then_with(|| a.category.cmp(&b.category))
    });

    QualityDistribution {
        total_reports: total,
        total_defects: facts.iter().map(|f| f.defect_count as i64).sum(),
        ratings,
        defect_categories,
    }
}
