//! CSV exports of reports and validation history.
//!
//! Exports are streams: the header row is one chunk, then every page of
//! `batch_size` rows is fetched, labelled and serialized into its own chunk,
//! so memory stays bounded by one page whatever the export size.

use futures::stream::{self, Stream};
use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{production_report, validation_record};
use crate::errors::ServiceError;
use crate::repositories::{ReportFilter, ReportRepository, ValidationFilter, ValidationRepository};
use crate::services::derived_metrics::round2;
use crate::services::master_data::{label_or_id, MasterDataKind, MasterDataLookup};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub const REPORT_HEADERS: [&str; 15] = [
    "Order Number",
    "Batch Number",
    "Production Date",
    "Operator",
    "Shift",
    "Machine",
    "Customer",
    "Pattern",
    "Fabric",
    "Target Quantity",
    "Actual Quantity",
    "Efficiency (%)",
    "Duration (minutes)",
    "Status",
    "Created At",
];

pub const VALIDATION_HEADERS: [&str; 4] = ["Decision", "Validator", "Note", "Revision Items"];

/// Separator used when flattening revision items into one cell
pub const REVISION_ITEM_SEPARATOR: &str = "; ";

/// Labels for every master-data reference on one page of reports
#[derive(Default)]
struct PageLabels {
    by_kind: HashMap<MasterDataKind, HashMap<Uuid, String>>,
}

impl PageLabels {
    fn resolve(lookup: &dyn MasterDataLookup, reports: &[&production_report::Model]) -> Self {
        let kinds: [(MasterDataKind, fn(&production_report::Model) -> Option<Uuid>); 5] = [
            (MasterDataKind::Shift, |r| Some(r.shift_id)),
            (MasterDataKind::Machine, |r| Some(r.machine_id)),
            (MasterDataKind::Customer, |r| r.customer_id),
            (MasterDataKind::Pattern, |r| r.pattern_id),
            (MasterDataKind::FabricType, |r| r.fabric_type_id),
        ];

        let mut by_kind = HashMap::new();
        for (kind, key) in kinds {
            let mut ids: Vec<Uuid> = reports.iter().filter_map(|r| key(r)).collect();
            ids.sort();
            ids.dedup();
            if !ids.is_empty() {
                by_kind.insert(kind, lookup.labels(kind, &ids));
            }
        }
        Self { by_kind }
    }

    fn label(&self, kind: MasterDataKind, id: Option<Uuid>) -> String {
        match id {
            Some(id) => self
                .by_kind
                .get(&kind)
                .map(|labels| label_or_id(labels, id))
                .unwrap_or_else(|| id.to_string()),
            None => String::new(),
        }
    }
}

fn report_cells(report: &production_report::Model, labels: &PageLabels) -> Vec<String> {
    vec![
        report.order_number.clone(),
        report.batch_number.clone(),
        report.production_date.format("%Y-%m-%d").to_string(),
        report.operator_name.clone(),
        labels.label(MasterDataKind::Shift, Some(report.shift_id)),
        labels.label(MasterDataKind::Machine, Some(report.machine_id)),
        labels.label(MasterDataKind::Customer, report.customer_id),
        labels.label(MasterDataKind::Pattern, report.pattern_id),
        labels.label(MasterDataKind::FabricType, report.fabric_type_id),
        report.target_quantity.to_string(),
        report.actual_quantity.to_string(),
        format!("{:.2}", round2(report.efficiency_percentage)),
        report
            .duration_minutes
            .map(|m| m.to_string())
            .unwrap_or_default(),
        report.status.to_string(),
        report.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]
}

fn validation_cells(record: &validation_record::Model) -> Vec<String> {
    vec![
        record.decision.to_string(),
        record.validator_name.clone(),
        record.note.clone(),
        record.revision_items.joined(REVISION_ITEM_SEPARATOR),
    ]
}

fn csv_error(e: impl std::fmt::Display) -> ServiceError {
    error!(error = %e, "Failed to write CSV export");
    ServiceError::InternalError(format!("CSV export failed: {}", e))
}

/// Serializes `records` into one self-contained CSV chunk
fn encode<R, F>(records: impl IntoIterator<Item = R>) -> Result<Vec<u8>, ServiceError>
where
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.write_record(record).map_err(csv_error)?;
    }
    writer.into_inner().map_err(csv_error)
}

/// One CSV chunk of an export; the header comes first, then one chunk per page
pub type CsvChunk = Result<Vec<u8>, ServiceError>;

/// Where an export stream is between chunks
enum Cursor {
    Header,
    Page { page: u64, written: u64 },
    Done,
}

impl Cursor {
    fn after_page(page: u64, written: u64, total: u64) -> Self {
        if written >= total {
            Cursor::Done
        } else {
            Cursor::Page {
                page: page + 1,
                written,
            }
        }
    }
}

fn finished(export: &'static str, written: u64) {
    counter!("cutting_reports_export.rows", written, "export" => export);
    info!(export, rows = written, "Export streamed");
}

#[derive(Clone)]
pub struct ExportService {
    reports: ReportRepository,
    validations: ValidationRepository,
    master_data: Arc<dyn MasterDataLookup>,
    batch_size: u64,
}

impl ExportService {
    pub fn new(db: Arc<DbPool>, master_data: Arc<dyn MasterDataLookup>, batch_size: u64) -> Self {
        Self {
            reports: ReportRepository::new(db.clone()),
            validations: ValidationRepository::new(db),
            master_data,
            batch_size: batch_size.max(1),
        }
    }

    /// All reports matching `filter`, newest first, one page per chunk
    pub fn reports_csv(
        &self,
        filter: ReportFilter,
    ) -> impl Stream<Item = CsvChunk> + Send + 'static {
        let service = self.clone();
        stream::try_unfold(Cursor::Header, move |cursor| {
            let service = service.clone();
            let filter = filter.clone();
            async move {
                match cursor {
                    Cursor::Header => Ok(Some((
                        encode([REPORT_HEADERS])?,
                        Cursor::Page {
                            page: 1,
                            written: 0,
                        },
                    ))),
                    Cursor::Page { page, written } => {
                        service.report_page(&filter, page, written).await
                    }
                    Cursor::Done => Ok(None),
                }
            }
        })
    }

    #[instrument(skip(self, filter))]
    async fn report_page(
        &self,
        filter: &ReportFilter,
        page: u64,
        written: u64,
    ) -> Result<Option<(Vec<u8>, Cursor)>, ServiceError> {
        let (rows, total) = self.reports.find_all(filter, page, self.batch_size).await?;
        if rows.is_empty() {
            finished("reports", written);
            return Ok(None);
        }

        let refs: Vec<&production_report::Model> = rows.iter().collect();
        let labels = PageLabels::resolve(self.master_data.as_ref(), &refs);
        let chunk = encode(rows.iter().map(|report| report_cells(report, &labels)))?;

        let written = written + rows.len() as u64;
        let next = Cursor::after_page(page, written, total);
        if matches!(next, Cursor::Done) {
            finished("reports", written);
        }
        Ok(Some((chunk, next)))
    }

    /// Validation history matching `filter`, newest decision first, one page per chunk
    pub fn validations_csv(
        &self,
        filter: ValidationFilter,
    ) -> impl Stream<Item = CsvChunk> + Send + 'static {
        let service = self.clone();
        stream::try_unfold(Cursor::Header, move |cursor| {
            let service = service.clone();
            let filter = filter.clone();
            async move {
                match cursor {
                    Cursor::Header => {
                        let headers = REPORT_HEADERS.iter().chain(VALIDATION_HEADERS.iter());
                        Ok(Some((
                            encode([headers])?,
                            Cursor::Page {
                                page: 1,
                                written: 0,
                            },
                        )))
                    }
                    Cursor::Page { page, written } => {
                        service.validation_page(&filter, page, written).await
                    }
                    Cursor::Done => Ok(None),
                }
            }
        })
    }

    #[instrument(skip(self, filter))]
    async fn validation_page(
        &self,
        filter: &ValidationFilter,
        page: u64,
        written: u64,
    ) -> Result<Option<(Vec<u8>, Cursor)>, ServiceError> {
        let (rows, total) = self
            .validations
            .history(filter, page, self.batch_size)
            .await?;
        if rows.is_empty() {
            finished("validations", written);
            return Ok(None);
        }

        let reports: Vec<&production_report::Model> =
            rows.iter().filter_map(|(_, report)| report.as_ref()).collect();
        let labels = PageLabels::resolve(self.master_data.as_ref(), &reports);
        let chunk = encode(rows.iter().map(|(record, report)| {
            let mut cells = match report {
                Some(report) => report_cells(report, &labels),
                None => vec![String::new(); REPORT_HEADERS.len()],
            };
            cells.extend(validation_cells(record));
            cells
        }))?;

        let written = written + rows.len() as u64;
        let next = Cursor::after_page(page, written, total);
        if matches!(next, Cursor::Done) {
            finished("validations", written);
        }
        Ok(Some((chunk, next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StringList;
    use crate::models::{Decision, MachineCondition, QualityRating, ReportStatus};
    use crate::services::master_data::InMemoryMasterData;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn report() -> production_report::Model {
        let created = Utc.with_ymd_and_hms(2026, 10, 1, 9, 15, 0).unwrap();
        production_report::Model {
            id: Uuid::new_v4(),
            report_number: "CUT-20261001-0001".into(),
            order_number: "PO-77".into(),
            batch_number: "B-3".into(),
            production_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            operator_id: Uuid::new_v4(),
            operator_name: "Sari".into(),
            machine_id: Uuid::from_u128(1),
            shift_id: Uuid::from_u128(2),
            production_line_id: None,
            customer_id: None,
            pattern_id: Some(Uuid::from_u128(3)),
            fabric_type_id: None,
            target_quantity: 3,
            actual_quantity: 1,
            layer_count: 10,
            fabric_length_m: 10.0,
            fabric_width_cm: 150.0,
            cutting_start: None,
            cutting_end: None,
            machine_condition: MachineCondition::Good,
            quality_rating: QualityRating::Good,
            defect_count: 0,
            defect_categories: StringList::default(),
            temperature_c: None,
            humidity_pct: None,
            operator_note: None,
            total_yard: 16.4,
            duration_minutes: None,
            efficiency_percentage: 100.0 / 3.0,
            status: ReportStatus::Approved,
            submitted_at: None,
            version: 1,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn report_row_uses_labels_and_presentation_rounding() {
        let registry = InMemoryMasterData::new();
        registry.register(MasterDataKind::Machine, Uuid::from_u128(1), "Cutter 1");
        let report = report();
        let labels = PageLabels::resolve(&registry, &[&report]);

        let cells = report_cells(&report, &labels);

        assert_eq!(cells.len(), REPORT_HEADERS.len());
        assert_eq!(cells[4], Uuid::from_u128(2).to_string());
        assert_eq!(cells[5], "Cutter 1");
        assert_eq!(cells[6], "");
        assert_eq!(cells[7], Uuid::from_u128(3).to_string());
        assert_eq!(cells[11], "33.33");
        assert_eq!(cells[12], "");
        assert_eq!(cells[13], "approved");
        assert_eq!(cells[14], "2026-10-01 09:15:00");
    }

    #[test]
    fn revision_items_are_joined() {
        let now = Utc::now();
        let record = validation_record::Model {
            id: Uuid::new_v4(),
            report_id: Uuid::new_v4(),
            validator_id: Uuid::new_v4(),
            validator_name: "Dewi".into(),
            decision: Decision::NeedRevision,
            note: "fix counts".into(),
            revision_items: StringList(vec!["layer count".into(), "defects".into()]),
            decided_at: now,
            created_at: now,
            updated_at: now,
        };

        let cells = validation_cells(&record);
        assert_eq!(cells, vec!["need_revision", "Dewi", "fix counts", "layer count; defects"]);
    }

    #[test]
    fn chunks_are_self_contained_csv() {
        let chunk = encode([vec!["PO-1", "a, b"], vec!["PO-2", "plain"]]).unwrap();
        assert_eq!(String::from_utf8(chunk).unwrap(), "PO-1,\"a, b\"\nPO-2,plain\n");
    }

    #[test]
    fn cursor_stops_once_every_row_is_written() {
        assert!(matches!(
            Cursor::after_page(1, 2, 5),
            Cursor::Page {
                page: 2,
                written: 2
            }
        ));
        assert!(matches!(Cursor::after_page(3, 5, 5), Cursor::Done));
    }
}
