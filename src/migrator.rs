use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_production_reports_table::Migration),
            Box::new(m20261001_000002_create_detail_cuttings_table::Migration),
            Box::new(m20261001_000003_create_validation_records_table::Migration),
        ]
    }
}

#[derive(Iden)]
enum ProductionReports {
    Table,
    Id,
    ReportNumber,
    OrderNumber,
    BatchNumber,
    ProductionDate,
    OperatorId,
    OperatorName,
    MachineId,
    ShiftId,
    ProductionLineId,
    CustomerId,
    PatternId,
    FabricTypeId,
    TargetQuantity,
    ActualQuantity,
    LayerCount,
    FabricLengthM,
    FabricWidthCm,
    CuttingStart,
    CuttingEnd,
    MachineCondition,
    QualityRating,
    DefectCount,
    DefectCategories,
    TemperatureC,
    HumidityPct,
    OperatorNote,
    TotalYard,
    DurationMinutes,
    EfficiencyPercentage,
    Status,
    SubmittedAt,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DetailCuttings {
    Table,
    Id,
    ReportId,
    PieceName,
    SizeLabel,
    PieceCount,
    LengthCm,
    WidthCm,
    WastePercentage,
    CreatedAt,
}

#[derive(Iden)]
enum ValidationRecords {
    Table,
    Id,
    ReportId,
    ValidatorId,
    ValidatorName,
    Decision,
    Note,
    RevisionItems,
    DecidedAt,
    CreatedAt,
    UpdatedAt,
}

mod m20261001_000001_create_production_reports_table {
    use super::ProductionReports;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20261001_000001_create_production_reports_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionReports::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionReports::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::ReportNumber)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::OrderNumber)
                                .string_len(64)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::BatchNumber)
                                .string_len(64)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::ProductionDate)
                                .date()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionReports::OperatorId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductionReports::OperatorName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionReports::MachineId).uuid().not_null())
                        .col(ColumnDef::new(ProductionReports::ShiftId).uuid().not_null())
                        .col(ColumnDef::new(ProductionReports::ProductionLineId).uuid().null())
                        .col(ColumnDef::new(ProductionReports::CustomerId).uuid().null())
                        .col(ColumnDef::new(ProductionReports::PatternId).uuid().null())
                        .col(ColumnDef::new(ProductionReports::FabricTypeId).uuid().null())
                        .col(
                            ColumnDef::new(ProductionReports::TargetQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::ActualQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::LayerCount)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::FabricLengthM)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::FabricWidthCm)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::CuttingStart)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::CuttingEnd)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::MachineCondition)
                                .string_len(24)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::QualityRating)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::DefectCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::DefectCategories)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionReports::TemperatureC).double().null())
                        .col(ColumnDef::new(ProductionReports::HumidityPct).double().null())
                        .col(ColumnDef::new(ProductionReports::OperatorNote).text().null())
                        .col(
                            ColumnDef::new(ProductionReports::TotalYard)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::DurationMinutes)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::EfficiencyPercentage)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::SubmittedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionReports::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_reports_status_date")
                        .table(ProductionReports::Table)
                        .col(ProductionReports::Status)
                        .col(ProductionReports::ProductionDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_reports_operator")
                        .table(ProductionReports::Table)
                        .col(ProductionReports::OperatorId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_reports_machine")
                        .table(ProductionReports::Table)
                        .col(ProductionReports::MachineId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionReports::Table).to_owned())
                .await
        }
    }
}

mod m20261001_000002_create_detail_cuttings_table {
    use super::{DetailCuttings, ProductionReports};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20261001_000002_create_detail_cuttings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DetailCuttings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DetailCuttings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DetailCuttings::ReportId).uuid().not_null())
                        .col(ColumnDef::new(DetailCuttings::PieceName).string().not_null())
                        .col(
                            ColumnDef::new(DetailCuttings::SizeLabel)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DetailCuttings::PieceCount)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DetailCuttings::LengthCm).double().null())
                        .col(ColumnDef::new(DetailCuttings::WidthCm).double().null())
                        .col(ColumnDef::new(DetailCuttings::WastePercentage).double().null())
                        .col(
                            ColumnDef::new(DetailCuttings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_detail_cuttings_report_id")
                                .from(DetailCuttings::Table, DetailCuttings::ReportId)
                                .to(ProductionReports::Table, ProductionReports::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_detail_cuttings_report_id")
                        .table(DetailCuttings::Table)
                        .col(DetailCuttings::ReportId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DetailCuttings::Table).to_owned())
                .await
        }
    }
}

mod m20261001_000003_create_validation_records_table {
    use super::{ProductionReports, ValidationRecords};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20261001_000003_create_validation_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ValidationRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ValidationRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidationRecords::ReportId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(ValidationRecords::ValidatorId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidationRecords::ValidatorName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidationRecords::Decision)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidationRecords::Note)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(ValidationRecords::RevisionItems)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidationRecords::DecidedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidationRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidationRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_validation_records_report_id")
                                .from(ValidationRecords::Table, ValidationRecords::ReportId)
                                .to(ProductionReports::Table, ProductionReports::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_validation_records_decided_at")
                        .table(ValidationRecords::Table)
                        .col(ValidationRecords::DecidedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ValidationRecords::Table).to_owned())
                .await
        }
    }
}
