use super::*;
use chrono::{DateTime, Utc};
use common::Error;
use datafusion::arrow::array::UInt64Array;
use datafusion::arrow::datatypes::DataType;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::config::CsvOptions;
use datafusion::dataframe::{DataFrame, DataFrameWriteOptions};
use datafusion::logical_expr::Partitioning;
use datafusion::prelude::{CsvReadOptions, cast, ident, lit, when};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::generator::staged_files;
use crate::models::schema::table_schema;
use crate::models::{StorageFormat, tables};
use crate::storage::{TableLocation, register_object_store};
use crate::utils::paths::PathBuilder;

pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Written next to each generated table once its data is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMarker {
    pub table: String,
    pub format: String,
    pub scale_factor: String,
    pub partition_column: Option<String>,
    pub rows: u64,
    pub generated_at: DateTime<Utc>,
}

impl DataFusionTables {
    pub(crate) async fn generate_tables(&self, request: &GenDataRequest<'_>) -> Result<()> {
        let format: StorageFormat = request.format.parse()?;
        register_object_store(&self.ctx, request.location)?;

        let staging = match &self.staging_dir {
            Some(dir) => tempfile::Builder::new().prefix("dsdgen-").tempdir_in(dir)?,
            None => tempfile::Builder::new().prefix("dsdgen-").tempdir()?,
        };

        info!(
            staging = %staging.path().display(),
            scale_factor = %self.scale_factor,
            num_partitions = request.num_partitions,
            tables = request.table_filter.tables().len(),
            "Generating TPC-DS data"
        );

        self.dsdgen
            .generate(staging.path(), request.num_partitions, request.table_filter)
            .await?;

        for table in request.table_filter.tables() {
            self.write_table(table, staging.path(), request, format).await?;
        }

        Ok(())
    }

    async fn write_table(
        &self,
        table: &str,
        staging: &Path,
        request: &GenDataRequest<'_>,
        format: StorageFormat,
    ) -> Result<()> {
        let files = staged_files(staging, table)?;
        if files.is_empty() {
            warn!(table, "dsdgen produced no files, skipping");
            return Ok(());
        }

        let paths = PathBuilder::new(request.location).with_table(table);
        let target = paths.build_table_path();
        let location = TableLocation::resolve(&self.ctx, &target)?;

        if location.has_data().await? {
            if request.overwrite {
                let removed = location.clear().await?;
                info!(table, removed, "Overwriting existing table data");
            } else {
                info!(table, location = %target, "Table data already exists, skipping");
                return Ok(());
            }
        }

        let start = Instant::now();
        let schema = table_schema(table, self.schema_options)?;
        let files: Vec<String> = files
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect();

        let read_options = CsvReadOptions::new()
            .has_header(false)
            .delimiter(b'|')
            .file_extension(".dat")
            .schema(&schema);
        let df = self.ctx.read_csv(files, read_options).await?;

        let partition_column = if request.partition_tables {
            tables::partition_column(table)
        } else {
            None
        };

        let (df, write_options) = match partition_column {
            Some(column) => {
                let mut df = df;
                if request.filter_out_null_partition_values {
                    df = df.filter(ident(column).is_not_null())?;
                }
                if request.cluster_by_partition_columns {
                    df = df.sort(vec![ident(column).sort(true, true)])?;
                }
                // directory names are strings; registration restores the key type
                let key = when(ident(column).is_null(), lit(tables::NULL_PARTITION_VALUE))
                    .otherwise(cast(ident(column), DataType::Utf8))?;
                df = df.with_column(column, key)?;
                let options =
                    DataFrameWriteOptions::new().with_partition_by(vec![column.to_string()]);
                (df, options)
            }
            None => (
                df.repartition(Partitioning::RoundRobinBatch(1))?,
                DataFrameWriteOptions::new(),
            ),
        };

        let rows = write_frame(df, &target, format, write_options).await?;

        let marker = GenerationMarker {
            table: table.to_string(),
            format: format.to_string(),
            scale_factor: self.scale_factor.clone(),
            partition_column: partition_column.map(str::to_string),
            rows,
            generated_at: Utc::now(),
        };
        location.put_json(SUCCESS_MARKER, &marker).await?;

        info!(
            table,
            rows,
            partition_column = partition_column.unwrap_or("-"),
            marker = %paths.build_file_path(SUCCESS_MARKER),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Table written"
        );

        Ok(())
    }
}

async fn write_frame(
    df: DataFrame,
    target: &str,
    format: StorageFormat,
    options: DataFrameWriteOptions,
) -> Result<u64> {
    let batches = match format {
        StorageFormat::Parquet => df.write_parquet(target, options, None).await?,
        StorageFormat::Csv => {
            let csv_options = CsvOptions::default().with_has_header(true);
            df.write_csv(target, options, Some(csv_options)).await?
        }
        StorageFormat::Json => df.write_json(target, options, None).await?,
    };

    written_rows(&batches)
}

/// Sums the `count` column the engine's file sinks report.
fn written_rows(batches: &[RecordBatch]) -> Result<u64> {
    let mut rows = 0;
    for batch in batches {
        let counts = batch
            .column_by_name("count")
            .and_then(|column| column.as_any().downcast_ref::<UInt64Array>())
            .ok_or_else(|| Error::Other("Write result has no count column".to_string()))?;
        rows += counts.iter().flatten().sum::<u64>();
    }
    Ok(rows)
}
