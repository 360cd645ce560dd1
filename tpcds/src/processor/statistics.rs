use super::*;
use arrow::array::{Array, ArrayRef, Int64Array};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, Utc};
use common::Error;
use datafusion::common::TableReference;
use datafusion::functions_aggregate::expr_fn::{count, count_distinct, max, min};
use datafusion::prelude::{Expr, ident, lit};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub name: String,
    pub null_count: u64,
    pub distinct_count: u64,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStatistics {
    pub table: String,
    pub record_count: u64,
    /// Empty unless columns were analyzed.
    pub column_stats: Vec<ColumnStatistics>,
    pub calculated_at: DateTime<Utc>,
}

const ROW_COUNT: &str = "__row_count";

impl DataFusionTables {
    pub(crate) async fn compute_statistics(
        &self,
        database_name: &str,
        analyze_columns: bool,
    ) -> Result<Vec<TableStatistics>> {
        let mut table_names = self.database_tables(database_name)?;
        table_names.sort();

        let mut statistics = Vec::with_capacity(table_names.len());
        for table in table_names {
            let stats = self.analyze_table(database_name, &table, analyze_columns).await?;
            statistics.push(stats);
        }

        info!(
            database = database_name,
            tables = statistics.len(),
            analyze_columns,
            "Analyzed tables"
        );
        Ok(statistics)
    }

    fn database_tables(&self, database_name: &str) -> Result<Vec<String>> {
        let catalog_name = self.ctx.copied_config().options().catalog.default_catalog.clone();
        let schema = self
            .ctx
            .catalog(&catalog_name)
            .and_then(|catalog| catalog.schema(database_name))
            .ok_or_else(|| {
                Error::InvalidInput(format!("Database '{}' does not exist", database_name))
            })?;
        Ok(schema.table_names())
    }

    async fn analyze_table(
        &self,
        database_name: &str,
        table: &str,
        analyze_columns: bool,
    ) -> Result<TableStatistics> {
        let start = Instant::now();
        let df = self
            .ctx
            .table(TableReference::partial(database_name, table))
            .await?;

        let columns: Vec<String> = if analyze_columns {
            df.schema()
                .fields()
                .iter()
                .map(|field| field.name().clone())
                .collect()
        } else {
            Vec::new()
        };

        // four aggregates per column, after the row count
        let mut aggregates: Vec<Expr> = vec![count(lit(1)).alias(ROW_COUNT)];
        for (i, column) in columns.iter().enumerate() {
            aggregates.push(count(ident(column)).alias(format!("__non_null_{i}")));
            aggregates.push(count_distinct(ident(column)).alias(format!("__distinct_{i}")));
            aggregates.push(min(ident(column)).alias(format!("__min_{i}")));
            aggregates.push(max(ident(column)).alias(format!("__max_{i}")));
        }

        let batches = df.aggregate(vec![], aggregates)?.collect().await?;
        let row = batches
            .iter()
            .find(|batch| batch.num_rows() > 0)
            .ok_or_else(|| Error::Other(format!("No statistics returned for {}", table)))?;

        let record_count = count_value(row, 0)?;
        let mut column_stats = Vec::with_capacity(columns.len());
        for (i, name) in columns.into_iter().enumerate() {
            let offset = 1 + i * 4;
            let stats = ColumnStatistics {
                null_count: record_count.saturating_sub(count_value(row, offset)?),
                distinct_count: count_value(row, offset + 1)?,
                min_value: scalar_string(row.column(offset + 2))?,
                max_value: scalar_string(row.column(offset + 3))?,
                name,
            };
            debug!(table, column = %stats.name, ?stats, "Column statistics");
            column_stats.push(stats);
        }

        info!(
            table,
            record_count,
            columns = column_stats.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Computed table statistics"
        );

        Ok(TableStatistics {
            table: table.to_string(),
            record_count,
            column_stats,
            calculated_at: Utc::now(),
        })
    }
}

fn count_value(batch: &RecordBatch, index: usize) -> Result<u64> {
    let counts = batch
        .column(index)
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| Error::Other("Failed to downcast count to Int64Array".to_string()))?;
    Ok(counts.value(0).max(0) as u64)
}

fn scalar_string(array: &ArrayRef) -> Result<Option<String>> {
    if array.is_null(0) {
        return Ok(None);
    }
    Ok(Some(array_value_to_string(array, 0)?))
}
