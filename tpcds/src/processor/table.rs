use arrow::datatypes::{DataType, SchemaRef};
use async_trait::async_trait;
use common::Result;
use datafusion::common::{ScalarValue, TableReference};
use datafusion::datasource::TableProvider;
use datafusion::datasource::file_format::FileFormat;
use datafusion::datasource::file_format::csv::CsvFormat;
use datafusion::datasource::file_format::json::JsonFormat;
use datafusion::datasource::file_format::parquet::ParquetFormat;
use datafusion::datasource::listing::{
    ListingOptions, ListingTable, ListingTableConfig, ListingTableUrl,
};
use datafusion::prelude::{Expr, SessionContext, cast, ident, lit, when};
use std::sync::Arc;

use crate::models::StorageFormat;
use crate::models::tables::NULL_PARTITION_VALUE;

/// Where a table's files live and how they are laid out.
#[derive(Debug, Clone)]
pub struct TableSource {
    pub url: ListingTableUrl,
    pub format: StorageFormat,
    pub file_schema: SchemaRef,
    pub partition_cols: Vec<(String, DataType)>,
}

#[async_trait]
pub trait TableRegistry: Send + Sync + 'static {
    async fn register_table(
        &self,
        ctx: &SessionContext,
        table: TableReference,
        source: TableSource,
    ) -> Result<()>;

    async fn deregister_table(&self, ctx: &SessionContext, table: TableReference) -> Result<()>;
}

pub struct ListingTableRegistry;

/// Decodes a partition directory value into the column's type. The null key
/// directory, and an empty value, read back as null.
pub fn partition_value(name: &str, data_type: &DataType) -> Result<Expr> {
    let is_null_key = ident(name)
        .eq(lit(NULL_PARTITION_VALUE))
        .or(ident(name).eq(lit("")));

    let value = when(is_null_key, cast(lit(ScalarValue::Null), data_type.clone()))
        .otherwise(cast(ident(name), data_type.clone()))?;
    Ok(value)
}

pub fn file_format(format: StorageFormat) -> Arc<dyn FileFormat> {
    match format {
        StorageFormat::Parquet => Arc::new(ParquetFormat::default()),
        StorageFormat::Csv => Arc::new(CsvFormat::default().with_has_header(true)),
        StorageFormat::Json => Arc::new(JsonFormat::default()),
    }
}

#[async_trait]
impl TableRegistry for ListingTableRegistry {
    async fn register_table(
        &self,
        ctx: &SessionContext,
        table: TableReference,
        source: TableSource,
    ) -> Result<()> {
        // partition values are listed as raw directory strings
        let listed_cols = source
            .partition_cols
            .iter()
            .map(|(name, _)| (name.clone(), DataType::Utf8))
            .collect();

        let options = ListingOptions::new(file_format(source.format))
            .with_file_extension(source.format.file_extension())
            .with_table_partition_cols(listed_cols)
            .with_collect_stat(true);

        let config = ListingTableConfig::new(source.url)
            .with_listing_options(options)
            .with_schema(source.file_schema);

        let listing: Arc<dyn TableProvider> = Arc::new(ListingTable::try_new(config)?);
        let provider = if source.partition_cols.is_empty() {
            listing
        } else {
            let mut df = ctx.read_table(listing)?;
            for (name, data_type) in &source.partition_cols {
                df = df.with_column(name, partition_value(name, data_type)?)?;
            }
            df.into_view()
        };

        ctx.register_table(table.clone(), provider)
            .map_err(|e| common::Error::Other(format!("Failed to register {}: {}", table, e)))?;
        Ok(())
    }

    async fn deregister_table(&self, ctx: &SessionContext, table: TableReference) -> Result<()> {
        ctx.deregister_table(table)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;

    #[tokio::test]
    async fn test_partition_value_decodes_null_keys() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "ss_sold_date_sk",
            DataType::Utf8,
            true,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec![
                "2450811",
                NULL_PARTITION_VALUE,
                "",
            ]))],
        )
        .unwrap();

        let ctx = SessionContext::new();
        let df = ctx
            .read_batch(batch)
            .unwrap()
            .select(vec![
                partition_value("ss_sold_date_sk", &DataType::Int32)
                    .unwrap()
                    .alias("ss_sold_date_sk"),
            ])
            .unwrap();
        let batches = df.collect().await.unwrap();

        let keys = batches[0]
            .column(0)
            .as_any()
            .downcast_ref::<Int32Array>()
            .unwrap();
        assert_eq!(keys.value(0), 2450811);
        assert!(keys.is_null(1));
        assert!(keys.is_null(2));
    }
}
