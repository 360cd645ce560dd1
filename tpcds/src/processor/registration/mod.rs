use crate::models::schema::{file_schema, table_schema};
use crate::models::{SchemaOptions, StorageFormat, tables};
use crate::processor::DataFusionTables;
use crate::processor::table::TableSource;
use crate::storage::{TableLocation, register_object_store};
use crate::utils::paths::PathBuilder;
use arrow::datatypes::DataType;
use common::{Error, Result};
use datafusion::common::TableReference;
use std::sync::Arc;
use tracing::{debug, info};

/// Finds the hive partition column of `table` from its `column=value` directory names.
///
/// The column keeps its type from the table schema. Directory values, including the
/// one null keys are written under, are decoded when the table is scanned.
pub fn discover_partition_column(
    table: &str,
    options: SchemaOptions,
    directories: &[(String, String)],
) -> Result<Option<(String, DataType)>> {
    let Some((column, _)) = directories.first() else {
        return Ok(None);
    };

    if let Some((other, _)) = directories.iter().find(|(name, _)| name != column) {
        return Err(Error::Storage(format!(
            "Mixed partition columns '{}' and '{}'",
            column, other
        )));
    }

    let schema = table_schema(table, options)?;
    let field = schema.field_with_name(column).map_err(|_| {
        Error::Storage(format!(
            "Partition column '{}' is not a column of {}",
            column, table
        ))
    })?;

    Ok(Some((column.clone(), field.data_type().clone())))
}

impl DataFusionTables {
    pub(crate) async fn register_tables(
        &self,
        location: &str,
        format: &str,
        database_name: &str,
        overwrite: bool,
        discover_partitions: bool,
    ) -> Result<Vec<String>> {
        let format: StorageFormat = format.parse()?;
        register_object_store(&self.ctx, location)?;

        let mut registered = Vec::new();
        for table in tables::all_tables() {
            let path = PathBuilder::new(location).with_table(table).build_table_path();
            let table_location = TableLocation::resolve(&self.ctx, &path)?;

            if !table_location.has_data().await? {
                debug!(table, location = %path, "No data found, not registering");
                continue;
            }

            let reference = TableReference::partial(database_name, table);
            if self.ctx.table_exist(reference.clone())? {
                if !overwrite {
                    info!(table = %reference, "Table already registered, keeping it");
                    continue;
                }
                self.table_registry
                    .deregister_table(&self.ctx, reference.clone())
                    .await?;
            }

            let partition = if discover_partitions {
                let directories = table_location.partition_directories().await?;
                discover_partition_column(table, self.schema_options, &directories)?
            } else {
                None
            };

            let partition_name = partition.as_ref().map(|(column, _)| column.as_str());
            let schema = file_schema(table, self.schema_options, partition_name)?;

            let source = TableSource {
                url: table_location.url().clone(),
                format,
                file_schema: Arc::new(schema),
                partition_cols: partition.clone().into_iter().collect(),
            };

            self.table_registry
                .register_table(&self.ctx, reference.clone(), source)
                .await?;

            info!(
                table = %reference,
                format = %format,
                partition_column = partition_name.unwrap_or("-"),
                "Registered external table"
            );
            registered.push(table.to_string());
        }

        Ok(registered)
    }
}
