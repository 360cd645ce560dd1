use common::Result;
use common::config::Settings;
use std::time::Instant;
use tracing::info;

use crate::engine::{Catalog, EngineSession};
use crate::models::{GenerationConfig, TableFilter};
use crate::processor::{DataFusionTables, GenDataRequest, TpcdsTables};

/// Name of the database the generated tables are registered in, e.g.
/// `tpcds_sf1_nodecimal_withdate_nonulls`.
pub fn database_name(config: &GenerationConfig, scale_factor: &str) -> String {
    let with = |flag: bool| if flag { "with" } else { "no" };
    format!(
        "tpcds_sf{}_{}decimal_{}date_{}nulls",
        scale_factor,
        with(config.use_double_for_decimal()),
        with(config.use_string_for_date()),
        with(!config.filter_out_null_partition_values()),
    )
}

/// Runs a full generation: opens the engine session, then generates, registers
/// and analyzes every TPC-DS table.
pub async fn run(config: &GenerationConfig, settings: &Settings) -> Result<()> {
    let options = config.validate()?;
    let session = EngineSession::new(config.master(), settings)?;

    let tables = DataFusionTables::new(
        session.context(),
        config.dsdgen_dir(),
        options.scale_factor,
        config.schema_options(),
        settings,
    );

    run_with(config, &session, &tables).await
}

pub async fn run_with(
    config: &GenerationConfig,
    catalog: &dyn Catalog,
    tables: &dyn TpcdsTables,
) -> Result<()> {
    let options = config.validate()?;
    let format = options.format.to_string();
    let start = Instant::now();

    let table_filter = TableFilter::all();
    tables
        .gen_data(GenDataRequest {
            location: options.location,
            format: &format,
            overwrite: config.overwrite(),
            partition_tables: config.partition_tables(),
            cluster_by_partition_columns: config.cluster_by_partition_columns(),
            filter_out_null_partition_values: config.filter_out_null_partition_values(),
            table_filter: &table_filter,
            num_partitions: config.num_partitions(),
        })
        .await?;

    let database = database_name(config, options.scale_factor);
    catalog.drop_database(&database).await?;
    catalog.create_database(&database).await?;

    let registered = tables
        .create_external_tables(options.location, &format, &database, true, true)
        .await?;
    info!(database = %database, tables = registered.len(), "Registered tables");

    let statistics = tables.analyze_tables(&database, true).await?;
    let rows: u64 = statistics.iter().map(|stats| stats.record_count).sum();

    info!(
        database = %database,
        tables = statistics.len(),
        rows,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "TPC-DS generation complete"
    );

    Ok(())
}
