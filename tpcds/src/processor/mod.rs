mod generate;
pub mod registration;
pub mod statistics;
pub mod table;

pub use generate::GenerationMarker;
pub use statistics::{ColumnStatistics, TableStatistics};
pub use table::{ListingTableRegistry, TableRegistry};

use async_trait::async_trait;
use common::Result;
use common::config::Settings;
use datafusion::execution::context::SessionContext;
use std::path::PathBuf;
use std::sync::Arc;

use crate::generator::Dsdgen;
use crate::models::{SchemaOptions, TableFilter};

/// Options of one `gen_data` call.
#[derive(Debug, Clone)]
pub struct GenDataRequest<'a> {
    pub location: &'a str,
    pub format: &'a str,
    pub overwrite: bool,
    pub partition_tables: bool,
    pub cluster_by_partition_columns: bool,
    pub filter_out_null_partition_values: bool,
    pub table_filter: &'a TableFilter,
    pub num_partitions: u32,
}

/// Generates, registers and analyzes the TPC-DS tables.
#[async_trait]
pub trait TpcdsTables: Send + Sync {
    /// Runs the generator and writes each table below `request.location`.
    async fn gen_data(&self, request: GenDataRequest<'_>) -> Result<()>;

    /// Registers every table found below `location` in `database_name`.
    /// Returns the registered table names.
    async fn create_external_tables(
        &self,
        location: &str,
        format: &str,
        database_name: &str,
        overwrite: bool,
        discover_partitions: bool,
    ) -> Result<Vec<String>>;

    async fn analyze_tables(
        &self,
        database_name: &str,
        analyze_columns: bool,
    ) -> Result<Vec<TableStatistics>>;
}

/// [`TpcdsTables`] over a DataFusion session.
pub struct DataFusionTables {
    pub(crate) ctx: Arc<SessionContext>,
    pub(crate) dsdgen: Dsdgen,
    pub(crate) scale_factor: String,
    pub(crate) schema_options: SchemaOptions,
    pub(crate) staging_dir: Option<PathBuf>,
    pub(crate) table_registry: Arc<dyn TableRegistry>,
}

impl DataFusionTables {
    pub fn new(
        ctx: Arc<SessionContext>,
        dsdgen_dir: &str,
        scale_factor: &str,
        schema_options: SchemaOptions,
        settings: &Settings,
    ) -> Self {
        Self {
            ctx,
            dsdgen: Dsdgen::new(dsdgen_dir, scale_factor, settings.max_concurrent_generators),
            scale_factor: scale_factor.to_string(),
            schema_options,
            staging_dir: settings.staging_dir.as_ref().map(PathBuf::from),
            table_registry: Arc::new(ListingTableRegistry),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }
}

#[async_trait]
impl TpcdsTables for DataFusionTables {
    async fn gen_data(&self, request: GenDataRequest<'_>) -> Result<()> {
        self.generate_tables(&request).await
    }

    async fn create_external_tables(
        &self,
        location: &str,
        format: &str,
        database_name: &str,
        overwrite: bool,
        discover_partitions: bool,
    ) -> Result<Vec<String>> {
        self.register_tables(location, format, database_name, overwrite, discover_partitions)
            .await
    }

    async fn analyze_tables(
        &self,
        database_name: &str,
        analyze_columns: bool,
    ) -> Result<Vec<TableStatistics>> {
        self.compute_statistics(database_name, analyze_columns).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::models::tables::NULL_PARTITION_VALUE;
    use crate::storage::TableLocation;
    use crate::test_utils::{FAKE_DSDGEN, install_fake_dsdgen};
    use arrow::datatypes::DataType;
    use datafusion::catalog::MemorySchemaProvider;
    use datafusion::common::TableReference;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use std::path::{Path, PathBuf};

    /// Options of one fixture generation pass.
    #[derive(Clone, Copy)]
    struct Run {
        format: &'static str,
        overwrite: bool,
        partition_tables: bool,
        cluster: bool,
        filter_nulls: bool,
    }

    impl Default for Run {
        fn default() -> Self {
            Self {
                format: "parquet",
                overwrite: false,
                partition_tables: true,
                cluster: true,
                filter_nulls: true,
            }
        }
    }

    struct Fixture {
        _tools: tempfile::TempDir,
        output: tempfile::TempDir,
        tables: DataFusionTables,
    }

    impl Fixture {
        fn new() -> Self {
            let tools = tempfile::tempdir().unwrap();
            install_fake_dsdgen(tools.path(), FAKE_DSDGEN);
            let output = tempfile::tempdir().unwrap();

            let tables = DataFusionTables::new(
                Arc::new(SessionContext::new()),
                tools.path().to_str().unwrap(),
                "1",
                SchemaOptions::default(),
                &Settings::default(),
            );

            Self {
                _tools: tools,
                output,
                tables,
            }
        }

        fn location(&self) -> String {
            self.output.path().to_string_lossy().into_owned()
        }

        fn table_dir(&self, table: &str) -> PathBuf {
            self.output.path().join(table)
        }

        async fn generate(&self, run: Run) {
            let location = self.location();
            let filter = TableFilter::all();
            self.tables
                .gen_data(GenDataRequest {
                    location: &location,
                    format: run.format,
                    overwrite: run.overwrite,
                    partition_tables: run.partition_tables,
                    cluster_by_partition_columns: run.cluster,
                    filter_out_null_partition_values: run.filter_nulls,
                    table_filter: &filter,
                    num_partitions: 2,
                })
                .await
                .unwrap();
        }

        /// Registers everything under the output root in a fresh `tpcds` database.
        async fn register(&self, format: &str) -> Vec<String> {
            self.tables
                .context()
                .catalog("datafusion")
                .unwrap()
                .register_schema("tpcds", Arc::new(MemorySchemaProvider::new()))
                .unwrap();

            let mut registered = self
                .tables
                .create_external_tables(&self.location(), format, "tpcds", true, true)
                .await
                .unwrap();
            registered.sort();
            registered
        }

        async fn column_type(&self, table: &str, column: &str) -> DataType {
            let df = self
                .tables
                .context()
                .table(TableReference::partial("tpcds", table))
                .await
                .unwrap();
            df.schema()
                .field_with_unqualified_name(column)
                .unwrap()
                .data_type()
                .clone()
        }

        async fn statistics(&self, table: &str) -> TableStatistics {
            self.tables
                .analyze_tables("tpcds", true)
                .await
                .unwrap()
                .into_iter()
                .find(|stats| stats.table == table)
                .unwrap()
        }

        async fn marker(&self, table: &str) -> GenerationMarker {
            let path = format!("{}/{}/", self.location(), table);
            TableLocation::resolve(self.tables.context(), &path)
                .unwrap()
                .get_json(generate::SUCCESS_MARKER)
                .await
                .unwrap()
        }
    }

    fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
        let mut files: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == extension))
            .collect();
        files.sort();
        files
    }

    fn partition_dirs(dir: &Path) -> Vec<String> {
        let mut dirs: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap())
            .filter(|entry| entry.file_type().unwrap().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        dirs.sort();
        dirs
    }

    fn column<'a>(stats: &'a TableStatistics, name: &str) -> &'a ColumnStatistics {
        stats.column_stats.iter().find(|c| c.name == name).unwrap()
    }

    #[tokio::test]
    async fn test_generate_register_analyze() {
        let fixture = Fixture::new();
        fixture.generate(Run::default()).await;

        let reason_files = files_with_extension(&fixture.table_dir("reason"), "parquet");
        assert_eq!(reason_files.len(), 1);
        let reader =
            SerializedFileReader::new(std::fs::File::open(&reason_files[0]).unwrap()).unwrap();
        assert_eq!(reader.metadata().file_metadata().num_rows(), 4);

        assert_eq!(
            partition_dirs(&fixture.table_dir("store_sales")),
            vec!["ss_sold_date_sk=2450811", "ss_sold_date_sk=2450812"]
        );

        let marker = fixture.marker("store_sales").await;
        assert_eq!(marker.rows, 2);
        assert_eq!(marker.partition_column.as_deref(), Some("ss_sold_date_sk"));
        assert_eq!(fixture.marker("reason").await.rows, 4);

        assert_eq!(fixture.register("parquet").await, vec!["reason", "store_sales"]);
        assert_eq!(
            fixture.column_type("store_sales", "ss_sold_date_sk").await,
            DataType::Int32
        );

        let stats = fixture.tables.analyze_tables("tpcds", false).await.unwrap();
        let counts: Vec<_> = stats
            .iter()
            .map(|s| (s.table.as_str(), s.record_count))
            .collect();
        assert_eq!(counts, vec![("reason", 4), ("store_sales", 2)]);
    }

    #[tokio::test]
    async fn test_kept_null_partition_keys_read_back_as_null() {
        let fixture = Fixture::new();
        fixture
            .generate(Run {
                filter_nulls: false,
                ..Run::default()
            })
            .await;

        assert_eq!(fixture.marker("store_sales").await.rows, 4);
        assert!(
            fixture
                .table_dir("store_sales")
                .join(format!("ss_sold_date_sk={NULL_PARTITION_VALUE}"))
                .is_dir()
        );

        fixture.register("parquet").await;
        assert_eq!(
            fixture.column_type("store_sales", "ss_sold_date_sk").await,
            DataType::Int32
        );

        let sales = fixture.statistics("store_sales").await;
        assert_eq!(sales.record_count, 4);
        let key = column(&sales, "ss_sold_date_sk");
        // one null-keyed row per dsdgen child
        assert_eq!(key.null_count, 2);
        assert_eq!(key.distinct_count, 2);
        assert_eq!(key.min_value.as_deref(), Some("2450811"));
        assert_eq!(key.max_value.as_deref(), Some("2450812"));
    }

    #[tokio::test]
    async fn test_unpartitioned_fact_tables() {
        let fixture = Fixture::new();
        fixture
            .generate(Run {
                partition_tables: false,
                ..Run::default()
            })
            .await;

        let sales_dir = fixture.table_dir("store_sales");
        assert!(partition_dirs(&sales_dir).is_empty());
        assert!(!files_with_extension(&sales_dir, "parquet").is_empty());
        assert_eq!(fixture.marker("store_sales").await.partition_column, None);

        fixture.register("parquet").await;
        assert_eq!(
            fixture.column_type("store_sales", "ss_sold_date_sk").await,
            DataType::Int32
        );

        // null filtering only applies to partitioned writes
        let sales = fixture.statistics("store_sales").await;
        assert_eq!(sales.record_count, 4);
        assert_eq!(column(&sales, "ss_sold_date_sk").null_count, 2);
    }

    #[tokio::test]
    async fn test_partitioned_write_without_clustering() {
        let fixture = Fixture::new();
        fixture
            .generate(Run {
                cluster: false,
                ..Run::default()
            })
            .await;

        assert_eq!(
            partition_dirs(&fixture.table_dir("store_sales")),
            vec!["ss_sold_date_sk=2450811", "ss_sold_date_sk=2450812"]
        );

        fixture.register("parquet").await;
        let sales = fixture.statistics("store_sales").await;
        assert_eq!(sales.record_count, 2);
        assert_eq!(column(&sales, "ss_sold_date_sk").null_count, 0);
    }

    #[tokio::test]
    async fn test_csv_and_json_round_trip() {
        for format in ["csv", "json"] {
            let fixture = Fixture::new();
            fixture
                .generate(Run {
                    format,
                    ..Run::default()
                })
                .await;

            assert_eq!(files_with_extension(&fixture.table_dir("reason"), format).len(), 1);
            assert_eq!(fixture.register(format).await, vec!["reason", "store_sales"]);

            let reason = fixture.statistics("reason").await;
            assert_eq!(reason.record_count, 4, "{format}");

            let sales = fixture.statistics("store_sales").await;
            assert_eq!(sales.record_count, 2, "{format}");
            let profit = column(&sales, "ss_net_profit");
            assert_eq!(profit.min_value.as_deref(), Some("0.75"), "{format}");
            assert_eq!(profit.max_value.as_deref(), Some("0.75"), "{format}");
        }
    }

    #[tokio::test]
    async fn test_existing_data_is_kept_without_overwrite() {
        let fixture = Fixture::new();
        fixture.generate(Run::default()).await;
        let first = fixture.marker("reason").await;

        fixture.generate(Run::default()).await;
        assert_eq!(fixture.marker("reason").await, first);

        fixture
            .generate(Run {
                overwrite: true,
                ..Run::default()
            })
            .await;
        let replaced = fixture.marker("reason").await;
        assert_ne!(replaced.generated_at, first.generated_at);
        assert_eq!(files_with_extension(&fixture.table_dir("reason"), "parquet").len(), 1);
    }
}
