use common::{Error, Result};
use std::fmt;
use std::str::FromStr;

use super::schema::SchemaOptions;

pub const DEFAULT_MASTER: &str = "local[*]";
pub const DEFAULT_NUM_PARTITIONS: u32 = 10000;

/// Options of one generation run. Built once from defaults, then copied with
/// overrides via the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    master: String,
    dsdgen_dir: String,
    scale_factor: Option<String>,
    location: Option<String>,
    format: Option<String>,
    use_double_for_decimal: bool,
    use_string_for_date: bool,
    overwrite: bool,
    partition_tables: bool,
    cluster_by_partition_columns: bool,
    filter_out_null_partition_values: bool,
    num_partitions: u32,
}

impl GenerationConfig {
    pub fn new(dsdgen_dir: impl Into<String>) -> Self {
        Self {
            master: DEFAULT_MASTER.to_string(),
            dsdgen_dir: dsdgen_dir.into(),
            scale_factor: None,
            location: None,
            format: None,
            use_double_for_decimal: false,
            use_string_for_date: false,
            overwrite: false,
            partition_tables: true,
            cluster_by_partition_columns: true,
            filter_out_null_partition_values: true,
            num_partitions: DEFAULT_NUM_PARTITIONS,
        }
    }

    pub fn with_master(self, master: impl Into<String>) -> Self {
        Self {
            master: master.into(),
            ..self
        }
    }

    pub fn with_scale_factor(self, scale_factor: impl Into<String>) -> Self {
        Self {
            scale_factor: Some(scale_factor.into()),
            ..self
        }
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..self
        }
    }

    pub fn with_format(self, format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..self
        }
    }

    pub fn with_use_double_for_decimal(self, use_double_for_decimal: bool) -> Self {
        Self {
            use_double_for_decimal,
            ..self
        }
    }

    pub fn with_use_string_for_date(self, use_string_for_date: bool) -> Self {
        Self {
            use_string_for_date,
            ..self
        }
    }

    pub fn with_overwrite(self, overwrite: bool) -> Self {
        Self { overwrite, ..self }
    }

    pub fn with_partition_tables(self, partition_tables: bool) -> Self {
        Self {
            partition_tables,
            ..self
        }
    }

    pub fn with_cluster_by_partition_columns(self, cluster_by_partition_columns: bool) -> Self {
        Self {
            cluster_by_partition_columns,
            ..self
        }
    }

    pub fn with_filter_out_null_partition_values(
        self,
        filter_out_null_partition_values: bool,
    ) -> Self {
        Self {
            filter_out_null_partition_values,
            ..self
        }
    }

    pub fn with_num_partitions(self, num_partitions: u32) -> Self {
        Self {
            num_partitions,
            ..self
        }
    }

    pub fn master(&self) -> &str {
        &self.master
    }

    pub fn dsdgen_dir(&self) -> &str {
        &self.dsdgen_dir
    }

    pub fn scale_factor(&self) -> Option<&str> {
        self.scale_factor.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn use_double_for_decimal(&self) -> bool {
        self.use_double_for_decimal
    }

    pub fn use_string_for_date(&self) -> bool {
        self.use_string_for_date
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn partition_tables(&self) -> bool {
        self.partition_tables
    }

    pub fn cluster_by_partition_columns(&self) -> bool {
        self.cluster_by_partition_columns
    }

    pub fn filter_out_null_partition_values(&self) -> bool {
        self.filter_out_null_partition_values
    }

    pub fn num_partitions(&self) -> u32 {
        self.num_partitions
    }

    pub fn schema_options(&self) -> SchemaOptions {
        SchemaOptions {
            use_double_for_decimal: self.use_double_for_decimal,
            use_string_for_date: self.use_string_for_date,
        }
    }

    /// Checks the options that have no default and must be present before a run.
    pub fn validate(&self) -> Result<ValidatedOptions<'_>> {
        if self.dsdgen_dir.is_empty() {
            return Err(Error::InvalidInput("dsdgenDir must not be empty".into()));
        }
        let scale_factor = self
            .scale_factor()
            .ok_or_else(|| Error::InvalidInput("scaleFactor is required".into()))?;
        let location = self
            .location()
            .ok_or_else(|| Error::InvalidInput("location is required".into()))?;
        let format = self
            .format()
            .ok_or_else(|| Error::InvalidInput("format is required".into()))?
            .parse::<StorageFormat>()?;

        Ok(ValidatedOptions {
            scale_factor,
            location,
            format,
        })
    }
}

/// The required options of a [`GenerationConfig`], checked and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedOptions<'a> {
    pub scale_factor: &'a str,
    pub location: &'a str,
    pub format: StorageFormat,
}

/// Output formats the engine can both write and register as listing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    Parquet,
    Csv,
    Json,
}

impl StorageFormat {
    pub fn file_extension(self) -> &'static str {
        match self {
            StorageFormat::Parquet => ".parquet",
            StorageFormat::Csv => ".csv",
            StorageFormat::Json => ".json",
        }
    }
}

impl FromStr for StorageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "parquet" => Ok(StorageFormat::Parquet),
            "csv" => Ok(StorageFormat::Csv),
            "json" => Ok(StorageFormat::Json),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageFormat::Parquet => "parquet",
            StorageFormat::Csv => "csv",
            StorageFormat::Json => "json",
        };
        f.write_str(name)
    }
}
