pub mod config;
pub mod schema;
pub mod tables;

pub use config::{GenerationConfig, StorageFormat, ValidatedOptions};
pub use schema::SchemaOptions;
pub use tables::{NON_PARTITIONED_TABLES, PARTITIONED_TABLES, TableFilter};
