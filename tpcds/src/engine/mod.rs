use async_trait::async_trait;
use common::config::Settings;
use common::{Error, Result};
use datafusion::catalog::{CatalogProvider, MemorySchemaProvider};
use datafusion::execution::context::SessionContext;
use datafusion::prelude::SessionConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::info;

static MASTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^local(?:\[(?P<threads>\*|\d+)\])?$").expect("Invalid master regex")
});

/// Where the engine runs. Only in-process execution is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Master {
    /// `local` (1 thread), `local[N]` or `local[*]` (all cores).
    Local { target_partitions: usize },
}

impl Master {
    pub fn parse(master: &str) -> Result<Self> {
        let caps = MASTER_REGEX
            .captures(master.trim())
            .ok_or_else(|| Error::UnsupportedMaster(master.to_string()))?;

        let target_partitions = match caps.name("threads").map(|m| m.as_str()) {
            None => 1,
            Some("*") => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Some(n) => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| Error::UnsupportedMaster(master.to_string()))?,
        };

        Ok(Master::Local { target_partitions })
    }

    pub fn target_partitions(&self) -> usize {
        match self {
            Master::Local { target_partitions } => *target_partitions,
        }
    }
}

/// Database-level commands the driver issues against the engine catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Drops the database and every table in it; a missing database is not an error.
    async fn drop_database(&self, name: &str) -> Result<()>;

    async fn create_database(&self, name: &str) -> Result<()>;
}

/// The engine session for the lifetime of the process.
pub struct EngineSession {
    ctx: Arc<SessionContext>,
    app_name: String,
    master: Master,
}

impl EngineSession {
    pub fn new(master: &str, settings: &Settings) -> Result<Self> {
        let master = Master::parse(master)?;

        let config = SessionConfig::new()
            .with_target_partitions(master.target_partitions())
            .with_batch_size(settings.batch_size)
            .with_information_schema(true);

        let ctx = Arc::new(SessionContext::new_with_config(config));

        info!(
            app_name = %settings.app_name,
            target_partitions = master.target_partitions(),
            session_id = %ctx.session_id(),
            "Engine session started"
        );

        Ok(Self {
            ctx,
            app_name: settings.app_name.clone(),
            master,
        })
    }

    pub fn context(&self) -> Arc<SessionContext> {
        Arc::clone(&self.ctx)
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn master(&self) -> Master {
        self.master
    }

    fn default_catalog(&self) -> Result<Arc<dyn CatalogProvider>> {
        let name = self.ctx.copied_config().options().catalog.default_catalog.clone();
        self.ctx
            .catalog(&name)
            .ok_or_else(|| Error::Other(format!("Default catalog '{}' is not registered", name)))
    }
}

#[async_trait]
impl Catalog for EngineSession {
    async fn drop_database(&self, name: &str) -> Result<()> {
        let catalog = self.default_catalog()?;
        match catalog.deregister_schema(name, true)? {
            Some(_) => info!(database = name, "Dropped database"),
            None => info!(database = name, "Database did not exist, nothing to drop"),
        }
        Ok(())
    }

    async fn create_database(&self, name: &str) -> Result<()> {
        let catalog = self.default_catalog()?;
        if catalog.schema(name).is_some() {
            return Err(Error::InvalidInput(format!(
                "Database '{}' already exists",
                name
            )));
        }
        catalog.register_schema(name, Arc::new(MemorySchemaProvider::new()))?;
        info!(database = name, "Created database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafusion::arrow::array::Int32Array;
    use datafusion::arrow::datatypes::{DataType, Field, Schema};
    use datafusion::arrow::record_batch::RecordBatch;
    use datafusion::common::TableReference;
    use datafusion::datasource::MemTable;

    #[test]
    fn test_parse_local_masters() {
        assert_eq!(Master::parse("local").unwrap().target_partitions(), 1);
        assert_eq!(Master::parse("local[4]").unwrap().target_partitions(), 4);
        assert!(Master::parse("local[*]").unwrap().target_partitions() >= 1);
    }

    #[test]
    fn test_reject_unsupported_masters() {
        for master in ["spark://host:7077", "yarn", "local[0]", "local[]", "local[x]", ""] {
            assert!(
                matches!(Master::parse(master), Err(Error::UnsupportedMaster(_))),
                "accepted {}",
                master
            );
        }
    }

    fn session() -> EngineSession {
        EngineSession::new("local[2]", &Settings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_session_uses_master_parallelism() {
        let session = session();
        assert_eq!(session.master(), Master::Local { target_partitions: 2 });
        assert_eq!(session.context().copied_config().target_partitions(), 2);
        assert_eq!(session.app_name(), "TPCDS Data Generation");
    }

    #[tokio::test]
    async fn test_create_then_drop_database() {
        let session = session();
        let name = "tpcds_sf0.1_nodecimal_nodate_nonulls";

        session.drop_database(name).await.unwrap();
        session.create_database(name).await.unwrap();
        assert!(session.default_catalog().unwrap().schema(name).is_some());

        assert!(session.create_database(name).await.is_err());

        session.drop_database(name).await.unwrap();
        assert!(session.default_catalog().unwrap().schema(name).is_none());
    }

    #[tokio::test]
    async fn test_drop_cascades_to_tables() {
        let session = session();
        let name = "tpcds_sf1_nodecimal_nodate_nonulls";
        session.create_database(name).await.unwrap();

        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int32, false)]));
        let batch =
            RecordBatch::try_new(schema.clone(), vec![Arc::new(Int32Array::from(vec![1, 2]))])
                .unwrap();
        let table = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
        session
            .context()
            .register_table(TableReference::partial(name, "reason"), Arc::new(table))
            .unwrap();

        session.drop_database(name).await.unwrap();
        session.create_database(name).await.unwrap();

        let catalog = session.default_catalog().unwrap();
        assert!(catalog.schema(name).unwrap().table_names().is_empty());
    }
}
