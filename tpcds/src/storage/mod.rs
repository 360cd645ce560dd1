use common::{Error, Result};
use datafusion::datasource::listing::ListingTableUrl;
use datafusion::execution::context::SessionContext;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ObjectMeta, ObjectStore, PutPayload};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Makes the object store behind `location` known to the session.
///
/// Local paths and `file://` URLs use the engine's built-in local store. `s3://`
/// buckets are configured from the standard `AWS_*` environment variables.
pub fn register_object_store(ctx: &SessionContext, location: &str) -> Result<()> {
    let url = match Url::parse(location) {
        Ok(url) => url,
        // plain filesystem path
        Err(_) => return Ok(()),
    };

    match url.scheme() {
        "file" => Ok(()),
        // windows drive letters parse as one-letter schemes
        scheme if scheme.len() == 1 => Ok(()),
        "s3" => {
            let bucket = url.host_str().ok_or_else(|| {
                Error::InvalidInput(format!("S3 location '{}' has no bucket", location))
            })?;

            let store = AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .build()?;

            let bucket_url = Url::parse(&format!("s3://{}", bucket))?;
            ctx.runtime_env()
                .register_object_store(&bucket_url, Arc::new(store));
            info!(bucket, "Registered S3 object store");
            Ok(())
        }
        scheme => Err(Error::Storage(format!(
            "Unsupported location scheme '{}' in '{}'",
            scheme, location
        ))),
    }
}

/// A directory in an object store, addressed the way the engine addresses tables.
pub struct TableLocation {
    url: ListingTableUrl,
    store: Arc<dyn ObjectStore>,
}

impl TableLocation {
    pub fn resolve(ctx: &SessionContext, path: &str) -> Result<Self> {
        let url = ListingTableUrl::parse(path)?;
        let store = ctx.runtime_env().object_store(url.object_store())?;
        Ok(Self { url, store })
    }

    pub fn url(&self) -> &ListingTableUrl {
        &self.url
    }

    fn prefix(&self) -> &Path {
        self.url.prefix()
    }

    pub async fn has_data(&self) -> Result<bool> {
        let mut objects = self.store.list(Some(self.prefix()));
        Ok(objects.try_next().await?.is_some())
    }

    /// Deletes every object below the directory. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize> {
        let objects: Vec<ObjectMeta> = self.store.list(Some(self.prefix())).try_collect().await?;

        for object in &objects {
            self.store.delete(&object.location).await?;
        }

        debug!(location = %self.url, removed = objects.len(), "Cleared table directory");
        Ok(objects.len())
    }

    pub async fn put_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let key = self.prefix().child(name);
        let body = serde_json::to_vec_pretty(value)?;
        self.store.put(&key, PutPayload::from(body)).await?;
        Ok(())
    }

    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T> {
        let key = self.prefix().child(name);
        let bytes = self.store.get(&key).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// First-level hive-style `column=value` directories, in listing order.
    pub async fn partition_directories(&self) -> Result<Vec<(String, String)>> {
        let listing = self.store.list_with_delimiter(Some(self.prefix())).await?;

        let partitions = listing
            .common_prefixes
            .iter()
            .filter_map(|dir| dir.filename())
            .filter_map(|name| name.split_once('='))
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();

        Ok(partitions)
    }
}
