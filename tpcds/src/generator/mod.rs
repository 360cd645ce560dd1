use common::{Error, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

use crate::models::TableFilter;

pub const DSDGEN_BINARY: &str = "dsdgen";

/// Runs the external `dsdgen` binary, one process per child, writing into a
/// staging directory.
#[derive(Debug, Clone)]
pub struct Dsdgen {
    dir: PathBuf,
    scale_factor: String,
    max_concurrent: usize,
}

impl Dsdgen {
    pub fn new(dir: impl Into<PathBuf>, scale_factor: &str, max_concurrent: usize) -> Self {
        Self {
            dir: dir.into(),
            scale_factor: scale_factor.to_string(),
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn binary(&self) -> PathBuf {
        self.dir.join(DSDGEN_BINARY)
    }

    /// Command-line arguments of one child. `parallel == 1` runs a single,
    /// unsplit generation.
    pub fn child_args(
        &self,
        output_dir: &Path,
        child: u32,
        parallel: u32,
        table: Option<&str>,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-SCALE".into(),
            self.scale_factor.clone().into(),
            "-DIR".into(),
            output_dir.as_os_str().to_owned(),
            "-FORCE".into(),
            "Y".into(),
            "-TERMINATE".into(),
            "N".into(),
            "-QUIET".into(),
            "Y".into(),
        ];

        if parallel > 1 {
            args.extend([
                "-PARALLEL".into(),
                parallel.to_string().into(),
                "-CHILD".into(),
                child.to_string().into(),
            ]);
        }

        if let Some(table) = table {
            args.extend(["-TABLE".into(), table.into()]);
        }

        args
    }

    /// Generates every table of `filter` into `output_dir`, split into `parallel` children.
    pub async fn generate(
        &self,
        output_dir: &Path,
        parallel: u32,
        filter: &TableFilter,
    ) -> Result<()> {
        let binary = self.binary();
        if !binary.is_file() {
            return Err(Error::InvalidInput(format!(
                "dsdgen binary not found at {}",
                binary.display()
            )));
        }

        let start = Instant::now();
        let table = filter.single_table();

        stream::iter(1..=parallel)
            .map(|child| self.run_child(output_dir, child, parallel, table))
            .buffer_unordered(self.max_concurrent)
            .try_collect::<Vec<()>>()
            .await?;

        info!(
            scale_factor = %self.scale_factor,
            children = parallel,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dsdgen finished"
        );

        Ok(())
    }

    async fn run_child(
        &self,
        output_dir: &Path,
        child: u32,
        parallel: u32,
        table: Option<&str>,
    ) -> Result<()> {
        let args = self.child_args(output_dir, child, parallel, table);
        debug!(child, ?args, "Starting dsdgen");

        // dsdgen resolves tpcds.idx relative to its working directory
        let output = Command::new(self.binary())
            .current_dir(&self.dir)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Generator {
                child,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(child, "dsdgen child done");
        Ok(())
    }
}

/// Files `dsdgen` staged for `table`: `table.dat` for an unsplit run, or
/// `table_<child>_<parallel>.dat` per child.
pub fn staged_files(staging_dir: &Path, table: &str) -> Result<Vec<PathBuf>> {
    let pattern = Regex::new(&format!(r"^{}(?:_\d+_\d+)?\.dat$", regex::escape(table)))
        .map_err(|e| Error::Other(format!("Invalid staged file pattern for {}: {}", table, e)))?;

    let mut files = Vec::new();
    for entry in std::fs::read_dir(staging_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if pattern.is_match(&name.to_string_lossy()) && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}
