//! Configuration constants and validation functions for the flattener.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{FlattenError, Result};

/// Namespace of the thematic (feature) elements: 筆, 筆界点, 図郭, ...
pub const FEATURE_NAMESPACE: &str = "http://www.moj.go.jp/MINJI/tizuxml";

/// Namespace of the spatial primitives: GM_Point, GM_Curve, GM_Surface, ...
pub const GEOMETRY_NAMESPACE: &str = "http://www.moj.go.jp/MINJI/tizuzumen";

/// Field delimiter of the flattened output tables.
pub const OUTPUT_DELIMITER: char = '\t';

/// File extension of the flattened output tables.
pub const OUTPUT_EXTENSION: &str = "tsv";

/// Environment variable overriding the worker count.
pub const WORKERS_ENV: &str = "MOJXML_WORKERS";

/// Batch label pattern. The label ends up in output file names.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BATCH_LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid regex"));

/// Validate a batch label (e.g. a publication name such as `202404`).
///
/// # Examples
/// ```
/// use mojxml_flatten::config::validate_batch_label;
///
/// assert!(validate_batch_label("202404").is_ok());
/// assert!(validate_batch_label("../etc").is_err());
/// ```
pub fn validate_batch_label(label: &str) -> Result<()> {
    if BATCH_LABEL_PATTERN.is_match(label) {
        Ok(())
    } else {
        Err(FlattenError::InvalidBatchLabel(label.to_string()))
    }
}

/// Worker count used when neither the CLI nor the environment sets one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Parse a worker count, rejecting zero.
pub fn parse_workers(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(FlattenError::InvalidConfig(format!(
            "worker count must be a positive integer, got '{value}'"
        ))),
    }
}

/// Settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub batch_label: String,
    pub output_dir: PathBuf,
    pub workers: usize,
}

/// Pick the worker count: an explicit value wins over the environment,
/// which wins over the default. The environment value is only parsed when
/// no explicit value is given.
pub fn resolve_workers(explicit: Option<usize>, env_value: Option<&str>) -> Result<usize> {
    match (explicit, env_value) {
        (Some(0), _) => Err(FlattenError::InvalidConfig(
            "worker count must be at least 1".into(),
        )),
        (Some(n), _) => Ok(n),
        (None, Some(value)) => parse_workers(value),
        (None, None) => Ok(default_workers()),
    }
}

impl RunConfig {
    /// Build a run configuration.
    ///
    /// `workers` overrides `MOJXML_WORKERS`; without either, all available
    /// cores are used.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        batch_label: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        workers: Option<usize>,
    ) -> Result<Self> {
        let batch_label = batch_label.into();
        validate_batch_label(&batch_label)?;

        let env_value = std::env::var(WORKERS_ENV).ok();
        let workers = resolve_workers(workers, env_value.as_deref())?;

        Ok(Self {
            input_dir: input_dir.into(),
            batch_label,
            output_dir: output_dir.into(),
            workers,
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self> {
        self.workers = resolve_workers(Some(workers), None)?;
        Ok(self)
    }
}

/// Build the output path for one table of a batch.
pub fn table_path(dir: &Path, batch_label: &str, stem: &str) -> PathBuf {
    dir.join(format!("{batch_label}_{stem}.{OUTPUT_EXTENSION}"))
}
