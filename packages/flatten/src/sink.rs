//! Destinations for tagged row batches.
//!
//! A sink receives whole batches from concurrent workers. Each batch is
//! written atomically with respect to other batches of the same table:
//! rows of two documents never interleave.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::{table_path, OUTPUT_DELIMITER};
use crate::error::{FlattenError, Result};
use crate::types::{RecordBatch, Table};

/// Receives tagged row batches.
pub trait RecordSink: Sync {
    /// Append every row of `batch` to its table.
    fn write_batch(&self, batch: &RecordBatch) -> Result<()>;

    /// Flush buffered output once all batches have been written.
    fn finish(&self) -> Result<()> {
        Ok(())
    }
}

/// Writes one delimited text file per table: `<dir>/<label>_<stem>.tsv`.
///
/// Files are truncated on creation. Values are written verbatim except that
/// the delimiter and line breaks inside a value become spaces. No header
/// row is written.
#[derive(Debug)]
pub struct TsvSink {
    writers: HashMap<Table, Mutex<BufWriter<File>>>,
    paths: BTreeMap<Table, PathBuf>,
}

impl TsvSink {
    /// Create (or truncate) the table files of a batch in `dir`.
    pub fn create(dir: &Path, batch_label: &str) -> Result<Self> {
        let mut writers = HashMap::new();
        let mut paths = BTreeMap::new();

        for table in Table::ALL {
            let path = table_path(dir, batch_label, table.file_stem());
            let file = File::create(&path).map_err(|source| FlattenError::Sink { table, source })?;
            writers.insert(table, Mutex::new(BufWriter::new(file)));
            paths.insert(table, path);
        }

        Ok(Self { writers, paths })
    }

    /// Output file of each table.
    pub fn paths(&self) -> &BTreeMap<Table, PathBuf> {
        &self.paths
    }

    fn writer(&self, table: Table) -> Result<&Mutex<BufWriter<File>>> {
        self.writers.get(&table).ok_or_else(|| FlattenError::Sink {
            table,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "table not open"),
        })
    }
}

impl RecordSink for TsvSink {
    fn write_batch(&self, batch: &RecordBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        // Format outside the lock; only the write itself is serialized.
        let mut buf = String::new();
        for row in &batch.rows {
            format_row(&mut buf, row);
        }

        let table = batch.table;
        let mut writer = self
            .writer(table)?
            .lock()
            .map_err(|_| FlattenError::SinkPoisoned(table))?;
        writer
            .write_all(buf.as_bytes())
            .map_err(|source| FlattenError::Sink { table, source })
    }

    fn finish(&self) -> Result<()> {
        for (&table, writer) in &self.writers {
            writer
                .lock()
                .map_err(|_| FlattenError::SinkPoisoned(table))?
                .flush()
                .map_err(|source| FlattenError::Sink { table, source })?;
        }
        Ok(())
    }
}

fn format_row(buf: &mut String, row: &[String]) {
    for (i, value) in row.iter().enumerate() {
        if i > 0 {
            buf.push(OUTPUT_DELIMITER);
        }
        buf.extend(value.chars().map(|c| match c {
            OUTPUT_DELIMITER | '\n' | '\r' => ' ',
            other => other,
        }));
    }
    buf.push('\n');
}

/// Collects rows in memory, per table, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Mutex<BTreeMap<Table, Vec<Vec<String>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows received so far for `table`.
    pub fn rows(&self, table: Table) -> Vec<Vec<String>> {
        self.tables
            .lock()
            .map(|tables| tables.get(&table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl RecordSink for MemorySink {
    fn write_batch(&self, batch: &RecordBatch) -> Result<()> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| FlattenError::SinkPoisoned(batch.table))?;
        tables
            .entry(batch.table)
            .or_default()
            .extend(batch.rows.iter().cloned());
        Ok(())
    }
}
