//! Parallel batch runner: one worker owns one document from read to emit.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::archive::ArchiveReader;
use crate::document::flatten_document;
use crate::error::{FlattenError, Result, Stage};
use crate::sink::RecordSink;
use crate::types::Table;

/// Cooperative cancellation flag, checked before each document starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_label: String,
    pub workers: usize,
}

/// A document that was skipped because it could not be flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub document_id: String,
    pub stage: Stage,
    pub message: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub batch_label: String,
    pub succeeded: usize,
    /// Failed documents, in listing order.
    pub failed: Vec<DocumentFailure>,
    /// Documents never started because the run was cancelled.
    pub cancelled: usize,
    pub rows: BTreeMap<Table, usize>,
}

impl BatchReport {
    fn new(batch_label: &str) -> Self {
        Self {
            batch_label: batch_label.to_string(),
            succeeded: 0,
            failed: Vec::new(),
            cancelled: 0,
            rows: Table::ALL.iter().map(|&table| (table, 0)).collect(),
        }
    }

    /// Number of documents considered by the run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len() + self.cancelled
    }
}

enum Outcome {
    Flattened(BTreeMap<Table, usize>),
    Failed(DocumentFailure),
    Cancelled,
}

/// Flatten every document the reader lists into the sink.
pub fn run_batch(
    reader: &dyn ArchiveReader,
    sink: &dyn RecordSink,
    options: &BatchOptions,
    cancel: &CancelToken,
) -> Result<BatchReport> {
    let ids = reader.list()?;
    run_documents(reader, &ids, sink, options, cancel, |_| {})
}

/// Flatten the given documents into the sink.
///
/// Failures of a single document (read, parse or extraction) are recorded in
/// the report and the run continues. A sink failure aborts the run, since
/// the output could no longer be trusted. `on_document` is called once per
/// document that was started, from the worker thread that handled it.
pub fn run_documents<F>(
    reader: &dyn ArchiveReader,
    ids: &[String],
    sink: &dyn RecordSink,
    options: &BatchOptions,
    cancel: &CancelToken,
    on_document: F,
) -> Result<BatchReport>
where
    F: Fn(&str) + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()?;

    tracing::info!(
        batch = %options.batch_label,
        documents = ids.len(),
        workers = options.workers,
        "Starting batch"
    );

    let outcomes = pool.install(|| {
        ids.par_iter()
            .map(|id| {
                if cancel.is_cancelled() {
                    return Ok(Outcome::Cancelled);
                }
                let outcome = process_document(reader, sink, id, &options.batch_label);
                on_document(id);
                outcome
            })
            .collect::<Result<Vec<_>>>()
    })?;

    sink.finish()?;

    let mut report = BatchReport::new(&options.batch_label);
    for outcome in outcomes {
        match outcome {
            Outcome::Flattened(rows) => {
                report.succeeded += 1;
                for (table, count) in rows {
                    *report.rows.entry(table).or_default() += count;
                }
            }
            Outcome::Failed(failure) => report.failed.push(failure),
            Outcome::Cancelled => report.cancelled += 1,
        }
    }

    tracing::info!(
        batch = %report.batch_label,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        cancelled = report.cancelled,
        "Finished batch"
    );

    Ok(report)
}

fn process_document(
    reader: &dyn ArchiveReader,
    sink: &dyn RecordSink,
    document_id: &str,
    batch_label: &str,
) -> Result<Outcome> {
    let failed = |stage: Stage, message: String| -> Result<Outcome> {
        tracing::warn!(document_id, stage = %stage, error = %message, "Skipping document");
        Ok(Outcome::Failed(DocumentFailure {
            document_id: document_id.to_string(),
            stage,
            message,
        }))
    };

    let text = match reader.read(document_id) {
        Ok(text) => text,
        Err(e) => return failed(Stage::Read, e.to_string()),
    };

    let doc = match roxmltree::Document::parse(&text) {
        Ok(doc) => doc,
        Err(e) => return failed(Stage::Parse, FlattenError::from(e).to_string()),
    };

    let records = match flatten_document(&doc, document_id, batch_label) {
        Ok(records) => records,
        Err(e) => return failed(e.stage, e.source.to_string()),
    };

    for batch in records.batches() {
        sink.write_batch(&batch)?;
    }

    tracing::debug!(document_id, "Document flattened");
    Ok(Outcome::Flattened(
        Table::ALL
            .iter()
            .map(|&table| (table, records.row_count(table)))
            .collect(),
    ))
}
