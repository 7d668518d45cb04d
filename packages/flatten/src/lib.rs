//! mojxml-flatten - Flatten cadastral map XML documents into tables.
//!
//! A cadastral map document describes spatial primitives (points, curves,
//! surfaces) in one namespace and thematic features (reference points,
//! boundary points, boundary lines, parcels, map sheets) in another, linked
//! by `id`/`idref`. This crate walks one parsed document, resolves those
//! links and produces fixed-field rows per entity, tagged with the batch
//! label and document identifier.
//!
//! # Example
//!
//! ```
//! use mojxml_flatten::{flatten_document, Table};
//!
//! let xml = r#"<地図 xmlns="http://www.moj.go.jp/MINJI/tizuxml">
//!   <空間属性/><主題属性><筆 id="H1"><地番>12</地番><形状 idref="S1"/></筆></主題属性>
//! </地図>"#;
//! let doc = roxmltree::Document::parse(xml).unwrap();
//!
//! let records = flatten_document(&doc, "01202-0001.xml", "202404").unwrap();
//! assert_eq!(records.row_count(Table::Parcels), 1);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`types`]: Record types and output tables
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Namespaced XML accessors
//! - [`extract`]: Per-section extractors
//! - [`document`]: Flattening of one document
//! - [`archive`]: Document sources
//! - [`sink`]: Row batch destinations
//! - [`batch`]: Parallel batch runner
//! - [`cli`]: Command-line interface

pub mod archive;
pub mod batch;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod sink;
pub mod types;
pub mod xml;

#[cfg(test)]
mod test_support;

// Re-export main functions
pub use batch::{run_batch, run_documents, BatchOptions, BatchReport, CancelToken};
pub use document::{flatten_document, DocumentRecords};

// Re-export commonly used items
pub use archive::{ArchiveReader, DirectorySource, InMemorySource};
pub use config::{validate_batch_label, RunConfig};
pub use error::{DocumentError, ExtractError, FlattenError, Result, Stage};
pub use sink::{MemorySink, RecordSink, TsvSink};
pub use types::{Record, RecordBatch, Table};
