//! Error types for the flattener.
//!
//! Two layers: `ExtractError` describes a structural defect found while
//! walking one document and is always fatal to that document only;
//! `FlattenError` is the library error for everything around the engine
//! (archives, sinks, configuration).

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::Table;

/// A structural defect in one document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A feature that must carry a cross-reference does not.
    #[error("{element} has no {reference} reference")]
    MissingReference { element: String, reference: String },

    /// A reference points at an identifier absent from its lookup table.
    #[error("{element} references unknown {target} '{reference}'")]
    DanglingReference {
        element: String,
        target: &'static str,
        reference: String,
    },

    /// A fixed geometry descent is broken partway.
    #[error("malformed geometry {element}: missing <{missing}>")]
    MalformedGeometry { element: String, missing: String },

    /// A top-level container of the document is absent.
    #[error("document has no <{section}> section")]
    MissingSection { section: String },

    /// A spatial primitive or parcel has no `id` attribute.
    #[error("{element} has no id attribute")]
    MissingIdentifier { element: String },
}

/// Pipeline stage a document was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Read,
    Parse,
    /// Locating the spatial and thematic containers.
    Sections,
    Points,
    Curves,
    Surfaces,
    ReferencePoints,
    BoundaryPoints,
    BoundaryLines,
    ProvisionalAdminLines,
    Parcels,
    MapSheets,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Parse => "parse",
            Self::Sections => "sections",
            Self::Points => "points",
            Self::Curves => "curves",
            Self::Surfaces => "surfaces",
            Self::ReferencePoints => "reference_points",
            Self::BoundaryPoints => "boundary_points",
            Self::BoundaryLines => "boundary_lines",
            Self::ProvisionalAdminLines => "provisional_admin_lines",
            Self::Parcels => "parcels",
            Self::MapSheets => "map_sheets",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extraction failure tied to the document and stage it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{document_id}: {stage} extraction failed: {source}")]
pub struct DocumentError {
    pub document_id: String,
    pub stage: Stage,
    #[source]
    pub source: ExtractError,
}

/// Main error type for the flattener library.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// Batch label unusable in output file names.
    #[error("Invalid batch label: '{0}'. Expected letters, digits, '_', '-' or '.' (e.g., 202404)")]
    InvalidBatchLabel(String),

    /// Invalid run configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The compressed container could not be read.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The compressed container holds no entries.
    #[error("Archive contains no document: {}", .0.display())]
    EmptyArchive(PathBuf),

    /// Extraction of a single document failed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Writing a batch to an output table failed.
    #[error("Failed to write {table} rows: {source}")]
    Sink {
        table: Table,
        #[source]
        source: std::io::Error,
    },

    /// Another writer panicked while holding an output table.
    #[error("Output table {0} is unusable after a writer panicked")]
    SinkPoisoned(Table),

    /// The worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// Report serialization failed.
    #[error("Report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

/// Result type alias for flattener operations.
pub type Result<T> = std::result::Result<T, FlattenError>;
