//! Extractors, one per section of a cadastral map document.
//!
//! - [`spatial`]: points, curves and surfaces of the geometry namespace
//! - [`thematic`]: reference points, boundary points, lines and parcels
//! - [`map_sheet`]: map sheet metadata and sheet-to-parcel references
//! - [`document_info`]: document-level metadata

pub mod document_info;
pub mod map_sheet;
pub mod spatial;
pub mod thematic;

pub use document_info::extract_document_info;
pub use map_sheet::{extract_map_sheets, MapSheets};
pub use spatial::{extract_curves, extract_points, extract_surfaces};
pub use thematic::{
    extract_boundary_lines, extract_boundary_points, extract_parcels, extract_reference_points,
};
