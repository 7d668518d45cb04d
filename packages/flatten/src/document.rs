//! Flattening of one parsed document into all of its table rows.

use roxmltree::{Document, Node};

use crate::error::{DocumentError, ExtractError, Stage};
use crate::extract::{
    extract_boundary_lines, extract_boundary_points, extract_curves, extract_document_info,
    extract_map_sheets, extract_parcels, extract_points, extract_reference_points,
    extract_surfaces,
};
use crate::types::{
    BoundaryLine, BoundaryPoint, CurveVertex, DocumentInfo, LineCategory, MapSheet,
    MapSheetParcelRef, Parcel, ReferencePoint, RecordBatch, SurfaceEdge, Table,
};
use crate::xml::{feature, find_child, QName};

/// Every row produced from one document, before tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecords {
    pub batch_label: String,
    pub document_id: String,
    pub info: DocumentInfo,
    pub reference_points: Vec<ReferencePoint>,
    pub boundary_points: Vec<BoundaryPoint>,
    pub curve_vertices: Vec<CurveVertex>,
    pub surface_edges: Vec<SurfaceEdge>,
    pub boundary_lines: Vec<BoundaryLine>,
    pub parcels: Vec<Parcel>,
    pub map_sheets: Vec<MapSheet>,
    pub map_sheet_parcel_refs: Vec<MapSheetParcelRef>,
}

impl DocumentRecords {
    /// Tagged row batches, one per table in emission order.
    pub fn batches(&self) -> Vec<RecordBatch> {
        let (label, id) = (self.batch_label.as_str(), self.document_id.as_str());
        Table::ALL
            .iter()
            .map(|table| match table {
                Table::DocumentInfo => {
                    RecordBatch::tagged(std::slice::from_ref(&self.info), label, id)
                }
                Table::ReferencePoints => RecordBatch::tagged(&self.reference_points, label, id),
                Table::BoundaryPoints => RecordBatch::tagged(&self.boundary_points, label, id),
                Table::CurveVertices => RecordBatch::tagged(&self.curve_vertices, label, id),
                Table::SurfaceEdges => RecordBatch::tagged(&self.surface_edges, label, id),
                Table::BoundaryLines => RecordBatch::tagged(&self.boundary_lines, label, id),
                Table::Parcels => RecordBatch::tagged(&self.parcels, label, id),
                Table::MapSheets => RecordBatch::tagged(&self.map_sheets, label, id),
                Table::MapSheetParcelRefs => {
                    RecordBatch::tagged(&self.map_sheet_parcel_refs, label, id)
                }
            })
            .collect()
    }

    /// Number of rows this document contributes to `table`.
    pub fn row_count(&self, table: Table) -> usize {
        match table {
            Table::DocumentInfo => 1,
            Table::ReferencePoints => self.reference_points.len(),
            Table::BoundaryPoints => self.boundary_points.len(),
            Table::CurveVertices => self.curve_vertices.len(),
            Table::SurfaceEdges => self.surface_edges.len(),
            Table::BoundaryLines => self.boundary_lines.len(),
            Table::Parcels => self.parcels.len(),
            Table::MapSheets => self.map_sheets.len(),
            Table::MapSheetParcelRefs => self.map_sheet_parcel_refs.len(),
        }
    }
}

/// Flatten a parsed document.
///
/// Both top-level sections must be present. The extractors then run in a
/// fixed order: the point map first, since reference points and boundary
/// points resolve coordinates through it, then the remaining spatial
/// primitives, the thematic features and the map sheets. The first structural defect aborts the document and is
/// reported with the stage it was found in.
///
/// Flattening does not mutate the tree, so the same document always yields
/// the same records.
pub fn flatten_document(
    doc: &Document<'_>,
    document_id: &str,
    batch_label: &str,
) -> Result<DocumentRecords, DocumentError> {
    let fail = |stage: Stage| {
        move |source: ExtractError| DocumentError {
            document_id: document_id.to_string(),
            stage,
            source,
        }
    };

    let root = doc.root_element();
    let spatial = section(root, feature::SPATIAL).map_err(fail(Stage::Sections))?;
    let thematic = section(root, feature::THEMATIC).map_err(fail(Stage::Sections))?;

    let points = extract_points(spatial).map_err(fail(Stage::Points))?;
    let curve_vertices = extract_curves(spatial).map_err(fail(Stage::Curves))?;
    let surface_edges = extract_surfaces(spatial).map_err(fail(Stage::Surfaces))?;

    let reference_points =
        extract_reference_points(thematic, &points).map_err(fail(Stage::ReferencePoints))?;
    let boundary_points =
        extract_boundary_points(thematic, &points).map_err(fail(Stage::BoundaryPoints))?;
    let mut boundary_lines = extract_boundary_lines(thematic, LineCategory::BoundaryLine)
        .map_err(fail(Stage::BoundaryLines))?;
    boundary_lines.extend(
        extract_boundary_lines(thematic, LineCategory::ProvisionalAdminLine)
            .map_err(fail(Stage::ProvisionalAdminLines))?,
    );
    let parcels = extract_parcels(thematic).map_err(fail(Stage::Parcels))?;
    let sheets = extract_map_sheets(root).map_err(fail(Stage::MapSheets))?;

    tracing::debug!(
        document = document_id,
        points = points.len(),
        curve_vertices = curve_vertices.len(),
        surface_edges = surface_edges.len(),
        parcels = parcels.len(),
        map_sheets = sheets.sheets.len(),
        "Flattened document"
    );

    Ok(DocumentRecords {
        batch_label: batch_label.to_string(),
        document_id: document_id.to_string(),
        info: extract_document_info(root),
        reference_points,
        boundary_points,
        curve_vertices,
        surface_edges,
        boundary_lines,
        parcels,
        map_sheets: sheets.sheets,
        map_sheet_parcel_refs: sheets.parcel_refs,
    })
}

fn section<'a, 'input>(
    root: Node<'a, 'input>,
    name: QName,
) -> Result<Node<'a, 'input>, ExtractError> {
    find_child(root, name).ok_or_else(|| ExtractError::MissingSection {
        section: name.to_string(),
    })
}
