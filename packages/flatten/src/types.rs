//! Core record types of the flattened tables.
//!
//! Every record is a fixed-field struct; `Record::fields` renders it in
//! output column order with absent values as empty strings.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::xml::{feature, QName};

/// The output tables, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    DocumentInfo,
    ReferencePoints,
    BoundaryPoints,
    CurveVertices,
    SurfaceEdges,
    BoundaryLines,
    Parcels,
    MapSheets,
    MapSheetParcelRefs,
}

impl Table {
    pub const ALL: [Table; 9] = [
        Self::DocumentInfo,
        Self::ReferencePoints,
        Self::BoundaryPoints,
        Self::CurveVertices,
        Self::SurfaceEdges,
        Self::BoundaryLines,
        Self::Parcels,
        Self::MapSheets,
        Self::MapSheetParcelRefs,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentInfo => "document_info",
            Self::ReferencePoints => "reference_points",
            Self::BoundaryPoints => "boundary_points",
            Self::CurveVertices => "curve_vertices",
            Self::SurfaceEdges => "surface_edges",
            Self::BoundaryLines => "boundary_lines",
            Self::Parcels => "parcels",
            Self::MapSheets => "map_sheets",
            Self::MapSheetParcelRefs => "map_sheet_parcel_refs",
        }
    }

    /// File stem of the table; the numeric prefix keeps files sorted by
    /// section (0x metadata, 1x spatial, 2x thematic, 3x map sheets).
    #[must_use]
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::DocumentInfo => "01document_info",
            Self::ReferencePoints => "11reference_points",
            Self::BoundaryPoints => "12boundary_points",
            Self::CurveVertices => "13curve_vertices",
            Self::SurfaceEdges => "14surface_edges",
            Self::BoundaryLines => "21boundary_lines",
            Self::Parcels => "22parcels",
            Self::MapSheets => "31map_sheets",
            Self::MapSheetParcelRefs => "32map_sheet_parcel_refs",
        }
    }

    /// Column names of the record fields (the two tag columns excluded).
    #[must_use]
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::DocumentInfo => &[
                "municipality_name",
                "municipality_code",
                "map_name",
                "coordinate_system",
                "version",
                "geodetic_datum",
                "conversion_program",
                "conversion_program_version",
                "conversion_parameter_version",
            ],
            Self::ReferencePoints => &[
                "point_label",
                "shape_ref",
                "category",
                "monument_type",
                "x",
                "y",
            ],
            Self::BoundaryPoints => &["point_label", "shape_ref", "x", "y"],
            Self::CurveVertices => &["curve_id", "sequence", "x", "y", "point_ref"],
            Self::SurfaceEdges => &["surface_id", "sequence", "curve_ref"],
            Self::BoundaryLines => &["shape_ref", "line_type", "category"],
            Self::Parcels => &[
                "parcel_id",
                "oaza_code",
                "chome_code",
                "koaza_code",
                "reserve_code",
                "oaza_name",
                "chome_name",
                "koaza_name",
                "reserve_name",
                "lot_number",
                "shape_ref",
                "precision_class",
                "coordinate_value_type",
            ],
            Self::MapSheets => &[
                "sheet_number",
                "lower_left_x",
                "lower_left_y",
                "upper_left_x",
                "upper_left_y",
                "lower_right_x",
                "lower_right_y",
                "upper_right_x",
                "upper_right_y",
                "scale_denominator",
                "orientation_unknown_flag",
                "map_type",
                "map_category",
                "material",
                "created_year",
                "created_month",
                "created_day",
                "registered_year",
                "registered_month",
                "registered_day",
            ],
            Self::MapSheetParcelRefs => &["sheet_number", "parcel_ref"],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row type of one output table.
pub trait Record {
    const TABLE: Table;

    /// Field values in column order.
    fn fields(&self) -> Vec<String>;
}

/// One table's worth of rows from one document, each row already prefixed
/// with `(batch_label, document_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBatch {
    pub table: Table,
    pub rows: Vec<Vec<String>>,
}

impl RecordBatch {
    /// Render `records` as tagged rows.
    pub fn tagged<R: Record>(records: &[R], batch_label: &str, document_id: &str) -> Self {
        let rows = records
            .iter()
            .map(|record| {
                let mut row = Vec::with_capacity(R::TABLE.columns().len() + 2);
                row.push(batch_label.to_string());
                row.push(document_id.to_string());
                row.extend(record.fields());
                row
            })
            .collect();

        Self {
            table: R::TABLE,
            rows,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A coordinate pair as published (text, blank when absent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coordinate {
    pub x: String,
    pub y: String,
}

impl Coordinate {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.x.is_empty() && self.y.is_empty()
    }
}

/// A year/month/day triple kept as raw text (era and partial dates occur).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateParts {
    pub year: String,
    pub month: String,
    pub day: String,
}

/// A shared point of the geometry section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub id: String,
    pub x: String,
    pub y: String,
}

/// Point identifier → point, for one document.
///
/// Insertion follows document order and a duplicate id replaces the earlier
/// point, so the last occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct PointMap {
    points: HashMap<String, Point>,
}

impl PointMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point, returning the one it replaced.
    pub fn insert(&mut self, point: Point) -> Option<Point> {
        self.points.insert(point.id.clone(), point)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Point> {
        self.points.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Document-level metadata (one row per document).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub municipality_name: String,
    pub municipality_code: String,
    pub map_name: String,
    pub coordinate_system: String,
    pub version: String,
    pub geodetic_datum: String,
    pub conversion_program: String,
    pub conversion_program_version: String,
    pub conversion_parameter_version: String,
}

impl Record for DocumentInfo {
    const TABLE: Table = Table::DocumentInfo;

    fn fields(&self) -> Vec<String> {
        vec![
            self.municipality_name.clone(),
            self.municipality_code.clone(),
            self.map_name.clone(),
            self.coordinate_system.clone(),
            self.version.clone(),
            self.geodetic_datum.clone(),
            self.conversion_program.clone(),
            self.conversion_program_version.clone(),
            self.conversion_parameter_version.clone(),
        ]
    }
}

/// One control point of a curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveVertex {
    pub curve_id: String,
    /// 1-based position within the curve.
    pub sequence: u32,
    pub x: String,
    pub y: String,
    /// Shared point referenced by indirect addressing, blank if none.
    pub point_ref: String,
}

impl Record for CurveVertex {
    const TABLE: Table = Table::CurveVertices;

    fn fields(&self) -> Vec<String> {
        vec![
            self.curve_id.clone(),
            self.sequence.to_string(),
            self.x.clone(),
            self.y.clone(),
            self.point_ref.clone(),
        ]
    }
}

/// One member curve of a surface's exterior ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceEdge {
    pub surface_id: String,
    /// 1-based position within the ring.
    pub sequence: u32,
    pub curve_ref: String,
}

impl Record for SurfaceEdge {
    const TABLE: Table = Table::SurfaceEdges;

    fn fields(&self) -> Vec<String> {
        vec![
            self.surface_id.clone(),
            self.sequence.to_string(),
            self.curve_ref.clone(),
        ]
    }
}

/// A survey reference point (基準点).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePoint {
    pub point_label: String,
    pub shape_ref: String,
    pub category: String,
    pub monument_type: String,
    pub x: String,
    pub y: String,
}

impl Record for ReferencePoint {
    const TABLE: Table = Table::ReferencePoints;

    fn fields(&self) -> Vec<String> {
        vec![
            self.point_label.clone(),
            self.shape_ref.clone(),
            self.category.clone(),
            self.monument_type.clone(),
            self.x.clone(),
            self.y.clone(),
        ]
    }
}

/// A parcel boundary point (筆界点).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub point_label: String,
    pub shape_ref: String,
    pub x: String,
    pub y: String,
}

impl Record for BoundaryPoint {
    const TABLE: Table = Table::BoundaryPoints;

    fn fields(&self) -> Vec<String> {
        vec![
            self.point_label.clone(),
            self.shape_ref.clone(),
            self.x.clone(),
            self.y.clone(),
        ]
    }
}

/// The two line features that share the boundary line table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineCategory {
    /// 筆界線
    BoundaryLine,
    /// 仮行政界線
    ProvisionalAdminLine,
}

impl LineCategory {
    /// Label written to the `category` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoundaryLine => "筆界線",
            Self::ProvisionalAdminLine => "仮行政界線",
        }
    }

    /// Feature element carrying this kind of line.
    #[must_use]
    pub fn element(&self) -> QName {
        match self {
            Self::BoundaryLine => feature::BOUNDARY_LINE,
            Self::ProvisionalAdminLine => feature::PROVISIONAL_ADMIN_LINE,
        }
    }
}

/// A boundary line or provisional administrative line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLine {
    pub shape_ref: String,
    pub line_type: String,
    pub category: LineCategory,
}

impl Record for BoundaryLine {
    const TABLE: Table = Table::BoundaryLines;

    fn fields(&self) -> Vec<String> {
        vec![
            self.shape_ref.clone(),
            self.line_type.clone(),
            self.category.as_str().to_string(),
        ]
    }
}

/// A land parcel (筆).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parcel {
    pub parcel_id: String,
    pub oaza_code: String,
    pub chome_code: String,
    pub koaza_code: String,
    pub reserve_code: String,
    pub oaza_name: String,
    pub chome_name: String,
    pub koaza_name: String,
    pub reserve_name: String,
    pub lot_number: String,
    pub shape_ref: String,
    pub precision_class: String,
    pub coordinate_value_type: String,
}

impl Record for Parcel {
    const TABLE: Table = Table::Parcels;

    fn fields(&self) -> Vec<String> {
        vec![
            self.parcel_id.clone(),
            self.oaza_code.clone(),
            self.chome_code.clone(),
            self.koaza_code.clone(),
            self.reserve_code.clone(),
            self.oaza_name.clone(),
            self.chome_name.clone(),
            self.koaza_name.clone(),
            self.reserve_name.clone(),
            self.lot_number.clone(),
            self.shape_ref.clone(),
            self.precision_class.clone(),
            self.coordinate_value_type.clone(),
        ]
    }
}

/// A map sheet (図郭).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSheet {
    pub sheet_number: String,
    pub lower_left: Coordinate,
    pub upper_left: Coordinate,
    pub lower_right: Coordinate,
    pub upper_right: Coordinate,
    pub scale_denominator: String,
    pub orientation_unknown_flag: String,
    pub map_type: String,
    pub map_category: String,
    pub material: String,
    pub created: DateParts,
    pub registered: DateParts,
}

impl Record for MapSheet {
    const TABLE: Table = Table::MapSheets;

    fn fields(&self) -> Vec<String> {
        let mut fields = vec![self.sheet_number.clone()];
        for corner in [
            &self.lower_left,
            &self.upper_left,
            &self.lower_right,
            &self.upper_right,
        ] {
            fields.push(corner.x.clone());
            fields.push(corner.y.clone());
        }
        fields.extend([
            self.scale_denominator.clone(),
            self.orientation_unknown_flag.clone(),
            self.map_type.clone(),
            self.map_category.clone(),
            self.material.clone(),
        ]);
        for date in [&self.created, &self.registered] {
            fields.push(date.year.clone());
            fields.push(date.month.clone());
            fields.push(date.day.clone());
        }
        fields
    }
}

/// Membership of a parcel in a map sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSheetParcelRef {
    pub sheet_number: String,
    pub parcel_ref: String,
}

impl Record for MapSheetParcelRef {
    const TABLE: Table = Table::MapSheetParcelRefs;

    fn fields(&self) -> Vec<String> {
        vec![self.sheet_number.clone(), self.parcel_ref.clone()]
    }
}
