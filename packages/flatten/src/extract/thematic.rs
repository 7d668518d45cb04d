//! Thematic features (主題属性) and their links to spatial primitives.

use roxmltree::Node;

use crate::error::ExtractError;
use crate::types::{
    BoundaryLine, BoundaryPoint, LineCategory, Parcel, Point, PointMap, ReferencePoint,
};
use crate::xml::{child_idref, child_text, describe, feature, find_children, required_id};

/// Extract reference points (基準点), resolving their coordinates.
pub fn extract_reference_points(
    thematic: Node<'_, '_>,
    points: &PointMap,
) -> Result<Vec<ReferencePoint>, ExtractError> {
    find_children(thematic, feature::REFERENCE_POINT)
        .map(|element| -> Result<ReferencePoint, ExtractError> {
            let shape_ref = child_idref(element, feature::SHAPE)?;
            let point = resolve_point(element, shape_ref, points)?;

            Ok(ReferencePoint {
                point_label: child_text(element, feature::NAME),
                shape_ref: shape_ref.to_string(),
                category: child_text(element, feature::REFERENCE_POINT_KIND),
                monument_type: child_text(element, feature::MONUMENT_KIND),
                x: point.x.clone(),
                y: point.y.clone(),
            })
        })
        .collect()
}

/// Extract boundary points (筆界点), resolving their coordinates.
pub fn extract_boundary_points(
    thematic: Node<'_, '_>,
    points: &PointMap,
) -> Result<Vec<BoundaryPoint>, ExtractError> {
    find_children(thematic, feature::BOUNDARY_POINT)
        .map(|element| -> Result<BoundaryPoint, ExtractError> {
            let shape_ref = child_idref(element, feature::SHAPE)?;
            let point = resolve_point(element, shape_ref, points)?;

            Ok(BoundaryPoint {
                point_label: child_text(element, feature::POINT_NUMBER),
                shape_ref: shape_ref.to_string(),
                x: point.x.clone(),
                y: point.y.clone(),
            })
        })
        .collect()
}

/// Extract the line features of one category.
///
/// Boundary lines and provisional administrative lines share their structure;
/// the caller picks which one to read and the category is written as given.
pub fn extract_boundary_lines(
    thematic: Node<'_, '_>,
    category: LineCategory,
) -> Result<Vec<BoundaryLine>, ExtractError> {
    find_children(thematic, category.element())
        .map(|element| -> Result<BoundaryLine, ExtractError> {
            Ok(BoundaryLine {
                shape_ref: child_idref(element, feature::SHAPE)?.to_string(),
                line_type: child_text(element, feature::LINE_KIND),
                category,
            })
        })
        .collect()
}

/// Extract parcels (筆).
pub fn extract_parcels(thematic: Node<'_, '_>) -> Result<Vec<Parcel>, ExtractError> {
    find_children(thematic, feature::PARCEL)
        .map(|element| -> Result<Parcel, ExtractError> {
            Ok(Parcel {
                parcel_id: required_id(element)?.to_string(),
                oaza_code: child_text(element, feature::OAZA_CODE),
                chome_code: child_text(element, feature::CHOME_CODE),
                koaza_code: child_text(element, feature::KOAZA_CODE),
                reserve_code: child_text(element, feature::RESERVE_CODE),
                oaza_name: child_text(element, feature::OAZA_NAME),
                chome_name: child_text(element, feature::CHOME_NAME),
                koaza_name: child_text(element, feature::KOAZA_NAME),
                reserve_name: child_text(element, feature::RESERVE_NAME),
                lot_number: child_text(element, feature::LOT_NUMBER),
                shape_ref: child_idref(element, feature::SHAPE)?.to_string(),
                precision_class: child_text(element, feature::PRECISION_CLASS),
                coordinate_value_type: child_text(element, feature::COORDINATE_VALUE_TYPE),
            })
        })
        .collect()
}

fn resolve_point<'p>(
    element: Node<'_, '_>,
    shape_ref: &str,
    points: &'p PointMap,
) -> Result<&'p Point, ExtractError> {
    points
        .get(shape_ref)
        .ok_or_else(|| ExtractError::DanglingReference {
            element: describe(element),
            target: "point",
            reference: shape_ref.to_string(),
        })
}
