//! Map sheets (図郭) and the parcels they depict.

use roxmltree::Node;

use crate::error::ExtractError;
use crate::types::{Coordinate, DateParts, MapSheet, MapSheetParcelRef};
use crate::xml::{child_text, feature, find_child, find_children, geometry, idref, QName};

/// Rows extracted from the map sheets of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSheets {
    pub sheets: Vec<MapSheet>,
    pub parcel_refs: Vec<MapSheetParcelRef>,
}

/// Extract every map sheet under the document root.
///
/// Corners and dates are optional and come out blank when absent; a sheet
/// may reference no parcels at all.
pub fn extract_map_sheets(root: Node<'_, '_>) -> Result<MapSheets, ExtractError> {
    let mut extracted = MapSheets::default();

    for element in find_children(root, feature::MAP_SHEET) {
        let sheet_number = child_text(element, feature::SHEET_NUMBER);

        for reference in find_children(element, feature::PARCEL_REF) {
            let parcel_ref = idref(Some(reference), element, &feature::PARCEL_REF.to_string())?;
            extracted.parcel_refs.push(MapSheetParcelRef {
                sheet_number: sheet_number.clone(),
                parcel_ref: parcel_ref.to_string(),
            });
        }

        extracted.sheets.push(MapSheet {
            sheet_number,
            lower_left: corner(element, feature::LOWER_LEFT),
            upper_left: corner(element, feature::UPPER_LEFT),
            lower_right: corner(element, feature::LOWER_RIGHT),
            upper_right: corner(element, feature::UPPER_RIGHT),
            scale_denominator: child_text(element, feature::SCALE_DENOMINATOR),
            orientation_unknown_flag: child_text(element, feature::ORIENTATION_UNKNOWN),
            map_type: child_text(element, feature::MAP_TYPE),
            map_category: child_text(element, feature::MAP_CATEGORY),
            material: child_text(element, feature::MAP_MATERIAL),
            created: date(element, feature::CREATED_ON),
            registered: date(element, feature::REGISTERED_ON),
        });
    }

    Ok(extracted)
}

/// Corner element in the feature namespace holding X/Y in the geometry namespace.
fn corner(sheet: Node<'_, '_>, name: QName) -> Coordinate {
    let element = find_child(sheet, name);
    Coordinate {
        x: child_text(element, geometry::X),
        y: child_text(element, geometry::Y),
    }
}

fn date(sheet: Node<'_, '_>, name: QName) -> DateParts {
    let element = find_child(sheet, name);
    DateParts {
        year: child_text(element, feature::YEAR),
        month: child_text(element, feature::MONTH),
        day: child_text(element, feature::DAY),
    }
}
