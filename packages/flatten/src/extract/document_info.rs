//! Document-level metadata found directly under the root element.

use roxmltree::Node;

use crate::types::DocumentInfo;
use crate::xml::{child_text, feature};

/// Extract the metadata fields of a document. Absent fields are blank.
pub fn extract_document_info(root: Node<'_, '_>) -> DocumentInfo {
    DocumentInfo {
        municipality_name: child_text(root, feature::MUNICIPALITY_NAME),
        municipality_code: child_text(root, feature::MUNICIPALITY_CODE),
        map_name: child_text(root, feature::MAP_NAME),
        coordinate_system: child_text(root, feature::COORDINATE_SYSTEM),
        version: child_text(root, feature::VERSION),
        geodetic_datum: child_text(root, feature::GEODETIC_DATUM),
        conversion_program: child_text(root, feature::CONVERSION_PROGRAM),
        conversion_program_version: child_text(root, feature::CONVERSION_PROGRAM_VERSION),
        conversion_parameter_version: child_text(root, feature::CONVERSION_PARAMETER_VERSION),
    }
}
