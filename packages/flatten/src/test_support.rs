//! Helpers shared by unit tests.

use crate::config::{FEATURE_NAMESPACE, GEOMETRY_NAMESPACE};

fn wrap(element: &str, body: &str) -> String {
    format!(
        r#"<{element} xmlns="{FEATURE_NAMESPACE}" xmlns:zmn="{GEOMETRY_NAMESPACE}">{body}</{element}>"#
    )
}

/// Wrap `body` in a spatial section declaring both namespaces.
pub fn wrap_geometry(body: &str) -> String {
    wrap("空間属性", body)
}

/// Wrap `body` in a thematic section declaring both namespaces.
pub fn wrap_feature(body: &str) -> String {
    wrap("主題属性", body)
}

/// Build a whole document from its spatial body, thematic body and any
/// further root-level content such as metadata and map sheets.
pub fn wrap_document(spatial: &str, thematic: &str, extra: &str) -> String {
    format!(
        r#"<地図 xmlns="{FEATURE_NAMESPACE}" xmlns:zmn="{GEOMETRY_NAMESPACE}">{extra}<空間属性>{spatial}</空間属性><主題属性>{thematic}</主題属性></地図>"#
    )
}
