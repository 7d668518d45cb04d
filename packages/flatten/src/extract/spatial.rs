//! Spatial primitives (空間属性): points, curves and surfaces.

use roxmltree::Node;

use crate::error::ExtractError;
use crate::types::{CurveVertex, Point, PointMap, SurfaceEdge};
use crate::xml::{
    child_text, describe, element_children, find_child, find_children, geometry, idref,
    required_id, ElementPath, IDREF_ATTR,
};

/// Build the point map of a document.
///
/// Points are read in document order; a later point with an already seen id
/// replaces the earlier one. A point without a position keeps blank
/// coordinates.
pub fn extract_points(area: Node<'_, '_>) -> Result<PointMap, ExtractError> {
    let mut points = PointMap::new();

    for element in find_children(area, geometry::GM_POINT) {
        let id = required_id(element)?;
        let position = geometry::POINT_POSITION.resolve(element).ok();

        let point = Point {
            id: id.to_string(),
            x: child_text(position, geometry::X),
            y: child_text(position, geometry::Y),
        };

        if points.insert(point).is_some() {
            tracing::debug!(point_id = id, "duplicate point id, keeping the later point");
        }
    }

    Ok(points)
}

/// Flatten every curve into its ordered control points.
///
/// Each vertex carries its direct coordinate (blank if the position is
/// indirect) and, independently, the id of the shared point it refers to
/// (blank if the position is direct). Both may be set.
pub fn extract_curves(area: Node<'_, '_>) -> Result<Vec<CurveVertex>, ExtractError> {
    let mut vertices = Vec::new();

    for curve in find_children(area, geometry::GM_CURVE) {
        let curve_id = required_id(curve)?;
        let control_points = descend(curve, geometry::CURVE_CONTROL_POINTS)?;

        for (column, sequence) in element_children(control_points).zip(1u32..) {
            let direct = find_child(column, geometry::GM_POSITION_DIRECT);
            let point_ref = match geometry::INDIRECT_POINT_REF.resolve(column) {
                Ok(reference) => {
                    let path = geometry::INDIRECT_POINT_REF.to_string();
                    idref(Some(reference), column, &path)?.to_string()
                }
                Err(_) => String::new(),
            };

            vertices.push(CurveVertex {
                curve_id: curve_id.to_string(),
                sequence,
                x: child_text(direct, geometry::X),
                y: child_text(direct, geometry::Y),
                point_ref,
            });
        }
    }

    Ok(vertices)
}

/// Flatten every surface into the ordered curves of its exterior ring.
pub fn extract_surfaces(area: Node<'_, '_>) -> Result<Vec<SurfaceEdge>, ExtractError> {
    let mut edges = Vec::new();

    for surface in find_children(area, geometry::GM_SURFACE) {
        let surface_id = required_id(surface)?;
        let ring = descend(surface, geometry::SURFACE_EXTERIOR_RING)?;

        for (member, sequence) in element_children(ring).zip(1u32..) {
            let curve_ref = idref(Some(member), member, IDREF_ATTR)?;
            edges.push(SurfaceEdge {
                surface_id: surface_id.to_string(),
                sequence,
                curve_ref: curve_ref.to_string(),
            });
        }
    }

    Ok(edges)
}

/// Resolve a fixed geometry path; a broken path is malformed geometry.
fn descend<'a, 'input>(
    owner: Node<'a, 'input>,
    path: ElementPath,
) -> Result<Node<'a, 'input>, ExtractError> {
    path.resolve(owner)
        .map_err(|missing| ExtractError::MalformedGeometry {
            element: describe(owner),
            missing: missing.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::wrap_geometry;
    use roxmltree::Document;

    fn direct(x: &str, y: &str) -> String {
        format!(
            "<zmn:GM_PointArray.column><zmn:GM_Position.direct><zmn:X>{x}</zmn:X><zmn:Y>{y}</zmn:Y></zmn:GM_Position.direct></zmn:GM_PointArray.column>"
        )
    }

    fn indirect(point: &str) -> String {
        format!(
            r#"<zmn:GM_PointArray.column><zmn:GM_Position.indirect><zmn:GM_PointRef.point idref="{point}"/></zmn:GM_Position.indirect></zmn:GM_PointArray.column>"#
        )
    }

    fn curve(id: &str, columns: &[String]) -> String {
        format!(
            r#"<zmn:GM_Curve id="{id}"><zmn:GM_Curve.segment><zmn:GM_LineString><zmn:GM_LineString.controlPoint>{}</zmn:GM_LineString.controlPoint></zmn:GM_LineString></zmn:GM_Curve.segment></zmn:GM_Curve>"#,
            columns.concat()
        )
    }

    fn point(id: &str, x: &str, y: &str) -> String {
        format!(
            r#"<zmn:GM_Point id="{id}"><zmn:GM_Point.position><zmn:DirectPosition><zmn:X>{x}</zmn:X><zmn:Y>{y}</zmn:Y></zmn:DirectPosition></zmn:GM_Point.position></zmn:GM_Point>"#
        )
    }

    fn surface(id: &str, curves: &[&str]) -> String {
        let generators: String = curves
            .iter()
            .map(|c| format!(r#"<zmn:GM_CompositeCurve.generator idref="{c}"/>"#))
            .collect();
        format!(
            r#"<zmn:GM_Surface id="{id}"><zmn:GM_Surface.patch><zmn:GM_Polygon><zmn:GM_Polygon.boundary><zmn:GM_SurfaceBoundary><zmn:GM_SurfaceBoundary.exterior><zmn:GM_Ring>{generators}</zmn:GM_Ring></zmn:GM_SurfaceBoundary.exterior><zmn:GM_SurfaceBoundary.interior><zmn:GM_Ring><zmn:GM_CompositeCurve.generator idref="HOLE"/></zmn:GM_Ring></zmn:GM_SurfaceBoundary.interior></zmn:GM_SurfaceBoundary></zmn:GM_Polygon.boundary></zmn:GM_Polygon></zmn:GM_Surface.patch></zmn:GM_Surface>"#
        )
    }

    #[test]
    fn test_extract_points() {
        let xml = wrap_geometry(&[point("P1", "-1000.5", "2000.25"), point("P2", "3", "4")].concat());
        let doc = Document::parse(&xml).unwrap();

        let points = extract_points(doc.root_element()).unwrap();
        assert_eq!(points.len(), 2);
        let p1 = points.get("P1").unwrap();
        assert_eq!((p1.x.as_str(), p1.y.as_str()), ("-1000.5", "2000.25"));
    }

    #[test]
    fn test_extract_points_last_wins() {
        let xml = wrap_geometry(&[point("P1", "1", "1"), point("P1", "2", "2")].concat());
        let doc = Document::parse(&xml).unwrap();

        let points = extract_points(doc.root_element()).unwrap();
        assert_eq!(points.len(), 1);
        let p1 = points.get("P1").unwrap();
        assert_eq!((p1.x.as_str(), p1.y.as_str()), ("2", "2"));
    }

    #[test]
    fn test_extract_points_without_position() {
        let xml = wrap_geometry(r#"<zmn:GM_Point id="P1"/>"#);
        let doc = Document::parse(&xml).unwrap();

        let points = extract_points(doc.root_element()).unwrap();
        let p1 = points.get("P1").unwrap();
        assert_eq!((p1.x.as_str(), p1.y.as_str()), ("", ""));
    }

    #[test]
    fn test_extract_points_missing_id() {
        let xml = wrap_geometry(r#"<zmn:GM_Point/>"#);
        let doc = Document::parse(&xml).unwrap();

        assert!(matches!(
            extract_points(doc.root_element()),
            Err(ExtractError::MissingIdentifier { .. })
        ));
    }

    #[test]
    fn test_extract_curves_direct_and_indirect() {
        let both = r#"<zmn:GM_PointArray.column><zmn:GM_Position.direct><zmn:X>5</zmn:X><zmn:Y>6</zmn:Y></zmn:GM_Position.direct><zmn:GM_Position.indirect><zmn:GM_PointRef.point idref="P9"/></zmn:GM_Position.indirect></zmn:GM_PointArray.column>"#;
        let xml = wrap_geometry(&curve(
            "C1",
            &[indirect("P1"), direct("1.5", "2.5"), both.to_string()],
        ));
        let doc = Document::parse(&xml).unwrap();

        let vertices = extract_curves(doc.root_element()).unwrap();
        assert_eq!(
            vertices,
            vec![
                CurveVertex {
                    curve_id: "C1".into(),
                    sequence: 1,
                    x: String::new(),
                    y: String::new(),
                    point_ref: "P1".into(),
                },
                CurveVertex {
                    curve_id: "C1".into(),
                    sequence: 2,
                    x: "1.5".into(),
                    y: "2.5".into(),
                    point_ref: String::new(),
                },
                CurveVertex {
                    curve_id: "C1".into(),
                    sequence: 3,
                    x: "5".into(),
                    y: "6".into(),
                    point_ref: "P9".into(),
                },
            ]
        );
    }

    #[test]
    fn test_extract_curves_sequence_resets_per_curve() {
        let xml = wrap_geometry(
            &[
                curve("C1", &[indirect("P1"), indirect("P2")]),
                curve("C2", &[indirect("P2"), indirect("P3"), indirect("P4")]),
            ]
            .concat(),
        );
        let doc = Document::parse(&xml).unwrap();

        let vertices = extract_curves(doc.root_element()).unwrap();
        let keys: Vec<_> = vertices
            .iter()
            .map(|v| (v.curve_id.as_str(), v.sequence))
            .collect();
        assert_eq!(
            keys,
            vec![("C1", 1), ("C1", 2), ("C2", 1), ("C2", 2), ("C2", 3)]
        );
    }

    #[test]
    fn test_extract_curves_indirect_without_point_ref_is_blank() {
        let column = "<zmn:GM_PointArray.column><zmn:GM_Position.indirect/></zmn:GM_PointArray.column>";
        let xml = wrap_geometry(&curve("C1", &[column.to_string()]));
        let doc = Document::parse(&xml).unwrap();

        let vertices = extract_curves(doc.root_element()).unwrap();
        assert_eq!(vertices[0].point_ref, "");
    }

    #[test]
    fn test_extract_curves_point_ref_without_idref() {
        let column = "<zmn:GM_PointArray.column><zmn:GM_Position.indirect><zmn:GM_PointRef.point/></zmn:GM_Position.indirect></zmn:GM_PointArray.column>";
        let xml = wrap_geometry(&curve("C1", &[column.to_string()]));
        let doc = Document::parse(&xml).unwrap();

        assert!(matches!(
            extract_curves(doc.root_element()),
            Err(ExtractError::MissingReference { .. })
        ));
    }

    #[test]
    fn test_extract_curves_broken_descent() {
        let xml = wrap_geometry(
            r#"<zmn:GM_Curve id="C1"><zmn:GM_Curve.segment/></zmn:GM_Curve>"#,
        );
        let doc = Document::parse(&xml).unwrap();

        let err = extract_curves(doc.root_element()).unwrap_err();
        match err {
            ExtractError::MalformedGeometry { element, missing } => {
                assert!(element.starts_with("<GM_Curve id=\"C1\">"));
                assert_eq!(missing, "zmn:GM_LineString");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_curves_missing_id() {
        let xml = wrap_geometry(&curve("C1", &[direct("1", "2")]).replace(r#" id="C1""#, ""));
        let doc = Document::parse(&xml).unwrap();

        match extract_curves(doc.root_element()).unwrap_err() {
            ExtractError::MissingIdentifier { element } => {
                assert!(element.starts_with("<GM_Curve> at "), "{element}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_surfaces_missing_id() {
        let xml = wrap_geometry(&surface("S1", &["C1"]).replace(r#" id="S1""#, ""));
        let doc = Document::parse(&xml).unwrap();

        match extract_surfaces(doc.root_element()).unwrap_err() {
            ExtractError::MissingIdentifier { element } => {
                assert!(element.starts_with("<GM_Surface> at "), "{element}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_surfaces_exterior_only() {
        let xml = wrap_geometry(&[surface("S1", &["C1", "C2", "C3"]), surface("S2", &["C4"])].concat());
        let doc = Document::parse(&xml).unwrap();

        let edges = extract_surfaces(doc.root_element()).unwrap();
        let keys: Vec<_> = edges
            .iter()
            .map(|e| (e.surface_id.as_str(), e.sequence, e.curve_ref.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("S1", 1, "C1"), ("S1", 2, "C2"), ("S1", 3, "C3"), ("S2", 1, "C4")]
        );
    }

    #[test]
    fn test_extract_surfaces_broken_descent() {
        let xml = wrap_geometry(
            r#"<zmn:GM_Surface id="S1"><zmn:GM_Surface.patch><zmn:GM_Polygon/></zmn:GM_Surface.patch></zmn:GM_Surface>"#,
        );
        let doc = Document::parse(&xml).unwrap();

        assert_eq!(
            extract_surfaces(doc.root_element()).unwrap_err(),
            ExtractError::MalformedGeometry {
                element: format!(
                    "<GM_Surface id=\"S1\"> at {}",
                    position_of(&xml, "<zmn:GM_Surface")
                ),
                missing: "zmn:GM_Polygon.boundary".into(),
            }
        );
    }

    #[test]
    fn test_extract_surfaces_member_without_idref() {
        let xml = wrap_geometry(&surface("S1", &["C1"]).replace(r#"idref="C1""#, ""));
        let doc = Document::parse(&xml).unwrap();

        assert!(matches!(
            extract_surfaces(doc.root_element()),
            Err(ExtractError::MissingReference { .. })
        ));
    }

    /// `row:col` of the first occurrence of `needle` in `xml`.
    fn position_of(xml: &str, needle: &str) -> String {
        let offset = xml.find(needle).unwrap();
        let before = &xml[..offset];
        let row = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let col = before[line_start..].chars().count() + 1;
        format!("{row}:{col}")
    }
}
