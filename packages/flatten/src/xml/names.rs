//! Qualified names of the cadastral map schema.
//!
//! The schema mixes two namespaces: thematic elements (筆, 基準点, 図郭, ...)
//! live in the feature namespace, spatial primitives (GM_Point, GM_Curve,
//! GM_Surface, ...) in the geometry namespace. Every name the extractors look
//! up is a constant here.

use std::fmt;

use roxmltree::Node;

use crate::config::{FEATURE_NAMESPACE, GEOMETRY_NAMESPACE};

/// Namespace selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Feature,
    Geometry,
}

impl Namespace {
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Feature => FEATURE_NAMESPACE,
            Self::Geometry => GEOMETRY_NAMESPACE,
        }
    }

    /// Conventional prefix used in the published documents.
    #[must_use]
    pub const fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Feature => None,
            Self::Geometry => Some("zmn"),
        }
    }
}

/// An element name qualified by its namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Namespace,
    pub local: &'static str,
}

impl QName {
    #[must_use]
    pub const fn feature(local: &'static str) -> Self {
        Self {
            namespace: Namespace::Feature,
            local,
        }
    }

    #[must_use]
    pub const fn geometry(local: &'static str) -> Self {
        Self {
            namespace: Namespace::Geometry,
            local,
        }
    }

    /// Check whether `node` is an element with this name.
    ///
    /// # Examples
    /// ```
    /// use roxmltree::Document;
    /// use mojxml_flatten::xml::{feature, geometry};
    ///
    /// let xml = r#"<筆 xmlns="http://www.moj.go.jp/MINJI/tizuxml"/>"#;
    /// let doc = Document::parse(xml).unwrap();
    /// assert!(feature::PARCEL.matches(doc.root_element()));
    /// assert!(!geometry::GM_POINT.matches(doc.root_element()));
    /// ```
    #[must_use]
    pub fn matches(self, node: Node<'_, '_>) -> bool {
        node.is_element() && node.has_tag_name((self.namespace.uri(), self.local))
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace.prefix() {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(self.local),
        }
    }
}

/// A fixed chain of child steps, resolved in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementPath {
    steps: &'static [QName],
}

impl ElementPath {
    #[must_use]
    pub const fn new(steps: &'static [QName]) -> Self {
        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &'static [QName] {
        self.steps
    }

    /// Walk the path from `node`.
    ///
    /// Returns the element at the end of the path, or the first step that
    /// has no matching child.
    pub fn resolve<'a, 'input>(&self, node: Node<'a, 'input>) -> Result<Node<'a, 'input>, QName> {
        let mut current = node;
        for step in self.steps {
            current = current
                .children()
                .find(|child| step.matches(*child))
                .ok_or(*step)?;
        }
        Ok(current)
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Attribute carrying an element's own identifier.
pub const ID_ATTR: &str = "id";

/// Attribute carrying a reference to another element's identifier.
pub const IDREF_ATTR: &str = "idref";

/// Names in the feature namespace.
pub mod feature {
    use super::QName;

    // Document metadata (root children)
    pub const VERSION: QName = QName::feature("version");
    pub const MAP_NAME: QName = QName::feature("地図名");
    pub const MUNICIPALITY_CODE: QName = QName::feature("市区町村コード");
    pub const MUNICIPALITY_NAME: QName = QName::feature("市区町村名");
    pub const COORDINATE_SYSTEM: QName = QName::feature("座標系");
    pub const GEODETIC_DATUM: QName = QName::feature("測地系判別");
    pub const CONVERSION_PROGRAM: QName = QName::feature("変換プログラム");
    pub const CONVERSION_PROGRAM_VERSION: QName = QName::feature("変換プログラムバージョン");
    pub const CONVERSION_PARAMETER_VERSION: QName = QName::feature("変換パラメータバージョン");

    // Sections
    pub const SPATIAL: QName = QName::feature("空間属性");
    pub const THEMATIC: QName = QName::feature("主題属性");
    pub const MAP_SHEET: QName = QName::feature("図郭");

    // Thematic features
    pub const REFERENCE_POINT: QName = QName::feature("基準点");
    pub const BOUNDARY_POINT: QName = QName::feature("筆界点");
    pub const BOUNDARY_LINE: QName = QName::feature("筆界線");
    pub const PROVISIONAL_ADMIN_LINE: QName = QName::feature("仮行政界線");
    pub const PARCEL: QName = QName::feature("筆");

    pub const SHAPE: QName = QName::feature("形状");
    pub const POINT_NUMBER: QName = QName::feature("点番名");
    pub const NAME: QName = QName::feature("名称");
    pub const REFERENCE_POINT_KIND: QName = QName::feature("基準点種別");
    pub const MONUMENT_KIND: QName = QName::feature("埋標区分");
    pub const LINE_KIND: QName = QName::feature("線種別");

    pub const OAZA_CODE: QName = QName::feature("大字コード");
    pub const CHOME_CODE: QName = QName::feature("丁目コード");
    pub const KOAZA_CODE: QName = QName::feature("小字コード");
    pub const RESERVE_CODE: QName = QName::feature("予備コード");
    pub const OAZA_NAME: QName = QName::feature("大字名");
    pub const CHOME_NAME: QName = QName::feature("丁目名");
    pub const KOAZA_NAME: QName = QName::feature("小字名");
    pub const RESERVE_NAME: QName = QName::feature("予備名");
    pub const LOT_NUMBER: QName = QName::feature("地番");
    pub const PRECISION_CLASS: QName = QName::feature("精度区分");
    pub const COORDINATE_VALUE_TYPE: QName = QName::feature("座標値種別");

    // Map sheet
    pub const SHEET_NUMBER: QName = QName::feature("地図番号");
    pub const SCALE_DENOMINATOR: QName = QName::feature("縮尺分母");
    pub const ORIENTATION_UNKNOWN: QName = QName::feature("方位不明フラグ");
    pub const LOWER_LEFT: QName = QName::feature("左下座標");
    pub const UPPER_LEFT: QName = QName::feature("左上座標");
    pub const LOWER_RIGHT: QName = QName::feature("右下座標");
    pub const UPPER_RIGHT: QName = QName::feature("右上座標");
    pub const MAP_TYPE: QName = QName::feature("地図種類");
    pub const MAP_CATEGORY: QName = QName::feature("地図分類");
    pub const MAP_MATERIAL: QName = QName::feature("地図材質");
    pub const CREATED_ON: QName = QName::feature("地図作成年月日");
    pub const REGISTERED_ON: QName = QName::feature("備付地図年月日");
    pub const YEAR: QName = QName::feature("年");
    pub const MONTH: QName = QName::feature("月");
    pub const DAY: QName = QName::feature("日");
    pub const PARCEL_REF: QName = QName::feature("筆参照");
}

/// Names in the geometry namespace.
pub mod geometry {
    use super::{ElementPath, QName};

    pub const GM_POINT: QName = QName::geometry("GM_Point");
    pub const GM_POINT_POSITION: QName = QName::geometry("GM_Point.position");
    pub const DIRECT_POSITION: QName = QName::geometry("DirectPosition");
    pub const X: QName = QName::geometry("X");
    pub const Y: QName = QName::geometry("Y");

    pub const GM_CURVE: QName = QName::geometry("GM_Curve");
    pub const GM_CURVE_SEGMENT: QName = QName::geometry("GM_Curve.segment");
    pub const GM_LINE_STRING: QName = QName::geometry("GM_LineString");
    pub const GM_LINE_STRING_CONTROL_POINT: QName = QName::geometry("GM_LineString.controlPoint");
    pub const GM_POSITION_DIRECT: QName = QName::geometry("GM_Position.direct");
    pub const GM_POSITION_INDIRECT: QName = QName::geometry("GM_Position.indirect");
    pub const GM_POINT_REF_POINT: QName = QName::geometry("GM_PointRef.point");

    pub const GM_SURFACE: QName = QName::geometry("GM_Surface");
    pub const GM_SURFACE_PATCH: QName = QName::geometry("GM_Surface.patch");
    pub const GM_POLYGON: QName = QName::geometry("GM_Polygon");
    pub const GM_POLYGON_BOUNDARY: QName = QName::geometry("GM_Polygon.boundary");
    pub const GM_SURFACE_BOUNDARY: QName = QName::geometry("GM_SurfaceBoundary");
    pub const GM_SURFACE_BOUNDARY_EXTERIOR: QName = QName::geometry("GM_SurfaceBoundary.exterior");
    pub const GM_RING: QName = QName::geometry("GM_Ring");

    /// `GM_Point` → its coordinate holder.
    pub const POINT_POSITION: ElementPath =
        ElementPath::new(&[GM_POINT_POSITION, DIRECT_POSITION]);

    /// `GM_Curve` → the list of control points.
    pub const CURVE_CONTROL_POINTS: ElementPath = ElementPath::new(&[
        GM_CURVE_SEGMENT,
        GM_LINE_STRING,
        GM_LINE_STRING_CONTROL_POINT,
    ]);

    /// Control point → the shared point it refers to.
    pub const INDIRECT_POINT_REF: ElementPath =
        ElementPath::new(&[GM_POSITION_INDIRECT, GM_POINT_REF_POINT]);

    /// `GM_Surface` → the exterior ring. Interior rings are never visited.
    pub const SURFACE_EXTERIOR_RING: ElementPath = ElementPath::new(&[
        GM_SURFACE_PATCH,
        GM_POLYGON,
        GM_POLYGON_BOUNDARY,
        GM_SURFACE_BOUNDARY,
        GM_SURFACE_BOUNDARY_EXTERIOR,
        GM_RING,
    ]);
}
