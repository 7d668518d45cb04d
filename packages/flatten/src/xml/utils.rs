//! Null-safe accessors for navigating namespaced DOM trees.

use roxmltree::Node;

use super::names::{QName, ID_ATTR, IDREF_ATTR};
use crate::error::ExtractError;

/// Find the first child element with the given name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use mojxml_flatten::xml::{feature, find_child};
///
/// let xml = r#"<筆 xmlns="http://www.moj.go.jp/MINJI/tizuxml"><地番>12</地番></筆>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// assert!(find_child(doc.root_element(), feature::LOT_NUMBER).is_some());
/// assert!(find_child(doc.root_element(), feature::SHAPE).is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, name: QName) -> Option<Node<'a, 'input>> {
    node.children().find(|child| name.matches(*child))
}

/// Find all child elements with the given name, in document order.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    name: QName,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| name.matches(*child))
}

/// Get all element children of a node (excludes text nodes, comments, etc.).
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Get the text content of a node, or an empty string if it has none.
///
/// Unlike most text accessors the value is not trimmed: coordinates and codes
/// are copied into the output exactly as published.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text().map(str::to_string).unwrap_or_default()
}

/// Get the text of the named child of `node`.
///
/// Returns an empty string when `node` is `None`, when the child is absent,
/// or when the child has no text.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use mojxml_flatten::xml::{child_text, feature};
///
/// let xml = r#"<筆 xmlns="http://www.moj.go.jp/MINJI/tizuxml"><地番>12</地番></筆>"#;
/// let doc = Document::parse(xml).unwrap();
/// let parcel = doc.root_element();
///
/// assert_eq!(child_text(parcel, feature::LOT_NUMBER), "12");
/// assert_eq!(child_text(parcel, feature::OAZA_NAME), "");
/// ```
pub fn child_text<'a, 'input: 'a>(node: impl Into<Option<Node<'a, 'input>>>, name: QName) -> String {
    node.into()
        .and_then(|n| find_child(n, name))
        .map(get_text)
        .unwrap_or_default()
}

/// Get the `idref` attribute of `element`.
///
/// `owner` is the element reported when the reference is missing; `reference`
/// names the reference for the error message.
pub fn idref<'a>(
    element: Option<Node<'a, '_>>,
    owner: Node<'_, '_>,
    reference: &str,
) -> Result<&'a str, ExtractError> {
    element
        .and_then(|e| e.attribute(IDREF_ATTR))
        .ok_or_else(|| ExtractError::MissingReference {
            element: describe(owner),
            reference: reference.to_string(),
        })
}

/// Get the `idref` attribute of the named child of `node`.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use mojxml_flatten::xml::{child_idref, feature};
///
/// let xml = r#"<筆 xmlns="http://www.moj.go.jp/MINJI/tizuxml"><形状 idref="S1"/></筆>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// assert_eq!(child_idref(doc.root_element(), feature::SHAPE).unwrap(), "S1");
/// assert!(child_idref(doc.root_element(), feature::PARCEL_REF).is_err());
/// ```
pub fn child_idref<'a>(node: Node<'a, '_>, name: QName) -> Result<&'a str, ExtractError> {
    idref(find_child(node, name), node, &name.to_string())
}

/// Get the `id` attribute of `element`.
pub fn required_id<'a>(element: Node<'a, '_>) -> Result<&'a str, ExtractError> {
    element
        .attribute(ID_ATTR)
        .ok_or_else(|| ExtractError::MissingIdentifier {
            element: describe(element),
        })
}

/// Describe an element for error messages: tag, id (if any) and source position.
///
/// Produces e.g. `<GM_Surface id="S1"> at 12:5`.
pub fn describe(node: Node<'_, '_>) -> String {
    let pos = node.document().text_pos_at(node.range().start);
    let name = node.tag_name().name();
    match node.attribute(ID_ATTR) {
        Some(id) => format!("<{name} id=\"{id}\"> at {}:{}", pos.row, pos.col),
        None => format!("<{name}> at {}:{}", pos.row, pos.col),
    }
}
