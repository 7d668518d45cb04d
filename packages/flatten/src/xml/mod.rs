//! XML utilities for the two-namespace cadastral map schema.

mod names;
mod utils;

pub use names::{feature, geometry, ElementPath, Namespace, QName, IDREF_ATTR, ID_ATTR};
pub use utils::{
    child_idref, child_text, describe, element_children, find_child, find_children, get_text,
    idref, required_id,
};
