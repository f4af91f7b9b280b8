//! Tags the engine itself reads.
//!
//! Everything else is plugin vocabulary.

use super::FacetTag;

/// Declared type of a property, action return or parameter.
pub const TYPE: FacetTag = FacetTag::new("type");
/// Element type of a collection.
pub const ELEMENT_TYPE: FacetTag = FacetTag::new("element-type");
/// Name under which a type can be looked up independently of its canonical name.
pub const LOGICAL_TYPE_NAME: FacetTag = FacetTag::new("logical-type-name");
