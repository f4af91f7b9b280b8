//! Marker names read and facet tags written by the builtin extractors.

/// Marker names as they appear on declarations.
pub mod markers {
	pub const VIEW_MODEL: &str = "view-model";
	pub const ENTITY: &str = "entity";
	pub const VALUE: &str = "value";
	pub const IMMUTABLE: &str = "immutable";
	pub const MANDATORY: &str = "mandatory";
	pub const OPTIONAL: &str = "optional";
	/// Carries an int payload.
	pub const MAX_LENGTH: &str = "max-length";
	pub const TITLE: &str = "title";
	pub const HIDDEN: &str = "hidden";
	pub const EDITABLE: &str = "editable";
	pub const DISABLED: &str = "disabled";
	/// Carries a text payload.
	pub const NAMED: &str = "named";
	/// Carries a text payload.
	pub const LOGICAL_TYPE_NAME: &str = "logical-type-name";
}

/// Facet tags contributed by the builtin extractors.
pub mod tags {
	use specgraph_metamodel::FacetTag;

	/// Text: one of [`SORT_ENTITY`](super::SORT_ENTITY),
	/// [`SORT_VALUE`](super::SORT_VALUE) or [`SORT_VIEW_MODEL`](super::SORT_VIEW_MODEL).
	pub const TYPE_SORT: FacetTag = FacetTag::new("type-sort");
	pub const IMMUTABLE: FacetTag = FacetTag::new("immutable");
	/// Text: display name.
	pub const NAMED: FacetTag = FacetTag::new("named");
	/// Bool.
	pub const MANDATORY: FacetTag = FacetTag::new("mandatory");
	/// Int.
	pub const MAX_LENGTH: FacetTag = FacetTag::new("max-length");
	/// Bool: `true` when the member cannot be edited.
	pub const DISABLED: FacetTag = FacetTag::new("disabled");
	pub const HIDDEN: FacetTag = FacetTag::new("hidden");
	pub const TITLE: FacetTag = FacetTag::new("title");
}

pub const SORT_ENTITY: &str = "entity";
pub const SORT_VALUE: &str = "value";
pub const SORT_VIEW_MODEL: &str = "view-model";
