//! Conventional feature extractors.
//!
//! Convention-derived facets use [`Precedence::Inferred`] or
//! [`Precedence::Fallback`]; facets read off explicit markers use
//! [`Precedence::Default`], so an application extractor at
//! [`Precedence::High`] always has the last word.

use heck::ToTitleCase;
use specgraph_metamodel::{
	Declaration, ExtractError, ExtractorMeta, Facet, FacetValue, FeatureExtractor, FeatureKind,
	FeatureKindSet, MarkerValue, Precedence, ProcessContext, tags as engine_tags,
};

use crate::vocab::{SORT_ENTITY, SORT_VALUE, SORT_VIEW_MODEL, markers, tags};

/// Processing group of every builtin extractor.
pub const GROUP: u16 = 10;

const VALUE_HOLDERS: FeatureKindSet = FeatureKindSet::PROPERTY.union(FeatureKindSet::PARAMETER);
const EDITABLE_MEMBERS: FeatureKindSet = FeatureKindSet::PROPERTY.union(FeatureKindSet::COLLECTION);

fn int_marker(decl: &dyn Declaration, name: &str) -> Result<Option<i64>, ExtractError> {
	let Some(marker) = decl.marker(name) else {
		return Ok(None);
	};
	match &marker.value {
		Some(MarkerValue::Int(v)) => Ok(Some(*v)),
		other => Err(ExtractError::MarkerType {
			marker: name.to_string(),
			expected: "int",
			found: other.as_ref().map_or("nothing", MarkerValue::type_name),
		}),
	}
}

fn text_marker<'d>(decl: &'d dyn Declaration, name: &str) -> Result<Option<&'d str>, ExtractError> {
	let Some(marker) = decl.marker(name) else {
		return Ok(None);
	};
	match &marker.value {
		Some(MarkerValue::Text(v)) => Ok(Some(&**v)),
		other => Err(ExtractError::MarkerType {
			marker: name.to_string(),
			expected: "text",
			found: other.as_ref().map_or("nothing", MarkerValue::type_name),
		}),
	}
}

/// Turns an identifier such as `firstName` or `order_line` into `First Name`
/// or `Order Line`.
pub fn humanize(name: &str) -> String {
	name.to_title_case()
}

/// Installs `logical-type-name` from the marker of the same name.
pub struct LogicalTypeName;

impl LogicalTypeName {
	pub const META: ExtractorMeta = ExtractorMeta::new("builtins.logical-type-name", GROUP, FeatureKindSet::TYPE);
}

impl FeatureExtractor for LogicalTypeName {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		let Some(logical) = text_marker(ctx.declaration(), markers::LOGICAL_TYPE_NAME)? else {
			return Ok(());
		};
		if logical.trim().is_empty() {
			return Err(ExtractError::Invalid("logical type name must not be blank".to_string()));
		}
		ctx.add_facet(Facet::new(
			engine_tags::LOGICAL_TYPE_NAME,
			Precedence::Default,
			FacetValue::text(logical),
		));
		Ok(())
	}
}

/// Classifies a type as entity, value or view model.
///
/// Memberless concrete types are inferred to be values; everything else
/// falls back to entity.
pub struct TypeSort;

impl TypeSort {
	pub const META: ExtractorMeta = ExtractorMeta::new("builtins.type-sort", GROUP, FeatureKindSet::TYPE);
}

impl FeatureExtractor for TypeSort {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		let decl = ctx.declaration();
		let declared = [
			(markers::VIEW_MODEL, SORT_VIEW_MODEL),
			(markers::VALUE, SORT_VALUE),
			(markers::ENTITY, SORT_ENTITY),
		]
		.into_iter()
		.find(|(marker, _)| decl.has_marker(marker))
		.map(|(_, sort)| sort);

		let ty = ctx.type_descriptor();
		let (sort, precedence) = match declared {
			Some(sort) => (sort, Precedence::Default),
			None if ty.members.is_empty() && !ty.is_abstract => (SORT_VALUE, Precedence::Inferred),
			None => (SORT_ENTITY, Precedence::Fallback),
		};
		ctx.add_facet(Facet::new(tags::TYPE_SORT, precedence, FacetValue::text(sort)));
		Ok(())
	}
}

/// Marks a type immutable when declared so, or when it is a value type.
///
/// Must run after [`TypeSort`].
pub struct ImmutableType;

impl ImmutableType {
	pub const META: ExtractorMeta = ExtractorMeta::new("builtins.immutable", GROUP, FeatureKindSet::TYPE);
}

impl FeatureExtractor for ImmutableType {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		if ctx.declaration().has_marker(markers::IMMUTABLE) {
			ctx.add_facet(Facet::flag(tags::IMMUTABLE, Precedence::Default));
		} else if ctx.facets().text(tags::TYPE_SORT) == Some(SORT_VALUE) {
			ctx.add_facet(Facet::flag(tags::IMMUTABLE, Precedence::Inferred));
		}
		Ok(())
	}
}

/// Display name: the `named` marker, else the humanized declaration name.
pub struct Named;

impl Named {
	pub const META: ExtractorMeta = ExtractorMeta::new(
		"builtins.named",
		GROUP,
		FeatureKindSet::all(),
	);
}

impl FeatureExtractor for Named {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		if let Some(named) = text_marker(ctx.declaration(), markers::NAMED)? {
			ctx.add_facet(Facet::new(tags::NAMED, Precedence::Default, FacetValue::text(named)));
			return Ok(());
		}
		let raw = match ctx.kind() {
			FeatureKind::Type => ctx.type_descriptor().name.simple_name(),
			_ => ctx.declaration().name(),
		};
		let humanized = humanize(raw);
		ctx.add_facet(Facet::new(tags::NAMED, Precedence::Fallback, FacetValue::text(&humanized)));
		Ok(())
	}
}

/// Properties and parameters are mandatory unless declared optional.
pub struct Mandatory;

impl Mandatory {
	pub const META: ExtractorMeta = ExtractorMeta::new("builtins.mandatory", GROUP, VALUE_HOLDERS);
}

impl FeatureExtractor for Mandatory {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		let decl = ctx.declaration();
		let facet = match (decl.has_marker(markers::MANDATORY), decl.has_marker(markers::OPTIONAL)) {
			(true, true) => {
				return Err(ExtractError::Invalid(
					"declared both mandatory and optional".to_string(),
				));
			}
			(true, false) => Facet::new(tags::MANDATORY, Precedence::Default, FacetValue::Bool(true)),
			(false, true) => Facet::new(tags::MANDATORY, Precedence::Default, FacetValue::Bool(false)),
			(false, false) => Facet::new(tags::MANDATORY, Precedence::Fallback, FacetValue::Bool(true)),
		};
		ctx.add_facet(facet);
		Ok(())
	}
}

/// Copies an int `max-length` marker onto properties and parameters.
pub struct MaxLength;

impl MaxLength {
	pub const META: ExtractorMeta = ExtractorMeta::new("builtins.max-length", GROUP, VALUE_HOLDERS);
}

impl FeatureExtractor for MaxLength {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		if let Some(max) = int_marker(ctx.declaration(), markers::MAX_LENGTH)? {
			ctx.add_facet(Facet::new(tags::MAX_LENGTH, Precedence::Default, FacetValue::Int(max)));
		}
		Ok(())
	}
}

/// Editability of properties and collections.
///
/// Members of immutable types are disabled unless declared editable.
pub struct Editing;

impl Editing {
	pub const META: ExtractorMeta = ExtractorMeta::new("builtins.editing", GROUP, EDITABLE_MEMBERS);
}

impl FeatureExtractor for Editing {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		let decl = ctx.declaration();
		let disabled = match (decl.has_marker(markers::DISABLED), decl.has_marker(markers::EDITABLE)) {
			(true, true) => {
				return Err(ExtractError::Invalid(
					"declared both editable and disabled".to_string(),
				));
			}
			(true, false) => Some((true, Precedence::Default)),
			(false, true) => Some((false, Precedence::Default)),
			(false, false) if ctx.type_facets().flag(tags::IMMUTABLE) => Some((true, Precedence::Inferred)),
			(false, false) => None,
		};
		if let Some((disabled, precedence)) = disabled {
			ctx.add_facet(Facet::new(tags::DISABLED, precedence, FacetValue::Bool(disabled)));
		}
		Ok(())
	}
}

/// Flags members declared hidden.
pub struct Hidden;

impl Hidden {
	pub const META: ExtractorMeta = ExtractorMeta::new("builtins.hidden", GROUP, FeatureKindSet::MEMBERS);
}

impl FeatureExtractor for Hidden {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		if ctx.declaration().has_marker(markers::HIDDEN) {
			ctx.add_facet(Facet::flag(tags::HIDDEN, Precedence::Default));
		}
		Ok(())
	}
}

/// Flags the property that provides an instance's title.
pub struct Title;

impl Title {
	pub const META: ExtractorMeta = ExtractorMeta::new("builtins.title", GROUP, FeatureKindSet::PROPERTY);
}

impl FeatureExtractor for Title {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		if ctx.declaration().has_marker(markers::TITLE) {
			ctx.add_facet(Facet::flag(tags::TITLE, Precedence::Default));
		}
		Ok(())
	}
}
