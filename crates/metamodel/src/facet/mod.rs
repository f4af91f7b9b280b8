//! Facets: typed attributes attached to specification nodes.
//!
//! # Mental Model
//!
//! A [`Facet`] is one concrete value: a [`FacetTag`] saying *what kind* of
//! attribute it is, a [`Precedence`], and a small [`FacetValue`] payload.
//! Behavior differences between attribute kinds are data, not subtypes.
//!
//! A [`FacetHolder`] keeps at most one facet per tag. Competing facets are
//! resolved by the precedence contract below; losers are kept only as
//! [`ShadowNote`] diagnostics.
//!
//! # Precedence Contract
//!
//! 1. **Precedence:** strictly higher [`Precedence`] wins.
//! 2. **Semantic equality:** at equal precedence, a facet equal in tag and value
//!    to the installed one is a harmless duplicate and is dropped silently.
//! 3. **Processing order:** at equal precedence, the facet with the later
//!    processing ordinal wins (the newer facet wins ties on the ordinal).
//!
//! - Enforced in: [`holder::cmp_contender`], [`FacetHolder::add_facet`].
//! - Tested by: `facet::tests::precedence_total_order_*`.

mod holder;
pub mod tags;

use std::fmt;
use std::sync::Arc;

pub use holder::{AddOutcome, Contender, FacetHolder, ShadowNote};

use crate::spec::SpecId;
use crate::types::TypeName;

/// Identifies the kind of attribute a facet carries.
///
/// Tags are open: plugins declare their own as constants.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacetTag(&'static str);

impl FacetTag {
	pub const fn new(tag: &'static str) -> Self {
		Self(tag)
	}

	pub const fn as_str(self) -> &'static str {
		self.0
	}
}

impl fmt::Debug for FacetTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "FacetTag({})", self.0)
	}
}

impl fmt::Display for FacetTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0)
	}
}

/// Strength of a facet when competing with another of the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precedence {
	/// Engine-internal baseline (declared types, structural links).
	Infrastructure,
	/// Used only when nothing else contributes.
	Fallback,
	/// Derived from naming or shape conventions.
	Inferred,
	/// Derived from an explicit marker.
	Default,
	/// Deliberate override of other contributions.
	High,
}

impl Precedence {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Infrastructure => "infrastructure",
			Self::Fallback => "fallback",
			Self::Inferred => "inferred",
			Self::Default => "default",
			Self::High => "high",
		}
	}
}

impl fmt::Display for Precedence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Reference from a facet to another type's specification.
#[derive(Debug, Clone)]
pub enum TypeLink {
	/// Produced by an extractor; resolved by the loader before installation.
	Pending(TypeName),
	/// Points into the specification arena (possibly at a placeholder).
	Resolved { name: TypeName, id: SpecId },
	/// The target could not be found; reported at validation time.
	Unresolved(TypeName),
}

impl TypeLink {
	pub fn to(name: impl Into<TypeName>) -> Self {
		Self::Pending(name.into())
	}

	pub fn name(&self) -> &TypeName {
		match self {
			Self::Pending(name) | Self::Unresolved(name) | Self::Resolved { name, .. } => name,
		}
	}

	pub fn spec_id(&self) -> Option<SpecId> {
		match self {
			Self::Resolved { id, .. } => Some(*id),
			_ => None,
		}
	}

	pub fn is_unresolved(&self) -> bool {
		matches!(self, Self::Unresolved(_))
	}
}

/// Links compare by target name: resolution state is not configuration.
impl PartialEq for TypeLink {
	fn eq(&self, other: &Self) -> bool {
		self.name() == other.name()
	}
}

impl Eq for TypeLink {}

/// Payload of a facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetValue {
	/// Presence is the whole message.
	Flag,
	Bool(bool),
	Int(i64),
	Text(Arc<str>),
	Type(TypeLink),
}

impl FacetValue {
	pub fn text(s: &str) -> Self {
		Self::Text(Arc::from(s))
	}

	pub fn type_ref(name: impl Into<TypeName>) -> Self {
		Self::Type(TypeLink::to(name))
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(v) => Some(*v),
			Self::Flag => Some(true),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_type(&self) -> Option<&TypeLink> {
		match self {
			Self::Type(link) => Some(link),
			_ => None,
		}
	}
}

impl fmt::Display for FacetValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Flag => f.write_str("flag"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Int(v) => write!(f, "{v}"),
			Self::Text(v) => write!(f, "{v:?}"),
			Self::Type(TypeLink::Unresolved(name)) => write!(f, "type {name} (unresolved)"),
			Self::Type(link) => write!(f, "type {}", link.name()),
		}
	}
}

/// Which processing step produced a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetOrigin {
	pub extractor: &'static str,
	/// Position of the extractor in the programming model's total order.
	pub ordinal: u32,
}

impl FacetOrigin {
	/// Origin of facets installed by the loader itself.
	pub const ENGINE: Self = Self {
		extractor: "engine",
		ordinal: 0,
	};
}

/// A single typed attribute value.
#[derive(Debug, Clone)]
pub struct Facet {
	tag: FacetTag,
	precedence: Precedence,
	value: FacetValue,
	origin: FacetOrigin,
}

impl Facet {
	pub fn new(tag: FacetTag, precedence: Precedence, value: FacetValue) -> Self {
		Self {
			tag,
			precedence,
			value,
			origin: FacetOrigin::ENGINE,
		}
	}

	pub fn flag(tag: FacetTag, precedence: Precedence) -> Self {
		Self::new(tag, precedence, FacetValue::Flag)
	}

	#[inline]
	pub fn tag(&self) -> FacetTag {
		self.tag
	}

	#[inline]
	pub fn precedence(&self) -> Precedence {
		self.precedence
	}

	#[inline]
	pub fn value(&self) -> &FacetValue {
		&self.value
	}

	#[inline]
	pub fn origin(&self) -> FacetOrigin {
		self.origin
	}

	/// Same tag and equal configuration; precedence and origin are ignored.
	pub fn semantically_eq(&self, other: &Facet) -> bool {
		self.tag == other.tag && self.value == other.value
	}

	pub(crate) fn with_origin(mut self, origin: FacetOrigin) -> Self {
		self.origin = origin;
		self
	}

	pub(crate) fn value_mut(&mut self) -> &mut FacetValue {
		&mut self.value
	}
}

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod tests;
