use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::{Facet, FacetTag, FacetValue, Precedence, TypeLink};
use crate::identifier::Identifier;

/// Result of offering a facet to a holder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AddOutcome {
	/// Tag was new; facet installed.
	Installed,
	/// Tag existed; the incoming facet displaced the installed one.
	Replaced,
	/// Tag existed with a semantically equal facet; incoming dropped.
	Duplicate,
	/// Tag existed with a stronger facet; incoming dropped.
	Shadowed,
}

/// One side of a facet conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contender {
	pub extractor: &'static str,
	pub precedence: Precedence,
	pub ordinal: u32,
}

impl Contender {
	fn of(facet: &Facet) -> Self {
		Self {
			extractor: facet.origin.extractor,
			precedence: facet.precedence,
			ordinal: facet.origin.ordinal,
		}
	}
}

/// A facet lost a conflict that was not a plain duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowNote {
	pub identifier: Identifier,
	pub tag: FacetTag,
	pub winner: Contender,
	pub loser: Contender,
}

/// Compares two contenders; `Greater` means `a` beats `b`.
///
/// Equal contenders compare `Equal`; callers treat the incoming facet as the
/// winner in that case.
pub(crate) fn cmp_contender(a: &Contender, b: &Contender) -> Ordering {
	a.precedence
		.cmp(&b.precedence)
		.then_with(|| a.ordinal.cmp(&b.ordinal))
}

/// Container mapping each facet tag to its single winning facet.
///
/// Mutated only by the introspection run that owns it, then read-only.
#[derive(Debug, Clone)]
pub struct FacetHolder {
	identifier: Identifier,
	facets: BTreeMap<FacetTag, Facet>,
	shadowed: Vec<ShadowNote>,
}

impl FacetHolder {
	pub fn new(identifier: Identifier) -> Self {
		Self {
			identifier,
			facets: BTreeMap::new(),
			shadowed: Vec::new(),
		}
	}

	pub fn identifier(&self) -> &Identifier {
		&self.identifier
	}

	/// Offers `facet` under its tag and resolves any conflict.
	pub fn add_facet(&mut self, facet: Facet) -> AddOutcome {
		let existing = match self.facets.entry(facet.tag) {
			Entry::Vacant(slot) => {
				slot.insert(facet);
				return AddOutcome::Installed;
			}
			Entry::Occupied(slot) => slot.into_mut(),
		};

		if facet.semantically_eq(existing) {
			if facet.precedence > existing.precedence {
				*existing = facet;
				return AddOutcome::Replaced;
			}
			return AddOutcome::Duplicate;
		}

		let incoming = Contender::of(&facet);
		let installed = Contender::of(existing);
		if cmp_contender(&incoming, &installed) == Ordering::Less {
			tracing::trace!(
				id = %self.identifier,
				tag = %facet.tag,
				winner = installed.extractor,
				loser = incoming.extractor,
				"facet shadowed"
			);
			self.shadowed.push(ShadowNote {
				identifier: self.identifier.clone(),
				tag: facet.tag,
				winner: installed,
				loser: incoming,
			});
			return AddOutcome::Shadowed;
		}

		tracing::trace!(
			id = %self.identifier,
			tag = %facet.tag,
			winner = incoming.extractor,
			loser = installed.extractor,
			"facet replaced"
		);
		self.shadowed.push(ShadowNote {
			identifier: self.identifier.clone(),
			tag: facet.tag,
			winner: incoming,
			loser: installed,
		});
		*existing = facet;
		AddOutcome::Replaced
	}

	#[inline]
	pub fn facet(&self, tag: FacetTag) -> Option<&Facet> {
		self.facets.get(&tag)
	}

	#[inline]
	pub fn contains(&self, tag: FacetTag) -> bool {
		self.facets.contains_key(&tag)
	}

	/// Tags currently present, in tag order.
	pub fn facet_types(&self) -> impl Iterator<Item = FacetTag> + '_ {
		self.facets.keys().copied()
	}

	pub fn facets(&self) -> impl Iterator<Item = &Facet> + '_ {
		self.facets.values()
	}

	pub fn len(&self) -> usize {
		self.facets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.facets.is_empty()
	}

	/// Conflicts lost by some facet on this holder, in the order they happened.
	pub fn shadowed(&self) -> &[ShadowNote] {
		&self.shadowed
	}

	/// True if the tag is present and not explicitly `false`.
	pub fn flag(&self, tag: FacetTag) -> bool {
		self.facet(tag)
			.is_some_and(|f| f.value().as_bool().unwrap_or(true))
	}

	pub fn bool(&self, tag: FacetTag) -> Option<bool> {
		self.facet(tag).and_then(|f| f.value().as_bool())
	}

	pub fn int(&self, tag: FacetTag) -> Option<i64> {
		self.facet(tag).and_then(|f| f.value().as_int())
	}

	pub fn text(&self, tag: FacetTag) -> Option<&str> {
		self.facet(tag).and_then(|f| f.value().as_str())
	}

	pub fn type_link(&self, tag: FacetTag) -> Option<&TypeLink> {
		self.facet(tag).and_then(|f| f.value().as_type())
	}

	/// Every type link carried by any facet of this holder.
	pub fn type_links(&self) -> impl Iterator<Item = (FacetTag, &TypeLink)> + '_ {
		self.facets.values().filter_map(|f| match f.value() {
			FacetValue::Type(link) => Some((f.tag, link)),
			_ => None,
		})
	}
}
