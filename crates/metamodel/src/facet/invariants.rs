use super::*;
use crate::identifier::Identifier;
use crate::types::TypeName;

const LABEL: FacetTag = FacetTag::new("label");

fn contender(precedence: Precedence, ordinal: u32, text: &str) -> Facet {
	Facet::new(LABEL, precedence, FacetValue::text(text)).with_origin(FacetOrigin {
		extractor: "contender",
		ordinal,
	})
}

fn settle(facets: impl IntoIterator<Item = Facet>) -> FacetHolder {
	let mut holder = FacetHolder::new(Identifier::for_type(TypeName::new("T")));
	for facet in facets {
		holder.add_facet(facet);
	}
	holder
}

/// Must pick the same winner whatever order distinct contenders arrive in.
///
/// * Enforced in: `FacetHolder::add_facet`, `holder::cmp_contender`
/// * Failure symptom: the same model yields different attribute values depending on
///   which type happened to be introspected first.
#[cfg_attr(test, test)]
pub(crate) fn test_winner_is_independent_of_arrival_order() {
	let contenders = [
		contender(Precedence::Default, 4, "a"),
		contender(Precedence::High, 1, "b"),
		contender(Precedence::High, 2, "c"),
		contender(Precedence::Inferred, 9, "d"),
	];

	let forward = settle(contenders.clone());
	let backward = settle(contenders.iter().rev().cloned());
	assert_eq!(forward.text(LABEL), Some("c"));
	assert_eq!(backward.text(LABEL), Some("c"));
	assert_eq!(forward.shadowed().len(), 3);
	assert_eq!(backward.shadowed().len(), 3);
}

/// Must keep at most one facet per tag.
///
/// * Enforced in: `FacetHolder::add_facet`
/// * Failure symptom: readers see a stale value next to the winning one.
#[cfg_attr(test, test)]
pub(crate) fn test_one_facet_per_tag() {
	let holder = settle([
		contender(Precedence::Fallback, 1, "x"),
		contender(Precedence::Default, 2, "y"),
		contender(Precedence::Default, 3, "z"),
	]);
	assert_eq!(holder.len(), 1);
	assert_eq!(holder.facets().count(), 1);
}

/// Must not record a shadow note when the contenders agree.
///
/// * Enforced in: `FacetHolder::add_facet` (semantic equality check)
/// * Failure symptom: diagnostics flood with conflicts that change nothing.
#[cfg_attr(test, test)]
pub(crate) fn test_agreeing_contenders_leave_no_note() {
	let holder = settle([
		contender(Precedence::Default, 1, "same"),
		contender(Precedence::High, 2, "same"),
		contender(Precedence::Fallback, 3, "same"),
	]);
	assert!(holder.shadowed().is_empty());
	assert_eq!(holder.facet(LABEL).map(Facet::precedence), Some(Precedence::High));
}
