use rstest::rstest;

use super::*;
use crate::identifier::Identifier;
use crate::types::TypeName;

const MANDATORY: FacetTag = FacetTag::new("mandatory");
const MAX_LEN: FacetTag = FacetTag::new("max-length");

fn holder() -> FacetHolder {
	FacetHolder::new(Identifier::for_member(TypeName::new("T"), "name"))
}

fn facet(tag: FacetTag, precedence: Precedence, value: FacetValue, ordinal: u32) -> Facet {
	Facet::new(tag, precedence, value).with_origin(FacetOrigin {
		extractor: "test",
		ordinal,
	})
}

#[test]
fn first_facet_is_installed() {
	let mut h = holder();
	let out = h.add_facet(facet(MAX_LEN, Precedence::Default, FacetValue::Int(10), 1));
	assert_eq!(out, AddOutcome::Installed);
	assert_eq!(h.int(MAX_LEN), Some(10));
	assert_eq!(h.facet_types().collect::<Vec<_>>(), vec![MAX_LEN]);
}

#[test]
fn precedence_total_order_higher_precedence_replaces() {
	let mut h = holder();
	h.add_facet(facet(MANDATORY, Precedence::Default, FacetValue::Bool(true), 5));
	let out = h.add_facet(facet(MANDATORY, Precedence::High, FacetValue::Bool(false), 1));

	assert_eq!(out, AddOutcome::Replaced);
	assert_eq!(h.bool(MANDATORY), Some(false));
	let note = &h.shadowed()[0];
	assert_eq!(note.winner.precedence, Precedence::High);
	assert_eq!(note.loser.precedence, Precedence::Default);
}

#[test]
fn precedence_total_order_lower_precedence_is_shadowed() {
	let mut h = holder();
	h.add_facet(facet(MANDATORY, Precedence::High, FacetValue::Bool(false), 1));
	let out = h.add_facet(facet(MANDATORY, Precedence::Fallback, FacetValue::Bool(true), 9));

	assert_eq!(out, AddOutcome::Shadowed);
	assert_eq!(h.bool(MANDATORY), Some(false));
	assert_eq!(h.shadowed().len(), 1);
	assert_eq!(h.shadowed()[0].loser.ordinal, 9);
}

#[test]
fn precedence_total_order_equal_precedence_later_ordinal_wins() {
	let mut h = holder();
	h.add_facet(facet(MAX_LEN, Precedence::Default, FacetValue::Int(10), 1));
	let out = h.add_facet(facet(MAX_LEN, Precedence::Default, FacetValue::Int(20), 2));
	assert_eq!(out, AddOutcome::Replaced);
	assert_eq!(h.int(MAX_LEN), Some(20));

	// An earlier ordinal arriving late still loses.
	let out = h.add_facet(facet(MAX_LEN, Precedence::Default, FacetValue::Int(30), 0));
	assert_eq!(out, AddOutcome::Shadowed);
	assert_eq!(h.int(MAX_LEN), Some(20));
}

#[test]
fn same_ordinal_newer_wins() {
	let mut h = holder();
	h.add_facet(facet(MAX_LEN, Precedence::Default, FacetValue::Int(10), 3));
	let out = h.add_facet(facet(MAX_LEN, Precedence::Default, FacetValue::Int(11), 3));
	assert_eq!(out, AddOutcome::Replaced);
	assert_eq!(h.int(MAX_LEN), Some(11));
}

#[rstest]
#[case(Precedence::Default, AddOutcome::Duplicate)]
#[case(Precedence::Fallback, AddOutcome::Duplicate)]
#[case(Precedence::High, AddOutcome::Replaced)]
fn semantically_equal_never_shadows(#[case] incoming: Precedence, #[case] expected: AddOutcome) {
	let mut h = holder();
	h.add_facet(facet(MAX_LEN, Precedence::Default, FacetValue::Int(10), 1));
	let out = h.add_facet(facet(MAX_LEN, incoming, FacetValue::Int(10), 7));

	assert_eq!(out, expected);
	assert!(h.shadowed().is_empty());
	assert!(h.facet(MAX_LEN).unwrap().precedence() >= Precedence::Default);
}

#[test]
fn installed_facet_dominates_every_discarded_one() {
	let offers = [
		(Precedence::Default, 1, 1),
		(Precedence::Inferred, 4, 2),
		(Precedence::High, 2, 3),
		(Precedence::Default, 6, 4),
		(Precedence::High, 5, 5),
		(Precedence::Fallback, 9, 6),
	];
	let mut h = holder();
	for (precedence, ordinal, value) in offers {
		h.add_facet(facet(MAX_LEN, precedence, FacetValue::Int(value), ordinal));
	}

	let installed = h.facet(MAX_LEN).unwrap();
	assert_eq!(installed.value().as_int(), Some(5));
	for note in h.shadowed() {
		assert_ne!(
			holder::cmp_contender(&note.winner, &note.loser),
			std::cmp::Ordering::Less
		);
		assert!(
			(installed.precedence(), installed.origin().ordinal)
				>= (note.loser.precedence, note.loser.ordinal)
		);
	}
}

#[test]
fn type_links_compare_by_name() {
	let pending = TypeLink::to("B");
	let unresolved = TypeLink::Unresolved(TypeName::new("B"));
	assert_eq!(pending, unresolved);
	assert_ne!(pending, TypeLink::to("C"));
	assert!(unresolved.is_unresolved());
	assert!(pending.spec_id().is_none());
}

#[test]
fn flag_accessor_honours_explicit_false() {
	let mut h = holder();
	h.add_facet(Facet::flag(MANDATORY, Precedence::Default));
	assert!(h.flag(MANDATORY));

	let mut h = holder();
	h.add_facet(Facet::new(MANDATORY, Precedence::Default, FacetValue::Bool(false)));
	assert!(!h.flag(MANDATORY));
	assert!(!h.flag(MAX_LEN));
}
