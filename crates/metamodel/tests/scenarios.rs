//! End-to-end introspection scenarios: precedence across processing groups and
//! cyclic type graphs.

use pretty_assertions::assert_eq;
use specgraph_metamodel::{
	Declaration, ExtractError, ExtractorMeta, Facet, FacetTag, FacetValue, FeatureKindSet,
	IntrospectionState, MemberDescriptor, Precedence, ProcessContext, ProgrammingModel,
	SpecificationLoader, TypeCatalog, TypeDescriptor, TypeName, tags,
};

const VIEW_MODEL: FacetTag = FacetTag::new("view-model");
const MANDATORY: FacetTag = FacetTag::new("mandatory");

fn view_model_marker(ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
	if ctx.declaration().has_marker("view-model") {
		ctx.add_facet(Facet::flag(VIEW_MODEL, Precedence::Default));
	}
	Ok(())
}

/// E1: every member called `name` is mandatory.
fn name_is_mandatory(ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
	if ctx.declaration().name() == "name" {
		ctx.add_facet(Facet::new(MANDATORY, Precedence::Default, FacetValue::Bool(true)));
	}
	Ok(())
}

/// E2: on view models, `name` is optional, overriding E1.
fn view_models_relax_name(ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
	if ctx.declaration().name() == "name" && ctx.type_facets().flag(VIEW_MODEL) {
		ctx.add_facet(Facet::new(MANDATORY, Precedence::High, FacetValue::Bool(false)));
	}
	Ok(())
}

fn precedence_model() -> ProgrammingModel {
	let mut b = ProgrammingModel::builder();
	b.extractor(
		ExtractorMeta::new("e2-view-model-name", 1, FeatureKindSet::MEMBERS),
		view_models_relax_name,
	)
	.unwrap();
	b.extractor(
		ExtractorMeta::new("e1-name-mandatory", 0, FeatureKindSet::MEMBERS),
		name_is_mandatory,
	)
	.unwrap();
	b.extractor(
		ExtractorMeta::new("view-model-marker", 0, FeatureKindSet::TYPE),
		view_model_marker,
	)
	.unwrap();
	b.build()
}

#[test]
fn higher_precedence_from_later_group_wins_only_where_it_applies() {
	let catalog = TypeCatalog::new()
		.with_value_types(["String"])
		.with(
			TypeDescriptor::new("T")
				.with_marker("view-model")
				.member(MemberDescriptor::property("name", "String")),
		)
		.with(TypeDescriptor::new("U").member(MemberDescriptor::property("name", "String")));
	let loader = SpecificationLoader::new(precedence_model(), catalog);

	let t = loader.load_specification("T").unwrap();
	let u = loader.load_specification("U").unwrap();
	let t_name = t.member("name").unwrap().unwrap();
	let u_name = u.member("name").unwrap().unwrap();

	assert_eq!(t_name.facets().bool(MANDATORY), Some(false));
	assert_eq!(t_name.facet(MANDATORY).unwrap().origin().extractor, "e2-view-model-name");
	assert_eq!(u_name.facets().bool(MANDATORY), Some(true));
	assert!(u_name.facets().shadowed().is_empty());

	let notes = loader.diagnostics();
	assert_eq!(notes.shadowed.len(), 1);
	assert_eq!(notes.shadowed[0].identifier, *t_name.identifier());
	assert_eq!(notes.shadowed[0].loser.extractor, "e1-name-mandatory");
}

#[test]
fn processing_order_is_group_then_registration() {
	let model = precedence_model();
	let order: Vec<_> = model.order().map(|s| (s.ordinal, s.id, s.group)).collect();
	assert_eq!(
		order,
		vec![
			(1, "e1-name-mandatory", 0),
			(2, "view-model-marker", 0),
			(3, "e2-view-model-name", 1),
		]
	);
}

#[test]
fn mutually_referencing_members_resolve_both_ways() {
	let catalog = TypeCatalog::new()
		.with(TypeDescriptor::new("A").member(MemberDescriptor::property("peer", "B")))
		.with(TypeDescriptor::new("B").member(MemberDescriptor::property("peer", "A")));
	let loader = SpecificationLoader::new(ProgrammingModel::builder().build(), catalog);

	let a = loader.load_specification("A").unwrap();
	let a_peer = a.member("peer").unwrap().unwrap();
	let link = a_peer.facets().type_link(tags::TYPE).unwrap();
	assert_eq!(link.name(), &TypeName::new("B"));

	let b = a.resolve(link).unwrap().unwrap();
	assert_eq!(b.state(), IntrospectionState::FullyIntrospected);
	assert_eq!(a.state(), IntrospectionState::FullyIntrospected);

	let b_peer = b.member("peer").unwrap().unwrap();
	let back = b.resolve(b_peer.facets().type_link(tags::TYPE).unwrap()).unwrap();
	assert_eq!(back, Some(a));
}

#[test]
fn self_referencing_super_type_terminates() {
	let catalog = TypeCatalog::new()
		.with(TypeDescriptor::new("Node").extends("Node"))
		.with(TypeDescriptor::new("Other"));
	let loader = SpecificationLoader::new(ProgrammingModel::builder().build(), catalog);

	let node = loader.load_specification("Node").unwrap();
	let other = loader.load_specification("Other").unwrap();
	assert_eq!(node.state(), IntrospectionState::FullyIntrospected);
	assert_eq!(node.super_type().unwrap(), Some(node.clone()));
	assert!(node.is_of_type(&node).unwrap());
	assert!(!node.is_of_type(&other).unwrap());
	assert_eq!(loader.stats().phase1_runs, 2);
}

#[test]
fn super_and_sub_types_link_through_placeholders() {
	let catalog = TypeCatalog::new()
		.with(TypeDescriptor::new("Party").abstract_type())
		.with(TypeDescriptor::new("Person").extends("Party"))
		.with(TypeDescriptor::new("Employee").extends("Person"))
		.with(TypeDescriptor::new("Company").extends("Party"))
		.with(TypeDescriptor::new("Loop1").extends("Loop2"))
		.with(TypeDescriptor::new("Loop2").extends("Loop1"));
	let loader = SpecificationLoader::new(ProgrammingModel::builder().build(), catalog);

	let employee = loader.load_specification("Employee").unwrap();
	let company = loader.load_specification("Company").unwrap();
	let party = loader.lookup("Party").unwrap();

	assert!(employee.is_of_type(&party).unwrap());
	assert!(!employee.is_of_type(&company).unwrap());
	let subs: Vec<String> = party
		.sub_types()
		.unwrap()
		.iter()
		.map(|s| s.name().to_string())
		.collect();
	assert_eq!(subs, vec!["Company", "Person"]);

	let loop1 = loader.load_specification("Loop1").unwrap();
	let loop2 = loader.lookup("Loop2").unwrap();
	assert!(loop1.is_of_type(&loop2).unwrap());
	assert!(loop2.is_of_type(&loop1).unwrap());
	assert!(!loop1.is_of_type(&party).unwrap());
}
