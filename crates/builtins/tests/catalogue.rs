//! The builtin catalogue installed on a real loader.

use pretty_assertions::assert_eq;
use rstest::rstest;
use specgraph_builtins::{BuiltinsPlugin, extractors, markers, tags};
use specgraph_metamodel::{
	ExtractError, ExtractorMeta, Facet, FacetValue, FeatureKindSet, Marker, MemberDescriptor,
	ModelError, ParameterDescriptor, Precedence, ProcessContext, ProgrammingModel, Severity,
	SpecificationLoader, TypeCatalog, TypeDescriptor, ValidationFailures,
};

fn builtins() -> ProgrammingModel {
	let mut b = ProgrammingModel::builder();
	b.install(&BuiltinsPlugin).unwrap();
	b.build()
}

fn crm() -> TypeCatalog {
	TypeCatalog::new()
		.with_value_types(["String", "Int"])
		.with(
			TypeDescriptor::new("Customer")
				.with_marker(Marker::text(markers::LOGICAL_TYPE_NAME, "crm.Customer"))
				.member(
					MemberDescriptor::property("firstName", "String")
						.with_marker(markers::TITLE)
						.with_marker(Marker::int(markers::MAX_LENGTH, 40)),
				)
				.member(MemberDescriptor::property("nickname", "String").with_marker(markers::OPTIONAL))
				.member(MemberDescriptor::collection("addresses", "Address"))
				.member(
					MemberDescriptor::action("rename")
						.parameter(ParameterDescriptor::new("new_name", "String")),
				),
		)
		.with(
			TypeDescriptor::new("Address")
				.with_marker(markers::IMMUTABLE)
				.member(MemberDescriptor::property("street", "String"))
				.member(MemberDescriptor::property("note", "String").with_marker(markers::EDITABLE)),
		)
}

fn rules_of(failures: &ValidationFailures) -> Vec<(String, &'static str, Severity)> {
	failures
		.iter()
		.map(|f| (f.identifier().to_string(), f.rule(), f.severity()))
		.collect()
}

#[test]
fn plugin_registers_in_one_group() {
	let model = builtins();
	assert_eq!(model.plugins(), &["builtins"]);
	assert!(model.order().all(|step| step.group == extractors::GROUP));
	let ids: Vec<&str> = model.order().map(|step| step.id).take(3).collect();
	assert_eq!(
		ids,
		vec!["builtins.logical-type-name", "builtins.type-sort", "builtins.immutable"]
	);
}

#[test]
fn installing_twice_is_rejected() {
	let mut b = ProgrammingModel::builder();
	b.install(&BuiltinsPlugin).unwrap();
	let err = b.install(&BuiltinsPlugin).err().unwrap();
	assert!(matches!(err, ModelError::DuplicateExtractor { id: "builtins.logical-type-name" }));
}

#[test]
fn conventions_and_markers_become_facets() {
	let loader = SpecificationLoader::new(builtins(), crm());
	let customer = loader.load_specification("Customer").unwrap();

	assert_eq!(customer.facets().text(tags::TYPE_SORT), Some("entity"));
	assert_eq!(customer.facets().text(tags::NAMED), Some("Customer"));
	assert_eq!(loader.lookup_by_logical_name("crm.Customer"), Some(customer.clone()));

	let first = customer.member("firstName").unwrap().unwrap();
	assert_eq!(first.facets().text(tags::NAMED), Some("First Name"));
	assert_eq!(first.facets().bool(tags::MANDATORY), Some(true));
	assert_eq!(first.facets().int(tags::MAX_LENGTH), Some(40));
	assert!(first.facets().flag(tags::TITLE));

	let nickname = customer.member("nickname").unwrap().unwrap();
	assert_eq!(nickname.facets().bool(tags::MANDATORY), Some(false));
	assert_eq!(nickname.facet(tags::MANDATORY).map(Facet::precedence), Some(Precedence::Default));

	let rename = customer.member("rename").unwrap().unwrap();
	assert!(rename.facet(tags::MANDATORY).is_none());
	let param = rename.parameter(0).unwrap();
	assert_eq!(param.facets().text(tags::NAMED), Some("New Name"));
	assert_eq!(param.facets().bool(tags::MANDATORY), Some(true));
}

#[test]
fn value_types_are_immutable_and_members_of_immutable_types_disabled() {
	let loader = SpecificationLoader::new(builtins(), crm());
	loader.load_specification("Customer").unwrap();

	let string = loader.lookup("String").unwrap();
	assert_eq!(string.facets().text(tags::TYPE_SORT), Some("value"));
	assert_eq!(string.facet(tags::IMMUTABLE).map(Facet::precedence), Some(Precedence::Inferred));

	let address = loader.lookup("Address").unwrap();
	let street = address.member("street").unwrap().unwrap();
	assert_eq!(street.facets().bool(tags::DISABLED), Some(true));
	let note = address.member("note").unwrap().unwrap();
	assert_eq!(note.facets().bool(tags::DISABLED), Some(false));
}

#[test]
fn rules_flag_conflicts_across_the_graph() {
	let loader = SpecificationLoader::new(builtins(), crm());
	let failures = loader.introspect_and_validate(["Customer"]).unwrap();
	assert_eq!(
		rules_of(&failures),
		vec![(
			"Address#note".to_string(),
			"immutable-editable-conflict",
			Severity::Error,
		)]
	);
	assert!(failures.into_result().is_err());
}

#[test]
fn duplicate_logical_names_and_value_collections_are_reported() {
	let catalog = TypeCatalog::new()
		.with_value_types(["Tag"])
		.with(TypeDescriptor::new("Person").with_marker(Marker::text(markers::LOGICAL_TYPE_NAME, "Party")))
		.with(
			TypeDescriptor::new("Party")
				.member(MemberDescriptor::collection("tags", "Tag"))
				.member(MemberDescriptor::property("code", "Tag").with_marker(markers::TITLE))
				.member(MemberDescriptor::property("label", "Tag").with_marker(markers::TITLE)),
		);
	let loader = SpecificationLoader::new(builtins(), catalog);
	let failures = loader.introspect_and_validate(["Party", "Person"]).unwrap();

	assert_eq!(
		rules_of(&failures),
		vec![
			("Party".to_string(), "single-title", Severity::Warning),
			("Party".to_string(), "duplicate-logical-type-name", Severity::Error),
			("Party#tags".to_string(), "collection-element-type", Severity::Warning),
			("Person".to_string(), "duplicate-logical-type-name", Severity::Error),
		]
	);
}

#[rstest]
#[case::wrong_payload(Marker::text(markers::MAX_LENGTH, "forty"), "builtins.max-length")]
#[case::missing_payload(Marker::flag(markers::MAX_LENGTH), "builtins.max-length")]
#[case::contradiction(Marker::flag(markers::OPTIONAL), "builtins.mandatory")]
fn bad_markers_become_extractor_defects(#[case] marker: Marker, #[case] rule: &'static str) {
	let catalog = TypeCatalog::new().with_value_types(["String"]).with(
		TypeDescriptor::new("Note").member(
			MemberDescriptor::property("body", "String")
				.with_marker(markers::MANDATORY)
				.with_marker(marker),
		),
	);
	let loader = SpecificationLoader::new(builtins(), catalog);
	let failures = loader.introspect_and_validate(["Note"]).unwrap();

	assert_eq!(
		rules_of(&failures),
		vec![("Note#body".to_string(), rule, Severity::Error)]
	);
}

#[test]
fn non_positive_max_length_is_an_error() {
	let catalog = TypeCatalog::new().with_value_types(["String"]).with(
		TypeDescriptor::new("Note").member(
			MemberDescriptor::property("body", "String").with_marker(Marker::int(markers::MAX_LENGTH, 0)),
		),
	);
	let loader = SpecificationLoader::new(builtins(), catalog);
	let failures = loader.introspect_and_validate(["Note"]).unwrap();
	assert_eq!(
		rules_of(&failures),
		vec![("Note#body".to_string(), "positive-max-length", Severity::Error)]
	);
}

#[test]
fn application_extractors_in_later_groups_override_builtins() {
	let mut b = ProgrammingModel::builder();
	b.install(&BuiltinsPlugin).unwrap();
	b.extractor(
		ExtractorMeta::new("app.labels", extractors::GROUP + 1, FeatureKindSet::PROPERTY),
		|ctx: &mut ProcessContext<'_>| {
			let label = format!("[{}]", ctx.declaration().name());
			ctx.add_facet(Facet::new(tags::NAMED, Precedence::Default, FacetValue::text(&label)));
			Ok::<_, ExtractError>(())
		},
	)
	.unwrap();
	let loader = SpecificationLoader::new(b.build(), crm());
	let customer = loader.load_specification("Customer").unwrap();

	let first = customer.member("firstName").unwrap().unwrap();
	assert_eq!(first.facets().text(tags::NAMED), Some("[firstName]"));
	let report = loader.diagnostics();
	let losers: Vec<String> = report
		.lost_by("builtins.named")
		.map(|note| note.identifier.to_string())
		.collect();
	assert!(losers.contains(&"Customer#firstName".to_string()));
}
