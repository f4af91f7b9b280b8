use pretty_assertions::assert_eq;

use super::*;
use crate::spec::MetamodelGraph;
use crate::validate::ValidationSink;

fn noop(_: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
	Ok(())
}

struct NamedRule(&'static str);

impl ValidationRule for NamedRule {
	fn name(&self) -> &'static str {
		self.0
	}

	fn validate(&self, _graph: &MetamodelGraph, _sink: &mut ValidationSink<'_>) {}
}

#[test]
fn order_is_group_then_registration() {
	let mut b = ProgrammingModel::builder();
	b.extractor(ExtractorMeta::new("late-a", 2, FeatureKindSet::TYPE), noop)
		.unwrap();
	b.extractor(ExtractorMeta::new("early-a", 0, FeatureKindSet::MEMBERS), noop)
		.unwrap();
	b.extractor(ExtractorMeta::new("late-b", 2, FeatureKindSet::TYPE), noop)
		.unwrap();
	b.extractor(ExtractorMeta::new("early-b", 0, FeatureKindSet::PARAMETER), noop)
		.unwrap();
	b.extractor(ExtractorMeta::new("middle", 1, FeatureKindSet::all()), noop)
		.unwrap();
	let model = b.build();

	let order: Vec<(u32, &str)> = model.order().map(|s| (s.ordinal, s.id)).collect();
	assert_eq!(
		order,
		vec![
			(1, "early-a"),
			(2, "early-b"),
			(3, "middle"),
			(4, "late-a"),
			(5, "late-b"),
		]
	);
}

#[test]
fn order_is_reproducible_across_builds() {
	let build = || {
		let mut b = ProgrammingModel::builder();
		for (id, group) in [("x", 3), ("y", 1), ("z", 3), ("w", 0)] {
			b.extractor(ExtractorMeta::new(id, group, FeatureKindSet::TYPE), noop)
				.unwrap();
		}
		b.build().order().collect::<Vec<_>>()
	};
	assert_eq!(build(), build());
}

#[test]
fn extractors_for_filters_by_kind() {
	let mut b = ProgrammingModel::builder();
	b.extractor(ExtractorMeta::new("type", 0, FeatureKindSet::TYPE), noop)
		.unwrap();
	b.extractor(ExtractorMeta::new("props", 0, FeatureKindSet::PROPERTY), noop)
		.unwrap();
	b.extractor(
		ExtractorMeta::new("params", 0, FeatureKindSet::PARAMETER | FeatureKindSet::ACTION),
		noop,
	)
	.unwrap();
	let model = b.build();

	let ids = |kind| {
		model
			.extractors_for(kind)
			.map(|e| e.meta().id)
			.collect::<Vec<_>>()
	};
	assert_eq!(ids(FeatureKind::Type), vec!["type"]);
	assert_eq!(ids(FeatureKind::Property), vec!["props"]);
	assert_eq!(ids(FeatureKind::Action), vec!["params"]);
	assert_eq!(ids(FeatureKind::Parameter), vec!["params"]);
	assert!(ids(FeatureKind::Collection).is_empty());
}

#[test]
fn duplicate_ids_are_rejected() {
	let mut b = ProgrammingModel::builder();
	b.extractor(ExtractorMeta::new("same", 0, FeatureKindSet::TYPE), noop)
		.unwrap();
	let err = b
		.extractor(ExtractorMeta::new("same", 5, FeatureKindSet::MEMBERS), noop)
		.err()
		.expect("duplicate must fail");
	assert!(matches!(err, ModelError::DuplicateExtractor { id: "same" }));
	assert_eq!(b.len(), 1);

	b.rule(NamedRule("r")).unwrap();
	assert!(matches!(
		b.rule(NamedRule("r")).err(),
		Some(ModelError::DuplicateRule { name: "r" })
	));
}

struct Plugin;

impl MetamodelPlugin for Plugin {
	fn name(&self) -> &'static str {
		"test-plugin"
	}

	fn register(&self, builder: &mut ProgrammingModelBuilder) -> Result<(), ModelError> {
		builder.extractor(ExtractorMeta::new("p1", 0, FeatureKindSet::TYPE), noop)?;
		builder.rule(NamedRule("p-rule"))?;
		Ok(())
	}
}

#[test]
fn plugins_register_extractors_and_rules() {
	let mut b = ProgrammingModel::builder();
	b.install(&Plugin).unwrap();
	let model = b.build();

	assert_eq!(model.plugins(), &["test-plugin"]);
	assert_eq!(model.extractors().len(), 1);
	assert_eq!(model.rules()[0].name(), "p-rule");
	// Installing twice collides on the extractor id.
	let mut b = ProgrammingModel::builder();
	b.install(&Plugin).unwrap();
	assert!(b.install(&Plugin).is_err());
}
