//! Consistency rules over the facets the builtin extractors produce.

use std::collections::BTreeMap;

use specgraph_metamodel::{
	MemberKind, MetamodelGraph, SpecRef, ValidationRule, ValidationSink, tags as engine_tags,
};

use crate::vocab::{SORT_VALUE, tags};

/// An immutable type must not declare editable members.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmutableEditableConflict;

impl ValidationRule for ImmutableEditableConflict {
	fn name(&self) -> &'static str {
		"immutable-editable-conflict"
	}

	fn validate(&self, graph: &MetamodelGraph, sink: &mut ValidationSink<'_>) {
		for spec in graph.iter().filter(|s| s.facets().flag(tags::IMMUTABLE)) {
			for member in spec.members_if_loaded().unwrap_or_default() {
				if member.facets().bool(tags::DISABLED) == Some(false) {
					sink.error(
						member.identifier(),
						format!("editable member on immutable type `{}`", spec.name()),
					);
				}
			}
		}
	}
}

/// Logical type names must identify one type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateLogicalTypeName;

impl ValidationRule for DuplicateLogicalTypeName {
	fn name(&self) -> &'static str {
		"duplicate-logical-type-name"
	}

	fn validate(&self, graph: &MetamodelGraph, sink: &mut ValidationSink<'_>) {
		let mut by_logical: BTreeMap<&str, Vec<&SpecRef>> = BTreeMap::new();
		for spec in graph {
			if let Some(logical) = spec.facets().text(engine_tags::LOGICAL_TYPE_NAME) {
				by_logical.entry(logical).or_default().push(spec);
			}
		}
		for (logical, specs) in by_logical.into_iter().filter(|(_, specs)| specs.len() > 1) {
			let names: Vec<&str> = specs.iter().map(|s| s.name().as_str()).collect();
			for spec in &specs {
				sink.error(
					spec.identifier(),
					format!("logical type name `{logical}` is shared by {}", names.join(", ")),
				);
			}
		}
	}
}

/// Collections are expected to hold entities, not value types.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionElementType;

impl ValidationRule for CollectionElementType {
	fn name(&self) -> &'static str {
		"collection-element-type"
	}

	fn validate(&self, graph: &MetamodelGraph, sink: &mut ValidationSink<'_>) {
		for spec in graph {
			let collections = spec
				.members_if_loaded()
				.unwrap_or_default()
				.iter()
				.filter(|m| m.kind() == MemberKind::Collection);
			for member in collections {
				let Some(link) = member.facets().type_link(engine_tags::ELEMENT_TYPE) else {
					sink.warning(member.identifier(), "collection has no element type");
					continue;
				};
				let element_is_value = graph
					.get(link.name().as_str())
					.is_some_and(|element| element.facets().text(tags::TYPE_SORT) == Some(SORT_VALUE));
				if element_is_value {
					sink.warning(
						member.identifier(),
						format!("collection of value type `{}`", link.name()),
					);
				}
			}
		}
	}
}

/// A declared maximum length must be positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositiveMaxLength;

impl ValidationRule for PositiveMaxLength {
	fn name(&self) -> &'static str {
		"positive-max-length"
	}

	fn validate(&self, graph: &MetamodelGraph, sink: &mut ValidationSink<'_>) {
		for holder in graph.holders() {
			if let Some(max) = holder.int(tags::MAX_LENGTH).filter(|max| *max <= 0) {
				sink.error(holder.identifier(), format!("max length must be positive, found {max}"));
			}
		}
	}
}

/// At most one property per type provides the title.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleTitle;

impl ValidationRule for SingleTitle {
	fn name(&self) -> &'static str {
		"single-title"
	}

	fn validate(&self, graph: &MetamodelGraph, sink: &mut ValidationSink<'_>) {
		for spec in graph {
			let titles: Vec<&str> = spec
				.members_if_loaded()
				.unwrap_or_default()
				.iter()
				.filter(|m| m.facets().flag(tags::TITLE))
				.map(|m| m.name())
				.collect();
			if titles.len() > 1 {
				sink.warning(
					spec.identifier(),
					format!("several title properties: {}", titles.join(", ")),
				);
			}
		}
	}
}
