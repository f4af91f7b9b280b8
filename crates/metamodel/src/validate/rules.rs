use super::{ValidationRule, ValidationSink};
use crate::spec::MetamodelGraph;

/// Reports every super-type or facet reference that could not be resolved.
///
/// Always installed by the validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnresolvedReferences;

impl ValidationRule for UnresolvedReferences {
	fn name(&self) -> &'static str {
		"unresolved-reference"
	}

	fn validate(&self, graph: &MetamodelGraph, sink: &mut ValidationSink<'_>) {
		for spec in graph {
			if let Some(link) = spec.super_link().filter(|l| l.is_unresolved()) {
				sink.error(
					spec.identifier(),
					format!("super-type `{}` cannot be resolved", link.name()),
				);
			}
		}
		for holder in graph.holders() {
			for (tag, link) in holder.type_links().filter(|(_, l)| l.is_unresolved()) {
				sink.error(
					holder.identifier(),
					format!("`{tag}` refers to unknown type `{}`", link.name()),
				);
			}
		}
	}
}
