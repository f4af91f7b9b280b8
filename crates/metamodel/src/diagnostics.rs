//! Shadowed-facet diagnostics.
//!
//! Shadowing is not a failure: it records where one extractor's contribution
//! lost to another's, so plugin authors can spot unintended overrides.

use rustc_hash::FxHashMap;

use crate::facet::{FacetTag, ShadowNote};
use crate::spec::MetamodelGraph;

/// Report containing every shadow note in a graph, ordered by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticReport {
	pub shadowed: Vec<ShadowNote>,
}

impl DiagnosticReport {
	/// Aggregates notes from every holder in `graph`.
	pub fn collect(graph: &MetamodelGraph) -> Self {
		let mut shadowed: Vec<ShadowNote> = graph
			.holders()
			.flat_map(|holder| holder.shadowed().iter().cloned())
			.collect();
		shadowed.sort_by(|a, b| a.identifier.cmp(&b.identifier).then(a.tag.cmp(&b.tag)));
		Self { shadowed }
	}

	pub fn is_empty(&self) -> bool {
		self.shadowed.is_empty()
	}

	/// Number of notes per facet tag.
	pub fn by_tag(&self) -> FxHashMap<FacetTag, usize> {
		let mut counts = FxHashMap::default();
		for note in &self.shadowed {
			*counts.entry(note.tag).or_default() += 1;
		}
		counts
	}

	/// Notes where `extractor` lost.
	pub fn lost_by<'a>(&'a self, extractor: &'a str) -> impl Iterator<Item = &'a ShadowNote> + 'a {
		self.shadowed
			.iter()
			.filter(move |note| note.loser.extractor == extractor)
	}
}
