use std::slice;

use super::{IntrospectionState, SpecRef};
use crate::facet::FacetHolder;
use crate::validate::ValidationFailure;

/// Ordered snapshot of the published specifications of one cache generation.
///
/// Input to the validator, diagnostics and export. Taken after
/// [`ensure_fully_introspected`](crate::loader::SpecificationLoader::ensure_fully_introspected)
/// it covers every member; otherwise members not yet introspected are absent.
#[derive(Debug, Clone)]
pub struct MetamodelGraph {
	specs: Vec<SpecRef>,
	defects: Vec<ValidationFailure>,
}

impl MetamodelGraph {
	pub(crate) fn new(specs: Vec<SpecRef>, mut defects: Vec<ValidationFailure>) -> Self {
		defects.sort();
		defects.dedup();
		Self { specs, defects }
	}

	/// Specifications in canonical name order.
	pub fn iter(&self) -> slice::Iter<'_, SpecRef> {
		self.specs.iter()
	}

	pub fn len(&self) -> usize {
		self.specs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.specs.is_empty()
	}

	pub fn get(&self, name: &str) -> Option<&SpecRef> {
		self.specs
			.binary_search_by(|spec| spec.name().as_str().cmp(name))
			.ok()
			.map(|at| &self.specs[at])
	}

	/// Defects extractors reported while building this generation.
	pub fn defects(&self) -> &[ValidationFailure] {
		&self.defects
	}

	/// True when every specification has its members published.
	pub fn is_complete(&self) -> bool {
		self.specs
			.iter()
			.all(|spec| spec.state() == IntrospectionState::FullyIntrospected)
	}

	/// Every holder in the graph: each type, then its members, each followed
	/// by its parameters.
	pub fn holders(&self) -> impl Iterator<Item = &FacetHolder> + '_ {
		self.specs.iter().flat_map(|spec| {
			let members = spec.members_if_loaded().unwrap_or_default();
			std::iter::once(spec.facets()).chain(members.iter().flat_map(|member| {
				std::iter::once(member.facets()).chain(member.parameters().iter().map(|p| p.facets()))
			}))
		})
	}
}

impl<'a> IntoIterator for &'a MetamodelGraph {
	type Item = &'a SpecRef;
	type IntoIter = slice::Iter<'a, SpecRef>;

	fn into_iter(self) -> Self::IntoIter {
		self.specs.iter()
	}
}
