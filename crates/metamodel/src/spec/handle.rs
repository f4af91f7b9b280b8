use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::{IntrospectionState, MemberSpecification, TypeSpecification};
use crate::error::LoadError;
use crate::facet::TypeLink;
use crate::feature::FeatureKindSet;
use crate::loader::{Depth, LoaderCore, SpecArena};

/// Pinned handle to a published [`TypeSpecification`].
///
/// Keeps its cache generation alive: a handle obtained before
/// [`reset`](crate::loader::SpecificationLoader::reset) keeps navigating the
/// generation it came from. Navigation may trigger introspection of the target
/// (phase 2 in lazy mode, referenced types not yet loaded), which is why it is
/// fallible.
#[derive(Clone)]
pub struct SpecRef {
	core: Arc<LoaderCore>,
	arena: Arc<SpecArena>,
	spec: Arc<TypeSpecification>,
}

impl SpecRef {
	pub(crate) fn new(core: Arc<LoaderCore>, arena: Arc<SpecArena>, spec: Arc<TypeSpecification>) -> Self {
		Self { core, arena, spec }
	}

	/// Cache generation this handle belongs to.
	pub fn generation(&self) -> u64 {
		self.arena.generation()
	}

	/// Members in declaration order, running phase 2 if it has not run yet.
	pub fn members(&self) -> Result<&[MemberSpecification], LoadError> {
		if self.spec.state() < IntrospectionState::FullyIntrospected {
			let _gate = self.core.gate().read_recursive();
			self.core.ensure_members(&self.arena, &self.spec)?;
		}
		Ok(self.spec.members_if_loaded().unwrap_or_default())
	}

	/// Members whose kind is in `kinds`.
	pub fn members_of(
		&self,
		kinds: FeatureKindSet,
	) -> Result<impl Iterator<Item = &MemberSpecification> + '_, LoadError> {
		self.members()?;
		Ok(self.spec.loaded_members_of(kinds))
	}

	pub fn member(&self, name: &str) -> Result<Option<&MemberSpecification>, LoadError> {
		Ok(self.members()?.iter().find(|m| m.name() == name))
	}

	/// Follows a facet's type link within this generation.
	///
	/// Returns `None` for unresolved links.
	pub fn resolve(&self, link: &TypeLink) -> Result<Option<SpecRef>, LoadError> {
		if link.is_unresolved() {
			return Ok(None);
		}
		self.follow(link, Depth::Settled).map(Some)
	}

	pub fn super_type(&self) -> Result<Option<SpecRef>, LoadError> {
		match self.spec.super_link() {
			Some(link) => self.resolve(link),
			None => Ok(None),
		}
	}

	/// Sub-types introspected so far, in name order.
	pub fn sub_types(&self) -> Result<Vec<SpecRef>, LoadError> {
		let _gate = self.core.gate().read_recursive();
		self.spec
			.sub_type_entries()
			.iter()
			.map(|(name, _)| {
				self.core
					.obtain(&self.arena, name, Depth::Settled)
					.map(|spec| self.sibling(spec))
			})
			.collect()
	}

	/// Reflexive-transitive walk up the super-type chain.
	///
	/// Terminates on cyclic hierarchies.
	pub fn is_of_type(&self, other: &SpecRef) -> Result<bool, LoadError> {
		let mut seen = FxHashSet::default();
		let mut current = Arc::clone(&self.spec);
		loop {
			if current.name() == other.name() {
				return Ok(true);
			}
			if !seen.insert(current.id()) {
				return Ok(false);
			}
			let Some(link) = current.super_link().filter(|l| !l.is_unresolved()) else {
				return Ok(false);
			};
			current = self.follow(link, Depth::Phase1)?.spec;
		}
	}

	fn follow(&self, link: &TypeLink, depth: Depth) -> Result<SpecRef, LoadError> {
		let _gate = self.core.gate().read_recursive();
		if let Some(spec) = link.spec_id().and_then(|id| self.arena.get(id))
			&& spec.state() >= IntrospectionState::Phase1Done
			&& depth == Depth::Phase1
		{
			return Ok(self.sibling(spec));
		}
		let spec = self.core.obtain(&self.arena, link.name(), depth)?;
		Ok(self.sibling(spec))
	}

	fn sibling(&self, spec: Arc<TypeSpecification>) -> SpecRef {
		SpecRef::new(Arc::clone(&self.core), Arc::clone(&self.arena), spec)
	}
}

impl Deref for SpecRef {
	type Target = TypeSpecification;

	fn deref(&self) -> &TypeSpecification {
		&self.spec
	}
}

/// Handles are equal when they pin the same node of the same generation.
impl PartialEq for SpecRef {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.spec, &other.spec)
	}
}

impl Eq for SpecRef {}

impl fmt::Debug for SpecRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SpecRef")
			.field("generation", &self.generation())
			.field("spec", &*self.spec)
			.finish()
	}
}
