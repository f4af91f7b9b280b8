//! Specification nodes: the materialized output of introspection.
//!
//! # Role
//!
//! A [`TypeSpecification`] is created as a placeholder the moment its type is
//! first requested and filled in by the loader in two publications: the type's
//! own facets and super-type link (phase 1), then its members (phase 2). Each
//! publication is a write-once cell, so readers of a published node never lock.
//!
//! Cross-type references are [`SpecId`]s into the loader's arena; the sub-type
//! back-references are the only cyclic part of the graph and hold ids, not
//! owning pointers.
//!
//! # Invariants
//!
//! - A node's state only moves forward: `Placeholder → Phase1Done → FullyIntrospected`.
//! - Facets and members are never observable half-built.
//! - Sub-type lists are ordered by type name.

mod graph;
mod handle;

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
pub use graph::MetamodelGraph;
pub use handle::SpecRef;
use parking_lot::Mutex;

use crate::facet::{Facet, FacetHolder, FacetTag, TypeLink};
use crate::feature::FeatureKindSet;
use crate::identifier::Identifier;
use crate::types::{MemberKind, TypeDescriptor, TypeName};

/// Index of a node in one generation of the specification arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecId(u32);

impl SpecId {
	/// `None` once the index no longer fits the id width.
	pub(crate) fn from_index(index: usize) -> Option<Self> {
		u32::try_from(index).ok().map(Self)
	}

	#[inline]
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for SpecId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// How far introspection of a node has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum IntrospectionState {
	/// In the cache, under construction; no facets yet.
	Placeholder = 1,
	/// Type-level facets and the super-type link are published.
	Phase1Done = 2,
	/// Members and parameters are published too.
	FullyIntrospected = 3,
}

impl IntrospectionState {
	fn from_u8(raw: u8) -> Self {
		match raw {
			3 => Self::FullyIntrospected,
			2 => Self::Phase1Done,
			_ => Self::Placeholder,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Placeholder => "placeholder",
			Self::Phase1Done => "phase1-done",
			Self::FullyIntrospected => "fully-introspected",
		}
	}
}

impl fmt::Display for IntrospectionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An input of an action.
#[derive(Debug, Clone)]
pub struct ParameterSpecification {
	index: u16,
	name: Arc<str>,
	facets: FacetHolder,
}

impl ParameterSpecification {
	pub(crate) fn new(index: u16, name: Arc<str>, facets: FacetHolder) -> Self {
		Self { index, name, facets }
	}

	pub fn index(&self) -> u16 {
		self.index
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn identifier(&self) -> &Identifier {
		self.facets.identifier()
	}

	pub fn facets(&self) -> &FacetHolder {
		&self.facets
	}

	pub fn facet(&self, tag: FacetTag) -> Option<&Facet> {
		self.facets.facet(tag)
	}
}

/// A property, collection or action of a type.
#[derive(Debug, Clone)]
pub struct MemberSpecification {
	kind: MemberKind,
	name: Arc<str>,
	facets: FacetHolder,
	parameters: Vec<ParameterSpecification>,
}

impl MemberSpecification {
	pub(crate) fn new(
		kind: MemberKind,
		name: Arc<str>,
		facets: FacetHolder,
		parameters: Vec<ParameterSpecification>,
	) -> Self {
		Self {
			kind,
			name,
			facets,
			parameters,
		}
	}

	pub fn kind(&self) -> MemberKind {
		self.kind
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn identifier(&self) -> &Identifier {
		self.facets.identifier()
	}

	pub fn facets(&self) -> &FacetHolder {
		&self.facets
	}

	pub fn facet(&self, tag: FacetTag) -> Option<&Facet> {
		self.facets.facet(tag)
	}

	/// Parameters in declaration order; empty unless this is an action.
	pub fn parameters(&self) -> &[ParameterSpecification] {
		&self.parameters
	}

	pub fn parameter(&self, index: u16) -> Option<&ParameterSpecification> {
		self.parameters.get(usize::from(index))
	}
}

/// The metamodel node for one canonical type.
///
/// Obtained through [`SpecRef`]; there are no public mutators.
pub struct TypeSpecification {
	id: SpecId,
	name: TypeName,
	descriptor: Arc<TypeDescriptor>,
	state: AtomicU8,
	facets: OnceLock<FacetHolder>,
	empty_facets: FacetHolder,
	super_type: OnceLock<Option<TypeLink>>,
	sub_types: ArcSwap<Vec<(TypeName, SpecId)>>,
	members: OnceLock<Vec<MemberSpecification>>,
	members_lock: Mutex<()>,
}

impl TypeSpecification {
	pub(crate) fn placeholder(id: SpecId, descriptor: Arc<TypeDescriptor>) -> Self {
		let name = descriptor.name.clone();
		Self {
			id,
			empty_facets: FacetHolder::new(Identifier::for_type(name.clone())),
			name,
			descriptor,
			state: AtomicU8::new(IntrospectionState::Placeholder as u8),
			facets: OnceLock::new(),
			super_type: OnceLock::new(),
			sub_types: ArcSwap::from_pointee(Vec::new()),
			members: OnceLock::new(),
			members_lock: Mutex::new(()),
		}
	}

	#[inline]
	pub fn id(&self) -> SpecId {
		self.id
	}

	/// Canonical type name.
	#[inline]
	pub fn name(&self) -> &TypeName {
		&self.name
	}

	pub fn identifier(&self) -> &Identifier {
		self.facets().identifier()
	}

	pub fn descriptor(&self) -> &TypeDescriptor {
		&self.descriptor
	}

	pub fn state(&self) -> IntrospectionState {
		IntrospectionState::from_u8(self.state.load(Ordering::Acquire))
	}

	/// Type-level facets; empty while the node is a placeholder.
	pub fn facets(&self) -> &FacetHolder {
		self.facets.get().unwrap_or(&self.empty_facets)
	}

	pub fn facet(&self, tag: FacetTag) -> Option<&Facet> {
		self.facets().facet(tag)
	}

	/// The super-type link as resolved in phase 1.
	pub fn super_link(&self) -> Option<&TypeLink> {
		self.super_type.get().and_then(Option::as_ref)
	}

	/// Names of the sub-types introspected so far, in name order.
	pub fn sub_type_names(&self) -> Vec<TypeName> {
		self.sub_types.load().iter().map(|(name, _)| name.clone()).collect()
	}

	/// Members if phase 2 has been published, without triggering it.
	pub fn members_if_loaded(&self) -> Option<&[MemberSpecification]> {
		self.members.get().map(Vec::as_slice)
	}

	/// Published members of the given kinds, without triggering phase 2.
	pub(crate) fn loaded_members_of(
		&self,
		kinds: FeatureKindSet,
	) -> impl Iterator<Item = &MemberSpecification> + '_ {
		self.members_if_loaded()
			.unwrap_or_default()
			.iter()
			.filter(move |m| kinds.covers(m.kind.feature_kind()))
	}

	pub(crate) fn sub_type_entries(&self) -> Arc<Vec<(TypeName, SpecId)>> {
		self.sub_types.load_full()
	}

	pub(crate) fn publish_phase1(&self, facets: FacetHolder, super_type: Option<TypeLink>) {
		let _ = self.super_type.set(super_type);
		let _ = self.facets.set(facets);
		self.advance(IntrospectionState::Phase1Done);
	}

	pub(crate) fn publish_members(&self, members: Vec<MemberSpecification>) {
		let _ = self.members.set(members);
		self.advance(IntrospectionState::FullyIntrospected);
	}

	pub(crate) fn members_lock(&self) -> &Mutex<()> {
		&self.members_lock
	}

	fn advance(&self, state: IntrospectionState) {
		self.state.fetch_max(state as u8, Ordering::AcqRel);
	}

	pub(crate) fn add_sub_type(&self, name: &TypeName, id: SpecId) {
		self.sub_types.rcu(|current| {
			let mut next = Vec::clone(current);
			if let Err(at) = next.binary_search_by(|(n, _)| n.cmp(name)) {
				next.insert(at, (name.clone(), id));
			}
			next
		});
	}

	pub(crate) fn remove_sub_type(&self, id: SpecId) {
		self.sub_types.rcu(|current| {
			let mut next = Vec::clone(current);
			next.retain(|(_, sub)| *sub != id);
			next
		});
	}
}

impl fmt::Debug for TypeSpecification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeSpecification")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("state", &self.state())
			.field("facets", &self.facets().len())
			.field("members", &self.members_if_loaded().map(<[_]>::len))
			.finish()
	}
}
