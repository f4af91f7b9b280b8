//! Specification loader: the cache and the introspection orchestrator.
//!
//! # Role
//!
//! [`SpecificationLoader`] turns canonical type names into published
//! [`TypeSpecification`]s, running each type's phase 1 exactly once per cache
//! generation and its phase 2 exactly once, either immediately (`full`) or on
//! first member access (`lazy`). Both modes converge on the same graph.
//!
//! # Concurrency
//!
//! - Published nodes are read without locks.
//! - Concurrent first requests for one type coalesce onto one construction; the
//!   others wait, bounded by `introspection.coalesce_timeout_ms`.
//! - Cycles, within one thread or across waiting threads, are broken by handing
//!   out the placeholder instead of blocking.
//! - [`SpecificationLoader::reset`] is exclusive: every other operation holds a
//!   shared gate for its duration.
//!
//! # Invariants
//!
//! - At most one phase-1 and one phase-2 run per type and generation (see
//!   `tests::concurrent_first_requests_construct_once`).
//! - Partially built nodes are never published.

mod arena;
mod introspect;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use arena::Claim;
pub(crate) use arena::SpecArena;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use crate::canonical::{Canonicalize, ProxyCanonicalizer};
use crate::config::{IntrospectionMode, MetamodelConfig};
use crate::diagnostics::DiagnosticReport;
use crate::error::LoadError;
use crate::facet::tags;
use crate::model::ProgrammingModel;
use crate::spec::{IntrospectionState, MetamodelGraph, SpecRef, TypeSpecification};
use crate::types::{TypeName, TypeSource};
use crate::validate::{MetaModelValidator, ValidationFailures};

/// How far a caller needs a node to be introspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Depth {
	/// Type-level facets only.
	Phase1,
	/// Whatever the configured mode settles on.
	Settled,
	/// Members too.
	Members,
}

/// Run counters for the current cache generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoaderStats {
	pub generation: u64,
	/// Types reachable by name, placeholders included.
	pub types: usize,
	pub phase1_runs: usize,
	pub phase2_runs: usize,
}

pub(crate) struct LoaderCore {
	model: ProgrammingModel,
	source: Arc<dyn TypeSource>,
	canonicalizer: Arc<dyn Canonicalize>,
	config: MetamodelConfig,
	validator: MetaModelValidator,
	current: ArcSwap<SpecArena>,
	generation: AtomicU64,
	gate: RwLock<()>,
}

impl LoaderCore {
	pub(crate) fn gate(&self) -> &RwLock<()> {
		&self.gate
	}

	fn mode(&self) -> IntrospectionMode {
		self.config.introspection.mode
	}

	/// Resolves a reference target during construction; placeholders allowed.
	fn link_target(&self, arena: &SpecArena, name: &TypeName) -> Result<Arc<TypeSpecification>, LoadError> {
		if let Some(spec) = arena.by_name(name)
			&& spec.state() >= IntrospectionState::Phase1Done
		{
			return Ok(spec);
		}
		let descriptor = self
			.source
			.descriptor(name)
			.ok_or_else(|| LoadError::UnknownType {
				type_name: name.clone(),
			})?;
		match arena.claim(&descriptor, self.config.coalesce_timeout())? {
			Claim::Ready(spec) | Claim::Placeholder(spec) => Ok(spec),
			Claim::Construct(guard) => self.construct_phase1(arena, guard),
		}
	}

	/// Obtains a published node at the requested depth.
	pub(crate) fn obtain(
		&self,
		arena: &SpecArena,
		name: &TypeName,
		depth: Depth,
	) -> Result<Arc<TypeSpecification>, LoadError> {
		let spec = self.link_target(arena, name)?;
		if spec.state() < IntrospectionState::Phase1Done {
			return Err(LoadError::Reentrant {
				type_name: name.clone(),
			});
		}
		match depth {
			Depth::Phase1 => {}
			Depth::Members => self.ensure_members(arena, &spec)?,
			Depth::Settled => {
				if self.mode() == IntrospectionMode::Full
					&& spec.state() < IntrospectionState::FullyIntrospected
				{
					self.expand_closure(arena, Arc::clone(&spec))?;
				}
			}
		}
		Ok(spec)
	}

	/// Runs phase 2 for `spec` unless already published.
	pub(crate) fn ensure_members(&self, arena: &SpecArena, spec: &TypeSpecification) -> Result<(), LoadError> {
		if spec.members_if_loaded().is_some() {
			return Ok(());
		}
		let timeout = self.config.coalesce_timeout();
		let Some(_lock) = spec.members_lock().try_lock_for(timeout) else {
			tracing::warn!(type_name = %spec.name(), "timed out waiting for member introspection");
			return Err(LoadError::CoalesceTimeout {
				type_name: spec.name().clone(),
				waited: timeout,
			});
		};
		if spec.members_if_loaded().is_some() {
			return Ok(());
		}
		let (members, defects) = self.introspect_members(arena, spec)?;
		arena.record_defects(defects);
		spec.publish_members(members);
		arena.count_phase2();
		Ok(())
	}

	/// Full mode: expands `root` and everything it references.
	fn expand_closure(&self, arena: &SpecArena, root: Arc<TypeSpecification>) -> Result<(), LoadError> {
		let mut queue = VecDeque::from([root]);
		let mut seen = FxHashSet::default();
		while let Some(spec) = queue.pop_front() {
			if !seen.insert(spec.id()) {
				continue;
			}
			self.ensure_members(arena, &spec)?;
			for name in outgoing_links(&spec) {
				let target = self.obtain(arena, &name, Depth::Phase1);
				match target {
					Ok(target) => queue.push_back(target),
					Err(LoadError::UnknownType { .. }) => {}
					Err(err) => return Err(err),
				}
			}
		}
		Ok(())
	}

	/// Drives every cached node to `FullyIntrospected`; repeats until member
	/// expansion stops discovering new types.
	fn expand_all(&self, arena: &SpecArena) -> Result<(), LoadError> {
		loop {
			let mut progressed = false;
			for spec in arena.live() {
				if spec.state() == IntrospectionState::FullyIntrospected {
					continue;
				}
				let spec = self.obtain(arena, spec.name(), Depth::Phase1)?;
				self.ensure_members(arena, &spec)?;
				progressed = true;
			}
			if !progressed {
				return Ok(());
			}
		}
	}

	fn arena(&self) -> Arc<SpecArena> {
		self.current.load_full()
	}

	fn graph_of(self: &Arc<Self>, arena: &Arc<SpecArena>) -> MetamodelGraph {
		let specs = arena
			.published()
			.into_iter()
			.map(|spec| SpecRef::new(Arc::clone(self), Arc::clone(arena), spec))
			.collect();
		MetamodelGraph::new(specs, arena.defects())
	}
}

/// Canonical names of every type `spec` references through facets or its
/// super-type link.
fn outgoing_links(spec: &TypeSpecification) -> Vec<TypeName> {
	let mut names: Vec<TypeName> = spec
		.super_link()
		.into_iter()
		.chain(spec.facets().type_links().map(|(_, link)| link))
		.filter(|link| !link.is_unresolved())
		.map(|link| link.name().clone())
		.collect();
	for member in spec.members_if_loaded().unwrap_or_default() {
		let holders = std::iter::once(member.facets()).chain(member.parameters().iter().map(|p| p.facets()));
		for holder in holders {
			names.extend(
				holder
					.type_links()
					.filter(|(_, link)| !link.is_unresolved())
					.map(|(_, link)| link.name().clone()),
			);
		}
	}
	names.sort();
	names.dedup();
	names
}

/// Builds and caches the specification graph.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct SpecificationLoader {
	core: Arc<LoaderCore>,
}

/// Configures a [`SpecificationLoader`].
pub struct LoaderBuilder {
	model: ProgrammingModel,
	source: Arc<dyn TypeSource>,
	config: MetamodelConfig,
	canonicalizer: Option<Arc<dyn Canonicalize>>,
}

impl LoaderBuilder {
	pub fn config(mut self, config: MetamodelConfig) -> Self {
		self.config = config;
		self
	}

	pub fn mode(mut self, mode: IntrospectionMode) -> Self {
		self.config.introspection.mode = mode;
		self
	}

	/// Replaces the canonicalizer derived from `canonical` config.
	pub fn canonicalizer(mut self, canonicalizer: impl Canonicalize + 'static) -> Self {
		self.canonicalizer = Some(Arc::new(canonicalizer));
		self
	}

	pub fn build(self) -> SpecificationLoader {
		let canonicalizer = self
			.canonicalizer
			.unwrap_or_else(|| Arc::new(ProxyCanonicalizer::from_config(&self.config.canonical)));
		let validator = MetaModelValidator::new(&self.model).parallel(self.config.validation.parallel);
		tracing::debug!(
			extractors = self.model.extractors().len(),
			rules = self.model.rules().len(),
			mode = ?self.config.introspection.mode,
			"specification loader ready"
		);
		SpecificationLoader {
			core: Arc::new(LoaderCore {
				model: self.model,
				source: self.source,
				canonicalizer,
				config: self.config,
				validator,
				current: ArcSwap::from_pointee(SpecArena::new(0)),
				generation: AtomicU64::new(0),
				gate: RwLock::new(()),
			}),
		}
	}
}

impl SpecificationLoader {
	pub fn new(model: ProgrammingModel, source: impl TypeSource + 'static) -> Self {
		Self::builder(model, source).build()
	}

	pub fn builder(model: ProgrammingModel, source: impl TypeSource + 'static) -> LoaderBuilder {
		LoaderBuilder {
			model,
			source: Arc::new(source),
			config: MetamodelConfig::default(),
			canonicalizer: None,
		}
	}

	pub fn model(&self) -> &ProgrammingModel {
		&self.core.model
	}

	pub fn config(&self) -> &MetamodelConfig {
		&self.core.config
	}

	pub fn canonicalize(&self, raw: &TypeName) -> TypeName {
		self.core.canonicalizer.canonicalize(raw)
	}

	/// Returns the specification of `raw`, introspected as far as the
	/// configured mode requires.
	pub fn load_specification(&self, raw: impl Into<TypeName>) -> Result<SpecRef, LoadError> {
		self.load(raw.into(), Depth::Settled)
	}

	/// Returns the specification with at least its type-level facets.
	pub fn load_phase1(&self, raw: impl Into<TypeName>) -> Result<SpecRef, LoadError> {
		self.load(raw.into(), Depth::Phase1)
	}

	/// Loads every entry type; stops at the first contract violation.
	pub fn load_all<I, N>(&self, entries: I) -> Result<Vec<SpecRef>, LoadError>
	where
		I: IntoIterator<Item = N>,
		N: Into<TypeName>,
	{
		entries
			.into_iter()
			.map(|name| self.load_specification(name))
			.collect()
	}

	fn load(&self, raw: TypeName, depth: Depth) -> Result<SpecRef, LoadError> {
		let _gate = self.core.gate.read_recursive();
		let arena = self.core.arena();
		let name = self.core.canonicalizer.canonicalize(&raw);
		let spec = self.core.obtain(&arena, &name, depth)?;
		Ok(SpecRef::new(Arc::clone(&self.core), arena, spec))
	}

	/// Cached node for `raw`, if published; never constructs.
	pub fn lookup(&self, raw: impl Into<TypeName>) -> Option<SpecRef> {
		let _gate = self.core.gate.read_recursive();
		let arena = self.core.arena();
		let name = self.core.canonicalizer.canonicalize(&raw.into());
		let spec = arena.by_name(&name)?;
		(spec.state() >= IntrospectionState::Phase1Done)
			.then(|| SpecRef::new(Arc::clone(&self.core), arena, spec))
	}

	/// Cached node whose logical type name (or canonical name) is `logical`.
	pub fn lookup_by_logical_name(&self, logical: &str) -> Option<SpecRef> {
		let _gate = self.core.gate.read_recursive();
		let arena = self.core.arena();
		let specs = arena.published();
		let by_facet = specs
			.iter()
			.find(|spec| spec.facets().text(tags::LOGICAL_TYPE_NAME) == Some(logical));
		let spec = by_facet
			.or_else(|| specs.iter().find(|spec| spec.name().as_str() == logical))
			.cloned()?;
		Some(SpecRef::new(Arc::clone(&self.core), arena, spec))
	}

	/// Drives every cached type to `FullyIntrospected`.
	pub fn ensure_fully_introspected(&self) -> Result<(), LoadError> {
		let _gate = self.core.gate.read_recursive();
		self.core.expand_all(&self.core.arena())
	}

	/// Snapshot of every published node in name order.
	pub fn graph(&self) -> MetamodelGraph {
		let _gate = self.core.gate.read_recursive();
		self.core.graph_of(&self.core.arena())
	}

	/// Completes introspection of everything cached, then validates it.
	pub fn validate(&self) -> Result<ValidationFailures, LoadError> {
		let _gate = self.core.gate.read_recursive();
		let arena = self.core.arena();
		self.core.expand_all(&arena)?;
		let graph = self.core.graph_of(&arena);
		Ok(self.core.validator.validate(&graph))
	}

	/// Loads the entry types and validates the resulting graph.
	pub fn introspect_and_validate<I, N>(&self, entries: I) -> Result<ValidationFailures, LoadError>
	where
		I: IntoIterator<Item = N>,
		N: Into<TypeName>,
	{
		let _gate = self.core.gate.read_recursive();
		self.load_all(entries)?;
		self.validate()
	}

	/// Shadowed-facet notes across the published graph.
	pub fn diagnostics(&self) -> DiagnosticReport {
		DiagnosticReport::collect(&self.graph())
	}

	pub fn stats(&self) -> LoaderStats {
		let arena = self.core.arena();
		LoaderStats {
			generation: arena.generation(),
			types: arena.live().len(),
			phase1_runs: arena.phase1_runs(),
			phase2_runs: arena.phase2_runs(),
		}
	}

	/// Drops the whole cache and starts a new generation.
	///
	/// Blocks until no other operation is in flight. Handles obtained before
	/// the reset keep reading the generation they were obtained from. Must not
	/// be called from inside a validation rule.
	pub fn reset(&self) {
		let _gate = self.core.gate.write();
		let generation = self.core.generation.fetch_add(1, Ordering::AcqRel) + 1;
		self.core.current.store(Arc::new(SpecArena::new(generation)));
		tracing::info!(generation, "specification cache reset");
	}
}

impl std::fmt::Debug for SpecificationLoader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SpecificationLoader")
			.field("mode", &self.core.mode())
			.field("stats", &self.stats())
			.finish()
	}
}
