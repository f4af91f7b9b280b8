//! One cache generation: the node table and the construction coordinator.
//!
//! # Role
//!
//! The table is an [`ArcSwap`] snapshot, so lookups of published nodes never
//! lock. Inserting a placeholder and handing out construction ownership happen
//! together under the coordinator mutex; waiters park on the condvar until the
//! owner publishes or abandons.
//!
//! # Invariants
//!
//! - A name maps to at most one live node per generation.
//! - Every placeholder reachable by name has an owning thread.
//! - A thread never blocks on a node it owns, nor on a node whose owner
//!   (transitively) waits on it; it receives the placeholder instead.
//! - Abandoned constructions are unreachable by name and wake all waiters.
//! - Sub-types registered on an abandoned node carry over to the node that
//!   replaces it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use crate::error::LoadError;
use crate::facet::{FacetHolder, TypeLink};
use crate::spec::{IntrospectionState, SpecId, TypeSpecification};
use crate::types::{TypeDescriptor, TypeName};
use crate::validate::ValidationFailure;

#[derive(Clone, Default)]
struct ArenaTable {
	specs: Vec<Arc<TypeSpecification>>,
	by_name: FxHashMap<TypeName, SpecId>,
	/// Abandoned nodes not yet replaced.
	abandoned: FxHashMap<TypeName, SpecId>,
}

/// Who builds what, and who waits for whom.
#[derive(Default)]
struct Coordinator {
	owners: FxHashMap<SpecId, ThreadId>,
	waiting: FxHashMap<ThreadId, SpecId>,
}

impl Coordinator {
	/// True if `owner` is `me` or transitively waits on a node `me` owns.
	fn leads_back(&self, owner: ThreadId, me: ThreadId) -> bool {
		let mut thread = owner;
		for _ in 0..=self.waiting.len() {
			if thread == me {
				return true;
			}
			let Some(node) = self.waiting.get(&thread) else {
				return false;
			};
			let Some(&next) = self.owners.get(node) else {
				return false;
			};
			thread = next;
		}
		false
	}
}

/// Outcome of asking the arena for a node.
pub(crate) enum Claim<'a> {
	/// Phase 1 is published.
	Ready(Arc<TypeSpecification>),
	/// Under construction by this thread or by a thread waiting on this one.
	Placeholder(Arc<TypeSpecification>),
	/// The caller now owns construction of a fresh placeholder.
	Construct(ConstructionGuard<'a>),
}

pub(crate) struct SpecArena {
	generation: u64,
	table: ArcSwap<ArenaTable>,
	coordinator: Mutex<Coordinator>,
	ready: Condvar,
	defects: Mutex<Vec<ValidationFailure>>,
	phase1_runs: AtomicUsize,
	phase2_runs: AtomicUsize,
}

impl SpecArena {
	pub(crate) fn new(generation: u64) -> Self {
		Self {
			generation,
			table: ArcSwap::from_pointee(ArenaTable::default()),
			coordinator: Mutex::new(Coordinator::default()),
			ready: Condvar::new(),
			defects: Mutex::new(Vec::new()),
			phase1_runs: AtomicUsize::new(0),
			phase2_runs: AtomicUsize::new(0),
		}
	}

	pub(crate) fn generation(&self) -> u64 {
		self.generation
	}

	pub(crate) fn get(&self, id: SpecId) -> Option<Arc<TypeSpecification>> {
		self.table.load().specs.get(id.index()).cloned()
	}

	pub(crate) fn by_name(&self, name: &TypeName) -> Option<Arc<TypeSpecification>> {
		let table = self.table.load();
		let id = table.by_name.get(name)?;
		table.specs.get(id.index()).cloned()
	}

	/// Published nodes reachable by name, in name order.
	pub(crate) fn published(&self) -> Vec<Arc<TypeSpecification>> {
		let table = self.table.load();
		let mut specs: Vec<_> = table
			.by_name
			.values()
			.filter_map(|id| table.specs.get(id.index()))
			.filter(|spec| spec.state() >= IntrospectionState::Phase1Done)
			.cloned()
			.collect();
		specs.sort_by(|a, b| a.name().cmp(b.name()));
		specs
	}

	/// Every live node, placeholders included.
	pub(crate) fn live(&self) -> Vec<Arc<TypeSpecification>> {
		let table = self.table.load();
		table
			.by_name
			.values()
			.filter_map(|id| table.specs.get(id.index()))
			.cloned()
			.collect()
	}

	pub(crate) fn record_defects(&self, defects: Vec<ValidationFailure>) {
		if !defects.is_empty() {
			self.defects.lock().extend(defects);
		}
	}

	pub(crate) fn defects(&self) -> Vec<ValidationFailure> {
		self.defects.lock().clone()
	}

	pub(crate) fn count_phase2(&self) {
		self.phase2_runs.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn phase1_runs(&self) -> usize {
		self.phase1_runs.load(Ordering::Relaxed)
	}

	pub(crate) fn phase2_runs(&self) -> usize {
		self.phase2_runs.load(Ordering::Relaxed)
	}

	/// Returns the node for `name`, coalescing onto an in-flight construction
	/// or starting one.
	pub(crate) fn claim(
		&self,
		descriptor: &Arc<TypeDescriptor>,
		timeout: Duration,
	) -> Result<Claim<'_>, LoadError> {
		let name = &descriptor.name;
		let me = thread::current().id();
		let started = Instant::now();
		let deadline = started + timeout;
		let mut coord = self.coordinator.lock();

		loop {
			let Some(spec) = self.by_name(name) else {
				let spec = self.insert_placeholder(descriptor)?;
				coord.owners.insert(spec.id(), me);
				return Ok(Claim::Construct(ConstructionGuard {
					arena: self,
					spec,
					super_id: None,
					completed: false,
				}));
			};

			if spec.state() >= IntrospectionState::Phase1Done {
				return Ok(Claim::Ready(spec));
			}

			let Some(&owner) = coord.owners.get(&spec.id()) else {
				return Ok(Claim::Placeholder(spec));
			};
			if coord.leads_back(owner, me) {
				tracing::trace!(type_name = %name, "cycle resolved with placeholder");
				return Ok(Claim::Placeholder(spec));
			}

			coord.waiting.insert(me, spec.id());
			let timed_out = self.ready.wait_until(&mut coord, deadline).timed_out();
			coord.waiting.remove(&me);

			if timed_out && spec.state() < IntrospectionState::Phase1Done {
				let waited = started.elapsed();
				tracing::warn!(type_name = %name, ?waited, "timed out waiting for construction");
				return Err(LoadError::CoalesceTimeout {
					type_name: name.clone(),
					waited,
				});
			}
		}
	}

	/// Called with the coordinator lock held.
	fn insert_placeholder(&self, descriptor: &Arc<TypeDescriptor>) -> Result<Arc<TypeSpecification>, LoadError> {
		let current = self.table.load_full();
		let mut next = ArenaTable::clone(&current);
		let id = SpecId::from_index(next.specs.len()).ok_or_else(|| LoadError::ArenaFull {
			type_name: descriptor.name.clone(),
		})?;
		let spec = Arc::new(TypeSpecification::placeholder(id, Arc::clone(descriptor)));
		if let Some(old) = next
			.abandoned
			.remove(&descriptor.name)
			.and_then(|old| next.specs.get(old.index()))
		{
			for (sub_name, sub_id) in old.sub_type_entries().iter() {
				spec.add_sub_type(sub_name, *sub_id);
			}
		}
		next.specs.push(Arc::clone(&spec));
		next.by_name.insert(descriptor.name.clone(), id);
		self.table.store(Arc::new(next));
		Ok(spec)
	}

	/// Called with the coordinator lock held.
	fn forget(&self, spec: &TypeSpecification) {
		let current = self.table.load_full();
		if current.by_name.get(spec.name()) != Some(&spec.id()) {
			return;
		}
		let mut next = ArenaTable::clone(&current);
		next.by_name.remove(spec.name());
		next.abandoned.insert(spec.name().clone(), spec.id());
		self.table.store(Arc::new(next));
	}

	/// The node currently standing for `id`'s name: `id` itself, its
	/// replacement if it was abandoned and rebuilt, or `id` while no
	/// replacement exists yet. Called with the coordinator lock held.
	fn current(&self, id: SpecId) -> Option<Arc<TypeSpecification>> {
		let table = self.table.load();
		let spec = table.specs.get(id.index())?;
		let live = table
			.by_name
			.get(spec.name())
			.and_then(|live| table.specs.get(live.index()))
			.unwrap_or(spec);
		Some(Arc::clone(live))
	}
}

/// Ownership of one in-flight phase-1 construction.
///
/// Dropping the guard without [`complete`](Self::complete) abandons the node.
pub(crate) struct ConstructionGuard<'a> {
	arena: &'a SpecArena,
	spec: Arc<TypeSpecification>,
	super_id: Option<SpecId>,
	completed: bool,
}

impl ConstructionGuard<'_> {
	pub(crate) fn spec(&self) -> &Arc<TypeSpecification> {
		&self.spec
	}

	/// Registers the node as a sub-type of `super_id`, undone on abandon.
	///
	/// If the super type was abandoned and rebuilt meanwhile, the entry goes
	/// to its replacement.
	pub(crate) fn register_sub_type(&mut self, super_id: SpecId) {
		let _coord = self.arena.coordinator.lock();
		if let Some(parent) = self.arena.current(super_id) {
			parent.add_sub_type(self.spec.name(), self.spec.id());
			self.super_id = Some(parent.id());
		}
	}

	/// Publishes phase 1 and wakes every waiter.
	pub(crate) fn complete(mut self, facets: FacetHolder, super_type: Option<TypeLink>) {
		let mut coord = self.arena.coordinator.lock();
		self.spec.publish_phase1(facets, super_type);
		coord.owners.remove(&self.spec.id());
		self.arena.phase1_runs.fetch_add(1, Ordering::Relaxed);
		self.completed = true;
		drop(coord);
		self.arena.ready.notify_all();
	}
}

impl Drop for ConstructionGuard<'_> {
	fn drop(&mut self) {
		if self.completed {
			return;
		}
		tracing::warn!(type_name = %self.spec.name(), "construction abandoned");
		let mut coord = self.arena.coordinator.lock();
		coord.owners.remove(&self.spec.id());
		self.arena.forget(&self.spec);
		if let Some(parent) = self.super_id.and_then(|id| self.arena.get(id)) {
			parent.remove_sub_type(self.spec.id());
		}
		drop(coord);
		self.arena.ready.notify_all();
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::identifier::Identifier;

	const WAIT: Duration = Duration::from_millis(50);

	fn descriptor(name: &str) -> Arc<TypeDescriptor> {
		Arc::new(TypeDescriptor::new(name))
	}

	fn construct<'a>(arena: &'a SpecArena, descriptor: &Arc<TypeDescriptor>) -> ConstructionGuard<'a> {
		match arena.claim(descriptor, WAIT).unwrap() {
			Claim::Construct(guard) => guard,
			Claim::Ready(_) | Claim::Placeholder(_) => panic!("{} should be new", descriptor.name),
		}
	}

	fn finish(guard: ConstructionGuard<'_>) {
		let holder = FacetHolder::new(Identifier::for_type(guard.spec().name().clone()));
		guard.complete(holder, None);
	}

	#[test]
	fn abandoned_node_is_unreachable_and_reclaimable() {
		let arena = SpecArena::new(0);
		let party = descriptor("Party");

		let first = construct(&arena, &party);
		let first_id = first.spec().id();
		drop(first);
		assert!(arena.by_name(&party.name).is_none());

		let second = construct(&arena, &party);
		assert_ne!(second.spec().id(), first_id);
		finish(second);
		assert!(arena.by_name(&party.name).is_some());
	}

	#[test]
	fn rebuilt_super_type_keeps_sub_types_published_meanwhile() {
		let arena = SpecArena::new(0);
		let party = descriptor("Party");
		let person = descriptor("Person");

		let party_guard = construct(&arena, &party);
		let stale = party_guard.spec().id();
		let mut person_guard = construct(&arena, &person);
		person_guard.register_sub_type(stale);
		finish(person_guard);
		drop(party_guard);

		let rebuilt = construct(&arena, &party);
		assert_eq!(rebuilt.spec().sub_type_names(), vec![TypeName::new("Person")]);
		finish(rebuilt);
		let party = arena.by_name(&party.name).unwrap();
		assert_eq!(party.sub_type_names(), vec![TypeName::new("Person")]);
	}

	#[test]
	fn sub_type_registered_after_rebuild_goes_to_the_replacement() {
		let arena = SpecArena::new(0);
		let party = descriptor("Party");
		let company = descriptor("Company");

		let party_guard = construct(&arena, &party);
		let stale = party_guard.spec().id();
		let mut company_guard = construct(&arena, &company);
		drop(party_guard);
		let rebuilt = construct(&arena, &party);

		company_guard.register_sub_type(stale);
		finish(company_guard);
		assert_eq!(rebuilt.spec().sub_type_names(), vec![TypeName::new("Company")]);
		finish(rebuilt);
	}
}
