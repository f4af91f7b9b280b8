//! The two introspection phases.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use super::LoaderCore;
use super::arena::{ConstructionGuard, SpecArena};
use crate::error::{ExtractError, LoadError};
use crate::facet::{Facet, FacetHolder, FacetTag, FacetValue, Precedence, TypeLink, tags};
use crate::feature::FeatureKind;
use crate::identifier::Identifier;
use crate::model::{LinkResolver, ProcessContext, ProgrammingModel, Subject};
use crate::spec::{MemberSpecification, ParameterSpecification, TypeSpecification};
use crate::types::{MemberKind, TypeName};
use crate::validate::ValidationFailure;

/// Resolves facet type references against the arena being built.
///
/// Unknown targets degrade to [`TypeLink::Unresolved`]; any other load error
/// is kept and aborts the construction once the current step returns.
struct Resolver<'a> {
	core: &'a LoaderCore,
	arena: &'a SpecArena,
	fatal: RefCell<Option<LoadError>>,
}

impl<'a> Resolver<'a> {
	fn new(core: &'a LoaderCore, arena: &'a SpecArena) -> Self {
		Self {
			core,
			arena,
			fatal: RefCell::new(None),
		}
	}

	fn check(&self) -> Result<(), LoadError> {
		match self.fatal.borrow_mut().take() {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}
}

impl LinkResolver for Resolver<'_> {
	fn resolve(&self, raw: &TypeName) -> TypeLink {
		let name = self.core.canonicalizer.canonicalize(raw);
		if self.fatal.borrow().is_some() {
			return TypeLink::Unresolved(name);
		}
		match self.core.link_target(self.arena, &name) {
			Ok(spec) => TypeLink::Resolved {
				id: spec.id(),
				name,
			},
			Err(LoadError::UnknownType { .. }) => {
				tracing::warn!(type_name = %name, "unresolved type reference");
				TypeLink::Unresolved(name)
			}
			Err(err) => {
				*self.fatal.borrow_mut() = Some(err);
				TypeLink::Unresolved(name)
			}
		}
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	payload
		.downcast_ref::<&str>()
		.map(|s| (*s).to_string())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Runs every extractor for `kind` in processing order.
///
/// A returned error or a panic becomes a defect on the declaration; the
/// remaining extractors still run.
fn run_extractors(model: &ProgrammingModel, kind: FeatureKind, ctx: &mut ProcessContext<'_>) {
	for entry in model.extractors_for(kind) {
		ctx.set_origin(entry.origin());
		let outcome = catch_unwind(AssertUnwindSafe(|| entry.extractor().process(ctx)))
			.unwrap_or_else(|payload| Err(ExtractError::Panicked(panic_message(payload.as_ref()))));
		if let Err(err) = outcome {
			ctx.report_error(&err);
		}
	}
}

fn structural(tag: FacetTag, link: TypeLink) -> Facet {
	Facet::new(tag, Precedence::Infrastructure, FacetValue::Type(link))
}

impl LoaderCore {
	/// Phase 1: type-level extractors, super-type link, sub-type registration.
	pub(super) fn construct_phase1(
		&self,
		arena: &SpecArena,
		mut guard: ConstructionGuard<'_>,
	) -> Result<Arc<TypeSpecification>, LoadError> {
		let spec = Arc::clone(guard.spec());
		let name = spec.name().clone();
		let _span = tracing::debug_span!("introspect", type_name = %name).entered();
		tracing::debug!("phase 1 started");

		let descriptor = spec.descriptor();
		let resolver = Resolver::new(self, arena);
		let mut defects = Vec::new();
		let mut holder = FacetHolder::new(Identifier::for_type(name.clone()));
		holder.add_facet(Facet::new(
			tags::LOGICAL_TYPE_NAME,
			Precedence::Infrastructure,
			FacetValue::text(name.as_str()),
		));

		{
			let mut ctx = ProcessContext::new(
				Subject::Type(descriptor),
				&mut holder,
				None,
				None,
				&resolver,
				&mut defects,
			);
			run_extractors(&self.model, FeatureKind::Type, &mut ctx);
		}

		let super_type = descriptor
			.super_type
			.as_ref()
			.map(|raw| resolver.resolve(raw));
		resolver.check()?;

		if let Some(super_id) = super_type.as_ref().and_then(TypeLink::spec_id) {
			guard.register_sub_type(super_id);
		}
		arena.record_defects(defects);
		guard.complete(holder, super_type);
		tracing::debug!("phase 1 finished");
		Ok(spec)
	}

	/// Phase 2: members in declaration order, each followed by its parameters.
	pub(super) fn introspect_members(
		&self,
		arena: &SpecArena,
		spec: &TypeSpecification,
	) -> Result<(Vec<MemberSpecification>, Vec<ValidationFailure>), LoadError> {
		let _span = tracing::debug_span!("introspect", type_name = %spec.name()).entered();
		tracing::debug!("phase 2 started");

		let owner = spec.descriptor();
		let type_facets = spec.facets();
		let resolver = Resolver::new(self, arena);
		let mut defects = Vec::new();
		let mut members = Vec::with_capacity(owner.members.len());

		for member in &owner.members {
			let identifier = match member.kind {
				MemberKind::Action => Identifier::for_action(
					spec.name().clone(),
					&member.name,
					member
						.parameters
						.iter()
						.map(|p| self.canonicalizer.canonicalize(&p.declared_type)),
				),
				MemberKind::Property | MemberKind::Collection => {
					Identifier::for_member(spec.name().clone(), &member.name)
				}
			};

			let mut holder = FacetHolder::new(identifier.clone());
			if let Some(declared) = &member.declared_type {
				let tag = match member.kind {
					MemberKind::Collection => tags::ELEMENT_TYPE,
					MemberKind::Property | MemberKind::Action => tags::TYPE,
				};
				holder.add_facet(structural(tag, resolver.resolve(declared)));
			}
			{
				let mut ctx = ProcessContext::new(
					Subject::Member { owner, member },
					&mut holder,
					Some(type_facets),
					None,
					&resolver,
					&mut defects,
				);
				run_extractors(&self.model, member.kind.feature_kind(), &mut ctx);
			}

			let mut parameters = Vec::with_capacity(member.parameters.len());
			for (index, parameter) in (0u16..).zip(&member.parameters) {
				let mut param_holder = FacetHolder::new(identifier.parameter(index));
				param_holder.add_facet(structural(
					tags::TYPE,
					resolver.resolve(&parameter.declared_type),
				));
				let mut ctx = ProcessContext::new(
					Subject::Parameter {
						owner,
						member,
						index,
						parameter,
					},
					&mut param_holder,
					Some(type_facets),
					Some(&holder),
					&resolver,
					&mut defects,
				);
				run_extractors(&self.model, FeatureKind::Parameter, &mut ctx);
				parameters.push(ParameterSpecification::new(
					index,
					Arc::clone(&parameter.name),
					param_holder,
				));
			}

			resolver.check()?;
			members.push(MemberSpecification::new(
				member.kind,
				Arc::clone(&member.name),
				holder,
				parameters,
			));
		}

		tracing::debug!(members = members.len(), "phase 2 finished");
		Ok((members, defects))
	}
}
