//! Per-step context handed to extractors.

use crate::error::ExtractError;
use crate::facet::{AddOutcome, Facet, FacetHolder, FacetOrigin, FacetValue, TypeLink};
use crate::feature::FeatureKind;
use crate::identifier::Identifier;
use crate::types::{
	Declaration, MemberDescriptor, ParameterDescriptor, TypeDescriptor, TypeName,
};
use crate::validate::{Severity, ValidationFailure};

/// Resolves type references found in facet values.
pub(crate) trait LinkResolver {
	fn resolve(&self, name: &TypeName) -> TypeLink;
}

/// The declaration a step is processing.
#[derive(Clone, Copy)]
pub(crate) enum Subject<'a> {
	Type(&'a TypeDescriptor),
	Member {
		owner: &'a TypeDescriptor,
		member: &'a MemberDescriptor,
	},
	Parameter {
		owner: &'a TypeDescriptor,
		member: &'a MemberDescriptor,
		index: u16,
		parameter: &'a ParameterDescriptor,
	},
}

/// What an extractor sees and may change.
///
/// Reads are limited to facets that earlier steps already installed: the
/// holder under construction, the enclosing type's phase-1 facets and, for
/// parameters, the enclosing member's facets.
pub struct ProcessContext<'a> {
	subject: Subject<'a>,
	holder: &'a mut FacetHolder,
	type_facets: Option<&'a FacetHolder>,
	member_facets: Option<&'a FacetHolder>,
	resolver: &'a dyn LinkResolver,
	defects: &'a mut Vec<ValidationFailure>,
	origin: FacetOrigin,
}

impl<'a> ProcessContext<'a> {
	pub(crate) fn new(
		subject: Subject<'a>,
		holder: &'a mut FacetHolder,
		type_facets: Option<&'a FacetHolder>,
		member_facets: Option<&'a FacetHolder>,
		resolver: &'a dyn LinkResolver,
		defects: &'a mut Vec<ValidationFailure>,
	) -> Self {
		Self {
			subject,
			holder,
			type_facets,
			member_facets,
			resolver,
			defects,
			origin: FacetOrigin::ENGINE,
		}
	}

	pub(crate) fn set_origin(&mut self, origin: FacetOrigin) {
		self.origin = origin;
	}

	pub fn kind(&self) -> FeatureKind {
		match self.subject {
			Subject::Type(_) => FeatureKind::Type,
			Subject::Member { member, .. } => member.kind.feature_kind(),
			Subject::Parameter { .. } => FeatureKind::Parameter,
		}
	}

	pub fn identifier(&self) -> &Identifier {
		self.holder.identifier()
	}

	/// The type being introspected, or the type enclosing the member.
	pub fn type_descriptor(&self) -> &'a TypeDescriptor {
		match self.subject {
			Subject::Type(owner) | Subject::Member { owner, .. } | Subject::Parameter { owner, .. } => {
				owner
			}
		}
	}

	/// The member being processed, or the action enclosing the parameter.
	pub fn member(&self) -> Option<&'a MemberDescriptor> {
		match self.subject {
			Subject::Type(_) => None,
			Subject::Member { member, .. } | Subject::Parameter { member, .. } => Some(member),
		}
	}

	pub fn parameter(&self) -> Option<(u16, &'a ParameterDescriptor)> {
		match self.subject {
			Subject::Parameter {
				index, parameter, ..
			} => Some((index, parameter)),
			_ => None,
		}
	}

	/// The declaration this step is looking at.
	pub fn declaration(&self) -> &'a dyn Declaration {
		match self.subject {
			Subject::Type(owner) => owner,
			Subject::Member { member, .. } => member,
			Subject::Parameter { parameter, .. } => parameter,
		}
	}

	/// Facets installed on this holder so far.
	pub fn facets(&self) -> &FacetHolder {
		&*self.holder
	}

	/// Phase-1 facets of the enclosing type (the holder itself for type steps).
	pub fn type_facets(&self) -> &FacetHolder {
		self.type_facets.unwrap_or(&*self.holder)
	}

	/// Facets of the enclosing action, for parameter steps.
	pub fn member_facets(&self) -> Option<&FacetHolder> {
		self.member_facets
	}

	/// Offers a facet to the holder under construction.
	///
	/// Type references are resolved before the facet competes; unresolvable
	/// targets become [`TypeLink::Unresolved`] and are reported during validation.
	pub fn add_facet(&mut self, facet: Facet) -> AddOutcome {
		let mut facet = facet.with_origin(self.origin);
		if let FacetValue::Type(TypeLink::Pending(name)) = facet.value() {
			let resolved = self.resolver.resolve(name);
			*facet.value_mut() = FacetValue::Type(resolved);
		}
		self.holder.add_facet(facet)
	}

	/// Records a non-fatal defect attributed to the current declaration.
	pub fn report_defect(&mut self, message: impl Into<String>) {
		self.report(Severity::Error, message.into());
	}

	pub fn report_warning(&mut self, message: impl Into<String>) {
		self.report(Severity::Warning, message.into());
	}

	pub(crate) fn report_error(&mut self, err: &ExtractError) {
		self.report(Severity::Error, err.to_string());
	}

	fn report(&mut self, severity: Severity, message: String) {
		tracing::warn!(
			id = %self.holder.identifier(),
			extractor = self.origin.extractor,
			%message,
			"extractor reported defect"
		);
		self.defects.push(ValidationFailure::new(
			self.holder.identifier().clone(),
			severity,
			self.origin.extractor,
			message,
		));
	}
}
