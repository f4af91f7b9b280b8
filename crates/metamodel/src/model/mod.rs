//! The programming model: an ordered registry of feature extractors.
//!
//! # Purpose
//!
//! Collaborators register [`FeatureExtractor`]s against a processing group and a
//! [`FeatureKindSet`], plus [`ValidationRule`]s for the post pass. Building the
//! registry freezes it into a [`ProgrammingModel`] that the loader consumes; a
//! frozen model has no registration methods, so the pipeline cannot change once
//! introspection has started.
//!
//! # Ordering Contract
//!
//! Extractors run in a stable total order: processing group first (lower runs
//! first), then registration order within the group. Each extractor is assigned
//! a 1-based ordinal in that order; ordinal `0` is reserved for facets installed
//! by the engine itself. The ordinal is what breaks equal-precedence ties in
//! [`crate::facet::FacetHolder::add_facet`].
//!
//! - Enforced in: [`ProgrammingModelBuilder::build`].
//! - Tested by: `model::tests::order_is_group_then_registration`.

mod context;

use std::fmt;
use std::sync::Arc;

pub use context::ProcessContext;
pub(crate) use context::{LinkResolver, Subject};
use rustc_hash::FxHashSet;

use crate::error::{ExtractError, ModelError};
use crate::facet::FacetOrigin;
use crate::feature::{FeatureKind, FeatureKindSet};
use crate::validate::ValidationRule;

/// A pluggable rule that inspects one declaration and may attach facets.
pub trait FeatureExtractor: Send + Sync {
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError>;
}

impl<F> FeatureExtractor for F
where
	F: Fn(&mut ProcessContext<'_>) -> Result<(), ExtractError> + Send + Sync,
{
	fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), ExtractError> {
		self(ctx)
	}
}

/// Registration metadata for an extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorMeta {
	/// Unique identifier, used in diagnostics.
	pub id: &'static str,
	/// Processing group; lower groups run first.
	pub group: u16,
	/// Declaration kinds the extractor is invoked for.
	pub kinds: FeatureKindSet,
}

impl ExtractorMeta {
	pub const fn new(id: &'static str, group: u16, kinds: FeatureKindSet) -> Self {
		Self { id, group, kinds }
	}
}

/// One slot of the frozen pipeline.
#[derive(Clone)]
pub struct ExtractorEntry {
	meta: ExtractorMeta,
	ordinal: u32,
	extractor: Arc<dyn FeatureExtractor>,
}

impl ExtractorEntry {
	#[inline]
	pub fn meta(&self) -> ExtractorMeta {
		self.meta
	}

	#[inline]
	pub fn ordinal(&self) -> u32 {
		self.ordinal
	}

	pub(crate) fn origin(&self) -> FacetOrigin {
		FacetOrigin {
			extractor: self.meta.id,
			ordinal: self.ordinal,
		}
	}

	pub(crate) fn extractor(&self) -> &dyn FeatureExtractor {
		&*self.extractor
	}
}

impl fmt::Debug for ExtractorEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExtractorEntry")
			.field("id", &self.meta.id)
			.field("group", &self.meta.group)
			.field("kinds", &self.meta.kinds)
			.field("ordinal", &self.ordinal)
			.finish()
	}
}

/// Installs a coherent set of extractors and rules in one step.
pub trait MetamodelPlugin {
	fn name(&self) -> &'static str;
	fn register(&self, builder: &mut ProgrammingModelBuilder) -> Result<(), ModelError>;
}

/// Mutable registration surface; see the module docs.
#[derive(Default)]
pub struct ProgrammingModelBuilder {
	extractors: Vec<(ExtractorMeta, Arc<dyn FeatureExtractor>)>,
	extractor_ids: FxHashSet<&'static str>,
	rules: Vec<Arc<dyn ValidationRule>>,
	rule_names: FxHashSet<&'static str>,
	plugins: Vec<&'static str>,
}

impl ProgrammingModelBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of extractors registered so far.
	pub fn len(&self) -> usize {
		self.extractors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.extractors.is_empty()
	}

	/// Registers an extractor; ids must be unique.
	pub fn extractor<E>(&mut self, meta: ExtractorMeta, extractor: E) -> Result<&mut Self, ModelError>
	where
		E: FeatureExtractor + 'static,
	{
		if !self.extractor_ids.insert(meta.id) {
			return Err(ModelError::DuplicateExtractor { id: meta.id });
		}
		self.extractors.push((meta, Arc::new(extractor)));
		Ok(self)
	}

	/// Registers a validation rule; names must be unique.
	pub fn rule<R>(&mut self, rule: R) -> Result<&mut Self, ModelError>
	where
		R: ValidationRule + 'static,
	{
		let name = rule.name();
		if !self.rule_names.insert(name) {
			return Err(ModelError::DuplicateRule { name });
		}
		self.rules.push(Arc::new(rule));
		Ok(self)
	}

	pub fn install(&mut self, plugin: &dyn MetamodelPlugin) -> Result<&mut Self, ModelError> {
		plugin.register(self)?;
		tracing::debug!(plugin = plugin.name(), "plugin installed");
		self.plugins.push(plugin.name());
		Ok(self)
	}

	/// Freezes the registry into its total order.
	pub fn build(self) -> ProgrammingModel {
		let mut staged = self.extractors;
		// Stable: registration order survives within a group.
		staged.sort_by_key(|(meta, _)| meta.group);

		let extractors: Arc<[ExtractorEntry]> = staged
			.into_iter()
			.zip(1u32..)
			.map(|((meta, extractor), ordinal)| ExtractorEntry {
				meta,
				ordinal,
				extractor,
			})
			.collect();

		ProgrammingModel {
			extractors,
			rules: self.rules.into(),
			plugins: self.plugins.into(),
		}
	}
}

/// A processing step as exposed for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStep {
	pub ordinal: u32,
	pub id: &'static str,
	pub group: u16,
	pub kinds: FeatureKindSet,
}

/// The frozen, shareable pipeline.
#[derive(Clone)]
pub struct ProgrammingModel {
	extractors: Arc<[ExtractorEntry]>,
	rules: Arc<[Arc<dyn ValidationRule>]>,
	plugins: Arc<[&'static str]>,
}

impl ProgrammingModel {
	pub fn builder() -> ProgrammingModelBuilder {
		ProgrammingModelBuilder::new()
	}

	/// The complete processing order.
	pub fn order(&self) -> impl Iterator<Item = ProcessingStep> + '_ {
		self.extractors.iter().map(|e| ProcessingStep {
			ordinal: e.ordinal,
			id: e.meta.id,
			group: e.meta.group,
			kinds: e.meta.kinds,
		})
	}

	/// Extractors applicable to `kind`, in processing order.
	pub fn extractors_for(&self, kind: FeatureKind) -> impl Iterator<Item = &ExtractorEntry> + '_ {
		self.extractors
			.iter()
			.filter(move |e| e.meta.kinds.covers(kind))
	}

	pub fn extractors(&self) -> &[ExtractorEntry] {
		&self.extractors
	}

	pub fn rules(&self) -> &[Arc<dyn ValidationRule>] {
		&self.rules
	}

	pub fn plugins(&self) -> &[&'static str] {
		&self.plugins
	}
}

impl fmt::Debug for ProgrammingModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProgrammingModel")
			.field("extractors", &self.extractors)
			.field(
				"rules",
				&self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
			)
			.field("plugins", &self.plugins)
			.finish()
	}
}

#[cfg(test)]
mod tests;
