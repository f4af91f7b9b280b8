//! Post-introspection consistency pass.
//!
//! Rules are read-only over a [`MetamodelGraph`] and report into a
//! [`ValidationSink`]; the validator unions their output with the defects
//! extractors recorded during introspection. Running the pass twice over an
//! unchanged graph yields the same set.

mod rules;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub use rules::UnresolvedReferences;

use crate::error::MetamodelInvalid;
use crate::identifier::Identifier;
use crate::model::ProgrammingModel;
use crate::spec::MetamodelGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
	Warning,
	Error,
}

impl Severity {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Warning => "warning",
			Self::Error => "error",
		}
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One recorded defect. Never thrown; always collected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValidationFailure {
	identifier: Identifier,
	severity: Severity,
	rule: &'static str,
	message: String,
}

impl ValidationFailure {
	pub fn new(identifier: Identifier, severity: Severity, rule: &'static str, message: String) -> Self {
		Self {
			identifier,
			severity,
			rule,
			message,
		}
	}

	pub fn identifier(&self) -> &Identifier {
		&self.identifier
	}

	pub fn severity(&self) -> Severity {
		self.severity
	}

	/// Rule or extractor that produced the failure.
	pub fn rule(&self) -> &'static str {
		self.rule
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}

impl fmt::Display for ValidationFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} [{}] {}: {}",
			self.severity, self.rule, self.identifier, self.message
		)
	}
}

/// Ordered, append-only set of failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailures(BTreeSet<ValidationFailure>);

impl ValidationFailures {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, failure: ValidationFailure) -> bool {
		self.0.insert(failure)
	}

	pub fn iter(&self) -> impl Iterator<Item = &ValidationFailure> + '_ {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn errors(&self) -> impl Iterator<Item = &ValidationFailure> + '_ {
		self.0.iter().filter(|f| f.severity == Severity::Error)
	}

	pub fn warnings(&self) -> impl Iterator<Item = &ValidationFailure> + '_ {
		self.0.iter().filter(|f| f.severity == Severity::Warning)
	}

	/// Failures attributed to exactly `identifier`.
	pub fn for_identifier<'a>(
		&'a self,
		identifier: &'a Identifier,
	) -> impl Iterator<Item = &'a ValidationFailure> + 'a {
		self.0.iter().filter(move |f| &f.identifier == identifier)
	}

	/// Collapses the set into a single outcome; only errors are fatal.
	pub fn into_result(self) -> Result<Self, MetamodelInvalid> {
		if self.errors().next().is_some() {
			return Err(MetamodelInvalid { failures: self });
		}
		Ok(self)
	}
}

impl Extend<ValidationFailure> for ValidationFailures {
	fn extend<T: IntoIterator<Item = ValidationFailure>>(&mut self, iter: T) {
		self.0.extend(iter);
	}
}

impl FromIterator<ValidationFailure> for ValidationFailures {
	fn from_iter<T: IntoIterator<Item = ValidationFailure>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl IntoIterator for ValidationFailures {
	type Item = ValidationFailure;
	type IntoIter = std::collections::btree_set::IntoIter<ValidationFailure>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Where a rule reports; stamps every failure with the rule's name.
pub struct ValidationSink<'a> {
	rule: &'static str,
	failures: &'a mut ValidationFailures,
}

impl<'a> ValidationSink<'a> {
	pub fn new(rule: &'static str, failures: &'a mut ValidationFailures) -> Self {
		Self { rule, failures }
	}

	pub fn error(&mut self, identifier: &Identifier, message: impl Into<String>) {
		self.report(identifier, Severity::Error, message.into());
	}

	pub fn warning(&mut self, identifier: &Identifier, message: impl Into<String>) {
		self.report(identifier, Severity::Warning, message.into());
	}

	fn report(&mut self, identifier: &Identifier, severity: Severity, message: String) {
		self.failures.insert(ValidationFailure::new(
			identifier.clone(),
			severity,
			self.rule,
			message,
		));
	}
}

/// A cross-cutting consistency check over the finished graph.
///
/// Rules must not rely on running before or after any other rule.
pub trait ValidationRule: Send + Sync {
	fn name(&self) -> &'static str;
	fn validate(&self, graph: &MetamodelGraph, sink: &mut ValidationSink<'_>);
}

/// Runs every registered rule plus the engine's own reference check.
#[derive(Clone)]
pub struct MetaModelValidator {
	rules: Vec<Arc<dyn ValidationRule>>,
	parallel: bool,
}

impl MetaModelValidator {
	pub fn new(model: &ProgrammingModel) -> Self {
		let mut rules: Vec<Arc<dyn ValidationRule>> = vec![Arc::new(UnresolvedReferences)];
		rules.extend(model.rules().iter().cloned());
		Self {
			rules,
			parallel: false,
		}
	}

	pub fn parallel(mut self, parallel: bool) -> Self {
		self.parallel = parallel;
		self
	}

	pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.rules.iter().map(|r| r.name())
	}

	pub fn validate(&self, graph: &MetamodelGraph) -> ValidationFailures {
		let mut failures: ValidationFailures = graph.defects().iter().cloned().collect();

		if self.parallel && self.rules.len() > 1 {
			let partials: Vec<ValidationFailures> = std::thread::scope(|scope| {
				let handles: Vec<_> = self
					.rules
					.iter()
					.map(|rule| scope.spawn(move || run_rule(rule.as_ref(), graph)))
					.collect();
				handles
					.into_iter()
					.map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
					.collect()
			});
			for partial in partials {
				failures.extend(partial);
			}
		} else {
			for rule in &self.rules {
				failures.extend(run_rule(rule.as_ref(), graph));
			}
		}

		tracing::info!(
			types = graph.len(),
			rules = self.rules.len(),
			errors = failures.errors().count(),
			warnings = failures.warnings().count(),
			"metamodel validated"
		);
		failures
	}
}

impl fmt::Debug for MetaModelValidator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MetaModelValidator")
			.field("rules", &self.rule_names().collect::<Vec<_>>())
			.field("parallel", &self.parallel)
			.finish()
	}
}

fn run_rule(rule: &dyn ValidationRule, graph: &MetamodelGraph) -> ValidationFailures {
	let mut failures = ValidationFailures::new();
	rule.validate(graph, &mut ValidationSink::new(rule.name(), &mut failures));
	tracing::debug!(rule = rule.name(), failures = failures.len(), "rule finished");
	failures
}
