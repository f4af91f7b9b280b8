//! Conventional extractors and validation rules for `specgraph-metamodel`.
//!
//! Nothing here is required by the engine. Install [`BuiltinsPlugin`] on a
//! [`ProgrammingModelBuilder`] to get display names, type sorts, mandatory and
//! max-length attributes, editability and the rules that check them.
//!
//! Every builtin extractor runs in processing group [`extractors::GROUP`].
//! Application extractors registered in a later group override builtin
//! facets of equal precedence.

pub mod extractors;
pub mod rules;
pub mod vocab;

use specgraph_metamodel::{MetamodelPlugin, ModelError, ProgrammingModelBuilder};

pub use vocab::{markers, tags};

/// Registers every builtin extractor, in dependency order.
pub fn register_extractors(builder: &mut ProgrammingModelBuilder) -> Result<(), ModelError> {
	use extractors::*;

	builder
		.extractor(LogicalTypeName::META, LogicalTypeName)?
		.extractor(TypeSort::META, TypeSort)?
		.extractor(ImmutableType::META, ImmutableType)?
		.extractor(Named::META, Named)?
		.extractor(Mandatory::META, Mandatory)?
		.extractor(MaxLength::META, MaxLength)?
		.extractor(Editing::META, Editing)?
		.extractor(Hidden::META, Hidden)?
		.extractor(Title::META, Title)?;
	Ok(())
}

/// Registers every builtin validation rule.
pub fn register_rules(builder: &mut ProgrammingModelBuilder) -> Result<(), ModelError> {
	use rules::*;

	builder
		.rule(ImmutableEditableConflict)?
		.rule(DuplicateLogicalTypeName)?
		.rule(CollectionElementType)?
		.rule(PositiveMaxLength)?
		.rule(SingleTitle)?;
	Ok(())
}

/// Installs the whole builtin catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinsPlugin;

impl MetamodelPlugin for BuiltinsPlugin {
	fn name(&self) -> &'static str {
		"builtins"
	}

	fn register(&self, builder: &mut ProgrammingModelBuilder) -> Result<(), ModelError> {
		let before = builder.len();
		register_extractors(builder)?;
		register_rules(builder)?;
		tracing::debug!(extractors = builder.len() - before, "builtin catalogue registered");
		Ok(())
	}
}
