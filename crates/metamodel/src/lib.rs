//! Rule-driven metamodel builder.
//!
//! Given declared domain types, builds a resolved specification graph whose
//! nodes carry typed attributes (facets) contributed by pluggable extractors,
//! then validates the whole graph.
//!
//! # Modules
//!
//! - [`types`] - Input declarations and the [`TypeSource`] boundary
//! - [`canonical`] - Proxy-to-declared type name mapping
//! - [`identifier`] - Structural keys for types, members and parameters
//! - [`facet`] - Facets, precedence and the per-node [`FacetHolder`]
//! - [`model`] - The ordered extractor registry ([`ProgrammingModel`])
//! - [`loader`] - Two-phase introspection and the specification cache
//! - [`spec`] - Published specification nodes and graph snapshots
//! - [`validate`] - Post-pass consistency rules
//! - [`diagnostics`] - Shadowed-facet reports
//! - [`export`] - Serializable graph snapshot
//!
//! # Usage
//!
//! 1. Register extractors and rules on a [`ProgrammingModelBuilder`] (or install
//!    a [`MetamodelPlugin`]) and freeze it.
//! 2. Build a [`SpecificationLoader`] over a [`TypeSource`].
//! 3. Call [`SpecificationLoader::introspect_and_validate`] with the entry types.

pub mod canonical;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod facet;
pub mod feature;
pub mod identifier;
pub mod loader;
pub mod model;
pub mod spec;
pub mod types;
pub mod validate;

pub use canonical::{Canonicalize, ProxyCanonicalizer};
pub use config::{IntrospectionMode, MetamodelConfig};
pub use diagnostics::DiagnosticReport;
pub use error::{ConfigError, ExtractError, LoadError, MetamodelInvalid, ModelError};
pub use export::MetamodelExport;
pub use facet::{
	AddOutcome, Facet, FacetHolder, FacetOrigin, FacetTag, FacetValue, Precedence, ShadowNote,
	TypeLink, tags,
};
pub use feature::{FeatureKind, FeatureKindSet};
pub use identifier::Identifier;
pub use loader::{LoaderBuilder, LoaderStats, SpecificationLoader};
pub use model::{
	ExtractorMeta, FeatureExtractor, MetamodelPlugin, ProcessContext, ProcessingStep,
	ProgrammingModel, ProgrammingModelBuilder,
};
pub use spec::{
	IntrospectionState, MemberSpecification, MetamodelGraph, ParameterSpecification, SpecId,
	SpecRef, TypeSpecification,
};
pub use types::{
	Declaration, Marker, MarkerValue, MemberDescriptor, MemberKind, ParameterDescriptor,
	TypeCatalog, TypeDescriptor, TypeName, TypeSource,
};
pub use validate::{
	MetaModelValidator, Severity, ValidationFailure, ValidationFailures, ValidationRule,
	ValidationSink,
};
