//! Error types for the engine's contract violations.
//!
//! Defects found in the metamodel itself are never errors: they accumulate as
//! [`ValidationFailure`](crate::validate::ValidationFailure)s.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::TypeName;
use crate::validate::ValidationFailures;

/// Errors raised by [`SpecificationLoader`](crate::loader::SpecificationLoader).
#[derive(Debug, Clone, Error)]
pub enum LoadError {
	/// An entry type is not known to the type source.
	#[error("unknown type: {type_name}")]
	UnknownType { type_name: TypeName },

	/// Waiting on another thread's construction exceeded the configured bound.
	#[error("timed out after {waited:?} waiting for {type_name} to be introspected")]
	CoalesceTimeout { type_name: TypeName, waited: Duration },

	/// A type was requested from inside its own construction.
	#[error("re-entrant request for {type_name} while it is under construction")]
	Reentrant { type_name: TypeName },

	/// The generation ran out of node ids.
	#[error("no node id left for {type_name} in this generation")]
	ArenaFull { type_name: TypeName },
}

/// Errors raised while assembling a programming model.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
	#[error("extractor id registered twice: {id}")]
	DuplicateExtractor { id: &'static str },

	#[error("validation rule registered twice: {name}")]
	DuplicateRule { name: &'static str },
}

/// Errors an extractor may return; each becomes a failure on the declaration.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
	/// A marker carried a payload of the wrong kind.
	#[error("marker `{marker}` expects {expected}, found {found}")]
	MarkerType {
		marker: String,
		expected: &'static str,
		found: &'static str,
	},

	#[error("{0}")]
	Invalid(String),

	/// The extractor panicked; the payload message is kept.
	#[error("extractor panicked: {0}")]
	Panicked(String),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},

	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value parsed but is out of range.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

/// The aggregated outcome of a validation pass that found errors.
#[derive(Debug, Clone, Error)]
#[error(
	"metamodel invalid: {} error(s), {} warning(s)",
	failures.errors().count(),
	failures.warnings().count()
)]
pub struct MetamodelInvalid {
	pub failures: ValidationFailures,
}
