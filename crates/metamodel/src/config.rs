//! Loader configuration, parsed from TOML.
//!
//! ```toml
//! [introspection]
//! mode = "lazy"
//! coalesce_timeout_ms = 30000
//!
//! [canonical]
//! proxy_separators = ["$$", "$HibernateProxy$"]
//!
//! [validation]
//! parallel = false
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// When phase 2 (members and parameters) runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntrospectionMode {
	/// Members are introspected on first access.
	Lazy,
	/// Members are introspected as part of every load.
	#[default]
	Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntrospectionConfig {
	pub mode: IntrospectionMode,
	/// Upper bound on waiting for another thread's construction.
	pub coalesce_timeout_ms: u64,
}

impl Default for IntrospectionConfig {
	fn default() -> Self {
		Self {
			mode: IntrospectionMode::default(),
			coalesce_timeout_ms: 30_000,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanonicalConfig {
	/// Markers that runtime-generated subtype names append to the declared name.
	pub proxy_separators: Vec<String>,
}

impl Default for CanonicalConfig {
	fn default() -> Self {
		Self {
			proxy_separators: vec!["$$".to_string(), "$HibernateProxy$".to_string()],
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
	/// Run validation rules on scoped threads.
	pub parallel: bool,
}

/// Top-level configuration; every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetamodelConfig {
	pub introspection: IntrospectionConfig,
	pub canonical: CanonicalConfig,
	pub validation: ValidationConfig,
}

impl MetamodelConfig {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}

	/// Rejects values that parse but cannot be honoured.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.introspection.coalesce_timeout_ms == 0 {
			return Err(ConfigError::Invalid(
				"introspection.coalesce_timeout_ms must be positive".into(),
			));
		}
		if self.canonical.proxy_separators.iter().any(String::is_empty) {
			return Err(ConfigError::Invalid(
				"canonical.proxy_separators must not contain empty strings".into(),
			));
		}
		Ok(())
	}

	pub fn coalesce_timeout(&self) -> Duration {
		Duration::from_millis(self.introspection.coalesce_timeout_ms)
	}

	pub fn with_mode(mut self, mode: IntrospectionMode) -> Self {
		self.introspection.mode = mode;
		self
	}
}
