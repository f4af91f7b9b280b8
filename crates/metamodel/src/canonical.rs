//! Canonical type identity.
//!
//! Runtime-generated subtypes (enhanced, proxied or instrumented views of a
//! declared type) must converge on the declared type's specification. The
//! mapping is a pure function of the raw name; it is cheap and never cached.

use rustc_hash::FxHashMap;

use crate::config::CanonicalConfig;
use crate::types::TypeName;

/// Maps a raw type name to its canonical declared type.
///
/// Implementations must be deterministic, idempotent and infallible: names
/// they do not recognise map to themselves.
pub trait Canonicalize: Send + Sync {
	fn canonicalize(&self, raw: &TypeName) -> TypeName;
}

/// Default canonicalizer: explicit aliases first, then proxy-separator
/// truncation.
#[derive(Debug, Clone)]
pub struct ProxyCanonicalizer {
	separators: Vec<Box<str>>,
	aliases: FxHashMap<TypeName, TypeName>,
}

impl Default for ProxyCanonicalizer {
	fn default() -> Self {
		Self::from_config(&CanonicalConfig::default())
	}
}

impl ProxyCanonicalizer {
	pub fn from_config(config: &CanonicalConfig) -> Self {
		Self {
			separators: config
				.proxy_separators
				.iter()
				.filter(|s| !s.is_empty())
				.map(|s| Box::from(s.as_str()))
				.collect(),
			aliases: FxHashMap::default(),
		}
	}

	/// Registers an explicit proxy name for a declared type.
	pub fn alias(mut self, proxy: impl Into<TypeName>, declared: impl Into<TypeName>) -> Self {
		self.aliases.insert(proxy.into(), declared.into());
		self
	}

	fn strip_separators<'a>(&self, raw: &'a str) -> Option<&'a str> {
		self.separators
			.iter()
			.filter_map(|sep| raw.find(&**sep))
			.filter(|&pos| pos > 0)
			.min()
			.map(|pos| &raw[..pos])
	}
}

impl Canonicalize for ProxyCanonicalizer {
	fn canonicalize(&self, raw: &TypeName) -> TypeName {
		if let Some(declared) = self.aliases.get(raw) {
			return declared.clone();
		}
		match self.strip_separators(raw.as_str()) {
			Some(declared) => TypeName::new(declared),
			None => raw.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("shop.Order", "shop.Order")]
	#[case("shop.Order$$EnhancerByCglib$$1a2b", "shop.Order")]
	#[case("shop.Order$HibernateProxy$xyz", "shop.Order")]
	#[case("$$Generated", "$$Generated")]
	#[case("", "")]
	fn strips_proxy_suffixes(#[case] raw: &str, #[case] expected: &str) {
		let canon = ProxyCanonicalizer::default();
		assert_eq!(canon.canonicalize(&TypeName::new(raw)).as_str(), expected);
	}

	#[test]
	fn earliest_separator_wins() {
		let canon = ProxyCanonicalizer::from_config(&CanonicalConfig {
			proxy_separators: vec!["__".into(), "$$".into()],
		});
		let out = canon.canonicalize(&TypeName::new("Order$$x__y"));
		assert_eq!(out.as_str(), "Order");
	}

	#[test]
	fn aliases_take_precedence_and_result_is_idempotent() {
		let canon = ProxyCanonicalizer::default().alias("GeneratedProxy17", "shop.Customer");
		let once = canon.canonicalize(&TypeName::new("GeneratedProxy17"));
		assert_eq!(once.as_str(), "shop.Customer");
		assert_eq!(canon.canonicalize(&once), once);
	}
}
