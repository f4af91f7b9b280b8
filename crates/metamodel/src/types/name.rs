use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Name of a domain type, either raw (as reported by a runtime) or canonical.
///
/// Cloning is a reference-count bump; equality, ordering and hashing are by
/// string content.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	#[inline]
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns the unqualified part after the last `.` or `::`.
	pub fn simple_name(&self) -> &str {
		let tail = self.0.rsplit("::").next().unwrap_or(&self.0);
		tail.rsplit('.').next().unwrap_or(tail)
	}
}

impl fmt::Debug for TypeName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}", &*self.0)
	}
}

impl fmt::Display for TypeName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for TypeName {
	fn from(s: &str) -> Self {
		Self::new(s)
	}
}

impl From<String> for TypeName {
	fn from(s: String) -> Self {
		Self(Arc::from(s))
	}
}

impl From<&TypeName> for TypeName {
	fn from(n: &TypeName) -> Self {
		n.clone()
	}
}

impl Borrow<str> for TypeName {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for TypeName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Serialize for TypeName {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}
