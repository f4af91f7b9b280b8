//! Structural keys for types, members and parameters.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::types::TypeName;

/// Parameter type signature of an action.
pub type Signature = SmallVec<[TypeName; 4]>;

/// Stable, comparable key for a node of the specification graph.
///
/// Ordering is structural (owner, then member, then signature, then parameter
/// index), so sets keyed by identifiers iterate deterministically.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
	owner: TypeName,
	member: Option<Arc<str>>,
	signature: Signature,
	parameter: Option<u16>,
}

impl Identifier {
	pub fn for_type(owner: TypeName) -> Self {
		Self {
			owner,
			member: None,
			signature: Signature::new(),
			parameter: None,
		}
	}

	pub fn for_member(owner: TypeName, member: &str) -> Self {
		Self {
			owner,
			member: Some(Arc::from(member)),
			signature: Signature::new(),
			parameter: None,
		}
	}

	pub fn for_action<I>(owner: TypeName, action: &str, signature: I) -> Self
	where
		I: IntoIterator<Item = TypeName>,
	{
		Self {
			owner,
			member: Some(Arc::from(action)),
			signature: signature.into_iter().collect(),
			parameter: None,
		}
	}

	/// Derives the identifier of parameter `index` of this member.
	pub fn parameter(&self, index: u16) -> Self {
		Self {
			owner: self.owner.clone(),
			member: self.member.clone(),
			signature: self.signature.clone(),
			parameter: Some(index),
		}
	}

	/// Strips member and parameter parts.
	pub fn type_identifier(&self) -> Self {
		Self::for_type(self.owner.clone())
	}

	pub fn owner(&self) -> &TypeName {
		&self.owner
	}

	pub fn member_name(&self) -> Option<&str> {
		self.member.as_deref()
	}

	pub fn signature(&self) -> &[TypeName] {
		&self.signature
	}

	pub fn parameter_index(&self) -> Option<u16> {
		self.parameter
	}

	pub fn is_type(&self) -> bool {
		self.member.is_none()
	}
}

impl fmt::Display for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.owner.as_str())?;
		let Some(member) = &self.member else {
			return Ok(());
		};
		write!(f, "#{member}")?;
		if !self.signature.is_empty() || self.parameter.is_some() {
			f.write_str("(")?;
			for (i, ty) in self.signature.iter().enumerate() {
				if i > 0 {
					f.write_str(",")?;
				}
				f.write_str(ty.as_str())?;
			}
			f.write_str(")")?;
		}
		if let Some(index) = self.parameter {
			write!(f, "[{index}]")?;
		}
		Ok(())
	}
}

impl fmt::Debug for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Identifier({self})")
	}
}
