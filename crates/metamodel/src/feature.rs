//! Feature kinds an extractor can be scoped to.

use std::fmt;

/// The kind of declaration a processing step is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKind {
	/// The type itself (phase 1).
	Type,
	/// A single-valued member.
	Property,
	/// A multi-valued member.
	Collection,
	/// An invocable member.
	Action,
	/// One parameter of an action.
	Parameter,
}

bitflags::bitflags! {
	/// A set of feature kinds.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct FeatureKindSet: u8 {
		const TYPE = 1 << 0;
		const PROPERTY = 1 << 1;
		const COLLECTION = 1 << 2;
		const ACTION = 1 << 3;
		const PARAMETER = 1 << 4;
		/// Every member kind.
		const MEMBERS = Self::PROPERTY.bits() | Self::COLLECTION.bits() | Self::ACTION.bits();
	}
}

impl FeatureKind {
	/// Returns the bitflag for this kind.
	pub const fn as_set(self) -> FeatureKindSet {
		match self {
			Self::Type => FeatureKindSet::TYPE,
			Self::Property => FeatureKindSet::PROPERTY,
			Self::Collection => FeatureKindSet::COLLECTION,
			Self::Action => FeatureKindSet::ACTION,
			Self::Parameter => FeatureKindSet::PARAMETER,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Type => "type",
			Self::Property => "property",
			Self::Collection => "collection",
			Self::Action => "action",
			Self::Parameter => "parameter",
		}
	}
}

impl fmt::Display for FeatureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<FeatureKind> for FeatureKindSet {
	fn from(kind: FeatureKind) -> Self {
		kind.as_set()
	}
}

impl FromIterator<FeatureKind> for FeatureKindSet {
	fn from_iter<I: IntoIterator<Item = FeatureKind>>(iter: I) -> Self {
		let mut set = FeatureKindSet::empty();
		for kind in iter {
			set |= kind.as_set();
		}
		set
	}
}

impl FeatureKindSet {
	#[inline]
	pub fn covers(self, kind: FeatureKind) -> bool {
		self.contains(kind.as_set())
	}
}
