//! Declaration shapes handed to extractors.
//!
//! A descriptor carries everything the source declaration exposes: name,
//! declared type, enclosing type and any declared markers. The engine attaches
//! no meaning to marker names; extractors do.

use std::fmt;
use std::sync::Arc;

use super::TypeName;
use crate::feature::FeatureKind;

/// Kind of a type member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberKind {
	/// Single-valued attribute or association.
	Property,
	/// Multi-valued association.
	Collection,
	/// Invocable behavior, possibly taking parameters.
	Action,
}

impl MemberKind {
	pub const fn feature_kind(self) -> FeatureKind {
		match self {
			Self::Property => FeatureKind::Property,
			Self::Collection => FeatureKind::Collection,
			Self::Action => FeatureKind::Action,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Property => "property",
			Self::Collection => "collection",
			Self::Action => "action",
		}
	}
}

impl fmt::Display for MemberKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Payload of a declared marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerValue {
	Bool(bool),
	Int(i64),
	Text(Arc<str>),
}

impl MarkerValue {
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(v) => Some(v),
			_ => None,
		}
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Text(_) => "text",
		}
	}
}

/// A declarative marker on a source declaration, with an optional payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
	pub name: Arc<str>,
	pub value: Option<MarkerValue>,
}

impl Marker {
	pub fn flag(name: &str) -> Self {
		Self {
			name: Arc::from(name),
			value: None,
		}
	}

	pub fn bool(name: &str, value: bool) -> Self {
		Self {
			name: Arc::from(name),
			value: Some(MarkerValue::Bool(value)),
		}
	}

	pub fn int(name: &str, value: i64) -> Self {
		Self {
			name: Arc::from(name),
			value: Some(MarkerValue::Int(value)),
		}
	}

	pub fn text(name: &str, value: &str) -> Self {
		Self {
			name: Arc::from(name),
			value: Some(MarkerValue::Text(Arc::from(value))),
		}
	}
}

impl From<&str> for Marker {
	fn from(name: &str) -> Self {
		Self::flag(name)
	}
}

/// Common read access to any declaration.
pub trait Declaration {
	fn name(&self) -> &str;
	fn markers(&self) -> &[Marker];

	fn marker(&self, name: &str) -> Option<&Marker> {
		self.markers().iter().find(|m| &*m.name == name)
	}

	fn has_marker(&self, name: &str) -> bool {
		self.marker(name).is_some()
	}
}

/// Declared shape of a domain type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
	pub name: TypeName,
	pub super_type: Option<TypeName>,
	pub is_abstract: bool,
	pub markers: Vec<Marker>,
	pub members: Vec<MemberDescriptor>,
}

impl TypeDescriptor {
	pub fn new(name: impl Into<TypeName>) -> Self {
		Self {
			name: name.into(),
			super_type: None,
			is_abstract: false,
			markers: Vec::new(),
			members: Vec::new(),
		}
	}

	pub fn extends(mut self, super_type: impl Into<TypeName>) -> Self {
		self.super_type = Some(super_type.into());
		self
	}

	pub fn abstract_type(mut self) -> Self {
		self.is_abstract = true;
		self
	}

	pub fn with_marker(mut self, marker: impl Into<Marker>) -> Self {
		self.markers.push(marker.into());
		self
	}

	pub fn member(mut self, member: MemberDescriptor) -> Self {
		self.members.push(member);
		self
	}
}

impl Declaration for TypeDescriptor {
	fn name(&self) -> &str {
		self.name.as_str()
	}

	fn markers(&self) -> &[Marker] {
		&self.markers
	}
}

/// Declared shape of a property, collection or action.
///
/// `declared_type` is the property type, the collection element type, or the
/// action return type (`None` for actions returning nothing).
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
	pub name: Arc<str>,
	pub kind: MemberKind,
	pub declared_type: Option<TypeName>,
	pub markers: Vec<Marker>,
	pub parameters: Vec<ParameterDescriptor>,
}

impl MemberDescriptor {
	pub fn property(name: &str, ty: impl Into<TypeName>) -> Self {
		Self::with_kind(name, MemberKind::Property, Some(ty.into()))
	}

	pub fn collection(name: &str, element: impl Into<TypeName>) -> Self {
		Self::with_kind(name, MemberKind::Collection, Some(element.into()))
	}

	pub fn action(name: &str) -> Self {
		Self::with_kind(name, MemberKind::Action, None)
	}

	fn with_kind(name: &str, kind: MemberKind, declared_type: Option<TypeName>) -> Self {
		Self {
			name: Arc::from(name),
			kind,
			declared_type,
			markers: Vec::new(),
			parameters: Vec::new(),
		}
	}

	pub fn returns(mut self, ty: impl Into<TypeName>) -> Self {
		self.declared_type = Some(ty.into());
		self
	}

	pub fn with_marker(mut self, marker: impl Into<Marker>) -> Self {
		self.markers.push(marker.into());
		self
	}

	pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
		self.parameters.push(parameter);
		self
	}
}

impl Declaration for MemberDescriptor {
	fn name(&self) -> &str {
		&self.name
	}

	fn markers(&self) -> &[Marker] {
		&self.markers
	}
}

/// Declared shape of one action parameter.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
	pub name: Arc<str>,
	pub declared_type: TypeName,
	pub markers: Vec<Marker>,
}

impl ParameterDescriptor {
	pub fn new(name: &str, ty: impl Into<TypeName>) -> Self {
		Self {
			name: Arc::from(name),
			declared_type: ty.into(),
			markers: Vec::new(),
		}
	}

	pub fn with_marker(mut self, marker: impl Into<Marker>) -> Self {
		self.markers.push(marker.into());
		self
	}
}

impl Declaration for ParameterDescriptor {
	fn name(&self) -> &str {
		&self.name
	}

	fn markers(&self) -> &[Marker] {
		&self.markers
	}
}
