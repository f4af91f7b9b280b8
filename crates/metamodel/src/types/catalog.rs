use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{TypeDescriptor, TypeName};

/// Supplier of declared type shapes.
///
/// The engine never discovers types on its own; every descriptor is obtained
/// through this boundary using a canonical name.
pub trait TypeSource: Send + Sync {
	fn descriptor(&self, name: &TypeName) -> Option<Arc<TypeDescriptor>>;
}

/// In-memory [`TypeSource`] populated up front by a scanner or a test.
#[derive(Debug, Default, Clone)]
pub struct TypeCatalog {
	by_name: FxHashMap<TypeName, Arc<TypeDescriptor>>,
	order: Vec<TypeName>,
}

impl TypeCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a descriptor, replacing any previous one with the same name.
	pub fn insert(&mut self, descriptor: TypeDescriptor) {
		let name = descriptor.name.clone();
		if self.by_name.insert(name.clone(), Arc::new(descriptor)).is_none() {
			self.order.push(name);
		}
	}

	pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
		self.insert(descriptor);
		self
	}

	/// Adds memberless descriptors for scalar types referenced by members.
	pub fn with_value_types<I, N>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = N>,
		N: Into<TypeName>,
	{
		for name in names {
			self.insert(TypeDescriptor::new(name));
		}
		self
	}

	/// Returns every known type name in insertion order.
	pub fn names(&self) -> &[TypeName] {
		&self.order
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}
}

impl TypeSource for TypeCatalog {
	fn descriptor(&self, name: &TypeName) -> Option<Arc<TypeDescriptor>> {
		self.by_name.get(name).cloned()
	}
}
