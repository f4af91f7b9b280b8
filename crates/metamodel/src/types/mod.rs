//! Input declaration model.

mod catalog;
mod descriptor;
mod name;

pub use catalog::{TypeCatalog, TypeSource};
pub use descriptor::{
	Declaration, Marker, MarkerValue, MemberDescriptor, MemberKind, ParameterDescriptor,
	TypeDescriptor,
};
pub use name::TypeName;

#[cfg(test)]
mod tests;
