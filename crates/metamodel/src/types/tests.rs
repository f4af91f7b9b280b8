use super::*;

#[test]
fn simple_name_strips_qualifiers() {
	assert_eq!(TypeName::new("shop.order.Order").simple_name(), "Order");
	assert_eq!(TypeName::new("shop::order::Order").simple_name(), "Order");
	assert_eq!(TypeName::new("Order").simple_name(), "Order");
}

#[test]
fn catalog_keeps_first_insertion_order_on_replace() {
	let mut catalog = TypeCatalog::new()
		.with(TypeDescriptor::new("A"))
		.with(TypeDescriptor::new("B"));
	catalog.insert(TypeDescriptor::new("A").with_marker("replaced"));

	assert_eq!(catalog.names(), &[TypeName::new("A"), TypeName::new("B")]);
	let a = catalog.descriptor(&TypeName::new("A")).expect("A present");
	assert!(a.has_marker("replaced"));
}

#[test]
fn marker_lookup_by_name() {
	let member = MemberDescriptor::property("name", "String")
		.with_marker(Marker::int("max-length", 40))
		.with_marker("mandatory");

	assert!(member.has_marker("mandatory"));
	let max = member.marker("max-length").and_then(|m| m.value.as_ref());
	assert_eq!(max.and_then(MarkerValue::as_int), Some(40));
	assert!(member.marker("hidden").is_none());
}

#[test]
fn action_return_type_is_optional() {
	let action = MemberDescriptor::action("archive");
	assert_eq!(action.kind, MemberKind::Action);
	assert!(action.declared_type.is_none());

	let action = action.returns("Order");
	assert_eq!(action.declared_type, Some(TypeName::new("Order")));
}
