use super::*;
use pretty_assertions::assert_eq;

fn point() -> StructLookupData {
    let mut data = StructLookupData::default();
    data.push_member("x", Primitive::I32.ty());
    data.push_member("y", Primitive::I32.ty());
    data.push_member("tag", Type::atomic("Label"));
    data
}

fn shape() -> EnumLookupData {
    let mut data = EnumLookupData::default();
    data.push_option("Empty", Type::null());
    data.push_option("Circle", Primitive::F64.ty());
    data
}

#[test]
fn struct_members_keep_layout_order() {
    let data = point();
    let names: Vec<&str> = data.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["x", "y", "tag"]);

    let reversed: Vec<&str> = data.iter().rev().map(|(name, _)| name).collect();
    assert_eq!(reversed, vec!["tag", "y", "x"]);
    assert_eq!(data.member_type("tag"), Some(&Type::atomic("Label")));
}

#[test]
fn enum_discriminants_are_option_indices() {
    let data = shape();
    assert_eq!(data.discriminant("Empty"), Some(0));
    assert_eq!(data.discriminant("Circle"), Some(1));
    assert_eq!(data.discriminant("Square"), None);
    assert!(data.payload("Empty").unwrap().is_null());
    assert!(data.has_payloads());
}

#[test]
fn known_types_include_primitives_and_registered_names() {
    let mut registry = TypeRegistry::new();
    registry.register_struct("Point", point());
    registry.register_enum("Shape", shape());

    assert!(registry.is_known_type("u8"));
    assert!(registry.is_known_type("Point"));
    assert!(registry.is_known_type("Shape"));
    assert!(!registry.is_known_type("T"));
}

#[test]
fn struct_of_sees_through_pointers() {
    let mut registry = TypeRegistry::new();
    registry.register_struct("Point", point());

    let ptr = Type::atomic("Point").address_of().address_of();
    assert_eq!(registry.struct_of(&ptr).map(|s| s.members.len()), Some(3));
    assert!(registry.enum_of(&ptr).is_none());
}

#[test]
fn erase_hides_but_keeps_registration() {
    let mut registry = TypeRegistry::new();
    registry.register_enum("Shape", shape());

    assert!(registry.erase("Shape"));
    assert!(registry.get_enum("Shape").is_none());
    assert!(!registry.is_known_type("Shape"));
    assert!(registry.is_registered("Shape"));
    assert!(!registry.erase("Nothing"));
}
