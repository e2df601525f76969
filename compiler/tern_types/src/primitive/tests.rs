use super::*;
use pretty_assertions::assert_eq;

#[test]
fn names_round_trip_through_lookup() {
    for prim in Primitive::ALL {
        assert_eq!(Primitive::from_name(prim.name()), Some(prim));
    }
    assert_eq!(Primitive::from_name("Point"), None);
    assert_eq!(Primitive::from_name("NULL"), None);
}

#[test]
fn families() {
    assert_eq!(Primitive::U16.family(), Family::Integer);
    assert_eq!(Primitive::F32.family(), Family::Float);
    assert_eq!(Primitive::Bool.family(), Family::Bool);
    assert!(Primitive::NUMERIC.iter().all(|p| p.is_numeric()));
    assert!(!Primitive::Str.is_numeric());
}

#[test]
fn narrowing() {
    assert!(Primitive::I64.narrows_to(Primitive::I32));
    assert!(Primitive::I32.narrows_to(Primitive::U32));
    assert!(!Primitive::I8.narrows_to(Primitive::I64));
    assert!(!Primitive::F32.narrows_to(Primitive::F64));
}

#[test]
fn unsigned_widths() {
    assert_eq!(Primitive::unsigned_for_bits(4), Some(Primitive::U8));
    assert_eq!(Primitive::unsigned_for_bits(12), Some(Primitive::U16));
    assert_eq!(Primitive::unsigned_for_bits(64), Some(Primitive::U64));
    assert_eq!(Primitive::unsigned_for_bits(65), None);
}

#[test]
fn c_types() {
    assert_eq!(Type::atomic("i32").c_type(), "int32_t");
    assert_eq!(Type::atomic("str").c_type(), "const char*");
    assert_eq!(Type::atomic("Point").address_of().c_type(), "Point*");
    assert_eq!(
        Type::from_nodes([TypeNode::UnsizedArray, TypeNode::Atomic("u8".into())]).c_type(),
        "uint8_t*"
    );
    assert_eq!(Type::null().c_type(), "void");
}

#[test]
fn c_declarations() {
    let matrix = Type::from_nodes([
        TypeNode::SizedArray("2".into()),
        TypeNode::SizedArray("3".into()),
        TypeNode::Atomic("i32".into()),
    ]);
    assert_eq!(matrix.c_declaration("m"), "int32_t m[2][3]");
    assert_eq!(Type::atomic("f64").c_declaration("x"), "double x");
    assert_eq!(
        Type::atomic("i8").address_of().address_of().c_declaration("pp"),
        "int8_t** pp"
    );
}
