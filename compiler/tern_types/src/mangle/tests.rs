use super::*;
use crate::Param;
use pretty_assertions::assert_eq;

fn toks(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

fn binary(name_ty: &str, ret: &str) -> Type {
    Type::function(
        &[
            Param::named("a", Type::atomic(name_ty)),
            Param::named("b", Type::atomic(name_ty)),
        ],
        &Type::atomic(ret),
    )
}

#[test]
fn mangle_function_overloads() {
    let mangler = Mangler::new();
    assert_eq!(
        mangler.mangle_function("add", &binary("i32", "i32")),
        "_Tn3addF3i32J3i32R3i32"
    );
    assert_eq!(
        mangler.mangle_function("add", &binary("f64", "f64")),
        "_Tn3addF3f64J3f64R3f64"
    );
}

#[test]
fn parameter_names_do_not_affect_symbols() {
    let mangler = Mangler::new();
    let a = Type::function(&[Param::named("x", Type::atomic("u8"))], &Type::null());
    let b = Type::function(&[Param::named("y", Type::atomic("u8"))], &Type::null());
    assert_eq!(mangler.mangle_function("f", &a), mangler.mangle_function("f", &b));
    assert_eq!(mangler.mangle_function("f", &a), "_Tn1fF2u8R");
}

#[test]
fn entry_point_is_preserved() {
    let sig = Type::function(&[], &Type::atomic("i32"));
    assert_eq!(Mangler::new().mangle_function("main", &sig), "main");

    let custom = Mangler::with_entry_point("start");
    assert_eq!(custom.mangle_function("start", &sig), "start");
    assert_eq!(custom.mangle_function("main", &sig), "_Tn4mainFR3i32");
}

#[test]
fn pointer_and_array_codes() {
    let mangler = Mangler::new();
    let sig = Type::function(
        &[
            Param::named("p", Type::atomic("i32").address_of()),
            Param::named(
                "buf",
                Type::from_nodes([TypeNode::UnsizedArray, TypeNode::Atomic("u8".into())]),
            ),
            Param::named(
                "fixed",
                Type::from_nodes([TypeNode::SizedArray("16".into()), TypeNode::Atomic("u8".into())]),
            ),
        ],
        &Type::null(),
    );
    assert_eq!(
        mangler.mangle_function("fill", &sig),
        "_Tn4fillFP3i32JA2u8JS2162u8R"
    );
}

#[test]
fn mangle_generic_instances() {
    let mangler = Mangler::new();
    assert_eq!(mangler.mangle_generic("Box", &[toks("i32")]), "_Tn3BoxG3i32E");
    assert_eq!(
        mangler.mangle_generic("Pair", &[toks("* u8"), toks("[ 4 ] f64")]),
        "_Tn4PairGP2u8JS143f64E"
    );
    assert_eq!(
        mangler.mangle_generic("List", &[toks("[ ] i8")]),
        "_Tn4ListGA2i8E"
    );
}

#[test]
fn nested_generics_splice() {
    let mangler = Mangler::new();
    let inner = mangler.mangle_generic("Box", &[toks("i32")]);
    let via_name = mangler.mangle_generic("Box", &[vec![inner]]);
    let via_tokens = mangler.mangle_generic("Box", &[toks("Box < i32 >")]);
    assert_eq!(via_name, via_tokens);
    assert_eq!(via_name, "_Tn3BoxG3BoxG3i32EE");
}

#[test]
fn type_tokens_agree_with_generic_instances() {
    let mangler = Mangler::new();
    assert_eq!(
        mangler.mangle_type_tokens(&toks("Map < i32 , * u8 >")),
        mangler.mangle_generic("Map", &[toks("i32"), toks("* u8")])
    );
}

#[test]
fn special_characters_are_hex_escaped() {
    let mangler = Mangler::new();
    let sig = Type::function(&[], &Type::null());
    assert_eq!(mangler.mangle_function("a-b", &sig), "_Tn6a_x2dbFR");
    assert!(Mangler::is_mangled("_Tn3BoxG3i32E"));
    assert!(!Mangler::is_mangled("Box"));
}

#[test]
fn symbols_are_c_identifiers() {
    let mangler = Mangler::new();
    let names = [
        mangler.mangle_generic("Pair", &[toks("* u8"), toks("[ 4 ] f64")]),
        mangler.mangle_function("x?", &binary("i64", "bool")),
    ];
    for name in names {
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert!(!name.starts_with(|c: char| c.is_ascii_digit()));
    }
}
