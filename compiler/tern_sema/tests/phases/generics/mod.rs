//! Generic instantiation end to end.

use pretty_assertions::assert_eq;
use tern_ir::ProgramNode;
use tern_types::{Primitive, Type};

use crate::common::{sequence, strings, symbol};

#[test]
fn same_substitution_registers_one_symbol() {
    let (session, program) = sequence(
        "let Twice<T>(x: T): T { return Add(x, x); }
         let f(): i32 {
             let a: i32;
             Copy(&a, Twice<i32>(1));
             return Twice<i32>(a);
         }",
    );
    assert_eq!(session.table.get("Twice").map(<[_]>::len), Some(1));

    let twice = symbol(&session, "Twice", &[Primitive::I32.ty()], &Primitive::I32.ty());
    let definitions = program
        .declarations
        .iter()
        .filter(|d| d.reconstruct().starts_with(&format!("int32_t {twice}(int32_t x) {{")))
        .count();
    assert_eq!(definitions, 1);
}

#[test]
fn different_substitutions_are_separate_overloads() {
    let (session, _) = sequence(
        "let Twice<T>(x: T): T { return Add(x, x); }
         let f(): f64 {
             let n: i32;
             Copy(&n, Twice<i32>(1));
             return Twice<f64>(2.0);
         }",
    );
    let overloads = session.table.get("Twice").unwrap();
    assert_eq!(overloads.len(), 2);
    assert_eq!(session.generics.get("Twice").unwrap()[0].instances.len(), 2);
}

#[test]
fn generic_struct_twice_yields_one_registered_struct() {
    let (session, program) = sequence(
        "let Pair<A, B>: struct { first: A, second: B }
         let f() { let p: Pair<i32, f64>; }
         let g() { let q: Pair<i32, f64>; }",
    );
    let pair = session
        .mangler
        .mangle_generic("Pair", &[strings(&["i32"]), strings(&["f64"])]);
    assert!(session.types.get_struct(&pair).is_some());
    let c = program.to_c();
    assert_eq!(c.matches(&format!("struct {pair} {{\n")).count(), 1);
    assert!(c.contains(&format!("struct {pair} {{\n    int32_t first;\n    double second;\n}};\n")));
}

#[test]
fn nested_instances_share_mangled_names() {
    let (session, _) = sequence(
        "let Box<T>: struct { value: *T }
         let f() { let b: Box<Box<i32>>; }",
    );
    let inner = session.mangler.mangle_generic("Box", &[strings(&["i32"])]);
    let outer = session
        .mangler
        .mangle_generic("Box", &[strings(&["Box", "<", "i32", ">"])]);
    assert!(session.types.get_struct(&inner).is_some());
    let layout = session.types.get_struct(&outer).unwrap();
    assert_eq!(
        layout.member_type("value"),
        Some(&Type::atomic(inner.as_str()).address_of())
    );
}

#[test]
fn instances_precede_the_declaration_that_needs_them() {
    let (session, program) = sequence(
        "let Cell<T>: struct { value: T }
         let f() { let c: Cell<bool>; }",
    );
    let cell = session.mangler.mangle_generic("Cell", &[strings(&["bool"])]);
    let position = |needle: &str| {
        program
            .declarations
            .iter()
            .map(ProgramNode::reconstruct)
            .position(|text| text.contains(needle))
            .unwrap()
    };
    assert!(position(&format!("typedef struct {cell}")) < position("void _Tn1f"));
}

#[test]
fn concrete_parameters_make_an_ordinary_declaration() {
    let (session, _) = sequence("let Wrapper<i32>: struct { value: i32 }");
    let wrapper = session.mangler.mangle_generic("Wrapper", &[strings(&["i32"])]);
    assert!(session.types.get_struct(&wrapper).is_some());
    assert!(!session.generics.contains("Wrapper"));
}

#[test]
fn templates_are_only_checked_when_instantiated() {
    let (session, program) = sequence("let Broken<T>(x: T): T { return nonsense; }");
    assert!(program.declarations.is_empty());
    assert!(session.generics.contains("Broken"));
}
