use super::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tern_types::{Param, Primitive};

use crate::prelude::BinaryOp;
use crate::symbols::{MultiTableSymbol, AUTOGEN_SENTINEL};

fn i32_ty() -> Type {
    Primitive::I32.ty()
}

fn point() -> Type {
    Type::atomic("Point")
}

fn function(params: &[Type], ret: &Type) -> Type {
    let params: Vec<Param> = params
        .iter()
        .enumerate()
        .map(|(i, ty)| Param::named(format!("p{i}"), ty.clone()))
        .collect();
    Type::function(&params, ret)
}

fn define(session: &mut Session, name: &str, params: &[Type]) -> String {
    let ty = function(params, &Type::null());
    session
        .table
        .insert(name, MultiTableSymbol::function(ty.clone(), None, "a.tn"));
    session.mangler.mangle_function(name, &ty)
}

fn args(texts: &[&str]) -> Vec<String> {
    texts.iter().map(ToString::to_string).collect()
}

#[test]
fn builtin_operators_emit_c_operators() {
    let mut session = Session::new();
    let call = session.resolve_call("Add", &[i32_ty(), i32_ty()]).unwrap();
    assert_eq!(call.callee, Callee::Builtin(Builtin::Binary(BinaryOp::Add)));
    assert_eq!(call.ret, i32_ty());
    assert_eq!(session.emit_call(&call, args(&["a", "b"])), "(a + b)");

    let call = session
        .resolve_call("Lt", &[Primitive::F64.ty(), Primitive::F64.ty()])
        .unwrap();
    assert_eq!(call.ret, Primitive::Bool.ty());
    assert_eq!(session.emit_call(&call, args(&["x", "y"])), "(x < y)");
}

#[test]
fn casts_are_emitted_per_argument() {
    let mut session = Session::new();
    let call = session
        .resolve_call("Add", &[i32_ty(), Primitive::I64.ty()])
        .unwrap();
    assert_eq!(call.ret, Primitive::I64.ty());
    assert_eq!(session.emit_call(&call, args(&["a", "b"])), "(((int64_t)(a)) + b)");
}

#[test]
fn assignment_goes_through_the_destination_pointer() {
    let mut session = Session::new();
    let call = session
        .resolve_call("Copy", &[i32_ty().address_of(), i32_ty()])
        .unwrap();
    assert_eq!(session.emit_call(&call, args(&["&n", "1"])), "n = 1");
    assert_eq!(session.emit_call(&call, args(&["p", "1"])), "(*p) = 1");
}

#[test]
fn user_functions_resolve_to_mangled_symbols() {
    let mut session = Session::new();
    let by_pointer = define(&mut session, "show", &[point().address_of()]);

    let call = session.resolve_call("show", &[point()]).unwrap();
    assert_eq!(call.callee, Callee::Function(by_pointer.clone()));
    assert_eq!(session.emit_call(&call, args(&["p"])), format!("{by_pointer}(&p)"));

    let deep = point().address_of().address_of();
    let call = session.resolve_call("show", &[deep]).unwrap();
    assert_eq!(session.emit_call(&call, args(&["pp"])), format!("{by_pointer}((*pp))"));
}

#[test]
fn entry_point_is_not_mangled() {
    let mut session = Session::new();
    assert_eq!(define(&mut session, "main", &[]), "main");

    let mut custom = Session::with_config(SessionConfig::default().with_entry_point("start"));
    assert_eq!(define(&mut custom, "start", &[]), "start");
    assert!(Mangler::is_mangled(&define(&mut custom, "main", &[])));
}

#[test]
fn resolution_errors() {
    let mut session = Session::new();

    let err = session.resolve_call("missing", &[]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1002);

    let err = session
        .resolve_call("Add", &[Primitive::Bool.ty(), i32_ty()])
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1009);
    assert!(!err.kind.details().is_empty());

    define(&mut session, "twin", &[i32_ty()]);
    define(&mut session, "twin", &[i32_ty()]);
    let err = session.resolve_call("twin", &[i32_ty()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1007);
    assert_eq!(err.kind.details().len(), 2);
}

#[test]
fn erased_overloads_are_reported() {
    let mut session = Session::new();
    define(&mut session, "gone", &[i32_ty()]);
    session.table.erase("gone");

    let err = session.resolve_call("gone", &[i32_ty()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1009);
    assert!(err.kind.details()[0].ends_with("erased"));
}

#[test]
fn has_overload_for_matches_type_vector_prefixes() {
    let mut session = Session::new();
    define(&mut session, "f", &[i32_ty()]);
    define(&mut session, "g", &[]);

    assert!(session.has_overload_for("f", &args(&["i32"])));
    assert!(session.has_overload_for("f", &args(&["i32", ",", "i32"])));
    assert!(!session.has_overload_for("f", &args(&["f64"])));
    assert!(session.has_overload_for("g", &[]));
    assert!(!session.has_overload_for("g", &args(&["i32"])));
    // Builtins never satisfy a generic call.
    assert!(!session.has_overload_for("Add", &args(&["i32", ",", "i32"])));
}

#[test]
fn file_names_are_checked_once() {
    let mut session = Session::new();
    let file: Arc<str> = Arc::from("src/BadName.tn");
    session.track(&Token::new("let", Arc::clone(&file), 1, 1));
    session.track(&Token::new("x", file, 1, 5));
    assert_eq!(session.diagnostics.count(ErrorCode::W0004), 1);
    assert_eq!(session.location(), &SourceLocation::new("src/BadName.tn", 1, 5));

    for name in ["main.tn", "dir/snake_case2.tn", "a\\b\\c.tn"] {
        assert!(is_conventional_file_name(name), "{name}");
    }
    for name in ["Main.tn", "main.c", ".tn", "kebab-case.tn"] {
        assert!(!is_conventional_file_name(name), "{name}");
    }
}

#[test]
fn autogenerated_bodies_until_replaced() {
    let mut session = Session::new();
    let ty = function(&[point().address_of()], &Type::null());
    let autogen = ProgramNode::keyword(
        tern_ir::KeywordKind::Function,
        vec![
            ProgramNode::atom("void f(Point* self) "),
            ProgramNode::scope(vec![ProgramNode::atom(AUTOGEN_SENTINEL)]),
        ],
    );
    session
        .table
        .define_function("New", MultiTableSymbol::function(ty.clone(), Some(autogen.clone()), "a.tn"))
        .unwrap();
    session.record_autogen("New", ty.clone());
    assert_eq!(session.autogen_bodies(), vec![autogen]);

    let user = ProgramNode::keyword(
        tern_ir::KeywordKind::Function,
        vec![ProgramNode::atom("void f(Point* self) "), ProgramNode::scope(Vec::new())],
    );
    session
        .table
        .define_function("New", MultiTableSymbol::function(ty, Some(user), "a.tn"))
        .unwrap();
    assert!(session.autogen_bodies().is_empty());
}

#[test]
fn pending_instances_drain() {
    let mut session = Session::new();
    session.push_pending(vec![ProgramNode::atom("a")]);
    session.push_pending(vec![ProgramNode::atom("b")]);
    assert_eq!(session.take_pending().len(), 2);
    assert!(session.take_pending().is_empty());
}

#[test]
fn incomplete_types_are_known() {
    let mut session = Session::new();
    assert!(session.is_known_type("i32"));
    assert!(!session.is_known_type("Node"));
    session.mark_incomplete("Node");
    assert!(session.is_known_type("Node"));
    session.mark_complete("Node");
    assert!(!session.is_known_type("Node"));
}
