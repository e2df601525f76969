//! Overload resolution as seen from source programs.

use pretty_assertions::assert_eq;
use tern_diagnostic::ErrorCode;
use tern_types::{Primitive, Type};

use crate::common::{sequence, sequence_err, symbol};

fn i32_ty() -> Type {
    Primitive::I32.ty()
}

fn i64_ty() -> Type {
    Primitive::I64.ty()
}

#[test]
fn exact_match_picks_the_matching_overload() {
    let (session, program) = sequence(
        "let pick(a: i64) {}
         let pick(a: i32) {}
         let f() { pick(1); }",
    );
    let exact = symbol(&session, "pick", &[i32_ty()], &Type::null());
    assert!(program.to_c().contains(&format!("{exact}(1);\n")));
}

#[test]
fn casting_applies_when_no_exact_match() {
    let (session, program) = sequence(
        "let widen(a: i64) {}
         let f() { widen(1); }",
    );
    let widen = symbol(&session, "widen", &[i64_ty()], &Type::null());
    assert!(program.to_c().contains(&format!("{widen}(((int64_t)(1)));\n")));
}

#[test]
fn casting_prefers_widening() {
    let (session, program) = sequence(
        "let fit(a: i8) {}
         let fit(a: i64) {}
         let f() { fit(1); }",
    );
    let wide = symbol(&session, "fit", &[i64_ty()], &Type::null());
    assert!(program.to_c().contains(&format!("{wide}(((int64_t)(1)));\n")));
}

#[test]
fn reference_stage_takes_addresses_and_dereferences() {
    let (session, program) = sequence(
        "let touch(p: *i32) {}
         let f(pp: **i32) {
             let n: i32;
             touch(n);
             touch(pp);
         }",
    );
    let touch = symbol(&session, "touch", &[i32_ty().address_of()], &Type::null());
    let c = program.to_c();
    assert!(c.contains(&format!("{touch}(&n);\n")));
    assert!(c.contains(&format!("{touch}((*pp));\n")));
}

#[test]
fn exact_beats_reference() {
    let (session, program) = sequence(
        "let take(v: i32) {}
         let take(p: *i32) {}
         let f(p: *i32) { take(p); }",
    );
    let by_pointer = symbol(&session, "take", &[i32_ty().address_of()], &Type::null());
    assert!(program.to_c().contains(&format!("{by_pointer}(p);\n")));
}

#[test]
fn double_automatic_reference_is_rejected() {
    let err = sequence_err(
        "let deep(p: **i32) {}
         let f() { let n: i32; deep(n); }",
    );
    assert_eq!(err.code(), ErrorCode::E1008);
}

#[test]
fn no_match_lists_every_candidate() {
    let err = sequence_err(
        "let one(a: bool) {}
         let one(a: bool, b: bool) {}
         let f() { one(1); }",
    );
    assert_eq!(err.code(), ErrorCode::E1009);
    assert_eq!(err.kind.details().len(), 2);
}

#[test]
fn resolution_is_deterministic() {
    let src = "let g(a: i16) {}
               let g(a: i64) {}
               let g(a: u8) {}
               let f(n: i32) { g(n); }";
    let (_, first) = sequence(src);
    let (_, second) = sequence(src);
    assert_eq!(first.to_c(), second.to_c());
}

#[test]
fn calls_return_their_declared_type() {
    let err = sequence_err(
        "let half(n: i32): f64 { return 0.5; }
         let f(): bool { return half(2); }",
    );
    assert_eq!(err.code(), ErrorCode::E1001);

    sequence(
        "let half(n: i32): f64 { return 0.5; }
         let f(): f32 { return half(2); }",
    );
}
