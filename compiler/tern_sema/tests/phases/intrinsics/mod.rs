//! Intrinsic statements.

use pretty_assertions::assert_eq;
use tern_diagnostic::ErrorCode;
use tern_sema::SemaErrorKind;

use crate::common::{sequence, sequence_err};

#[test]
fn memory_intrinsics() {
    let (_, program) = sequence(
        "let Point: struct { x: i32 }
         let f() {
             let p, q: *i32;
             let size: u64;
             alloc!(p, 4);
             ptridx!(q, p, 2);
             ptrcpy!(q, p);
             sizeof!(size, Point);
             free!(p);
         }",
    );
    let c = program.to_c();
    assert!(c.contains(
        "p = malloc(sizeof(int32_t) * (4));\n\
         q = &p[2];\n\
         q = p;\n\
         size = sizeof(Point);\n\
         free(p);\n"
    ));
}

#[test]
fn misuse_is_reported() {
    let cases = [
        "let f() { let n: i32; alloc!(n, 4); }",
        "let f() { let p: *i32; alloc!(p, 1.5); }",
        "let f() { free!(); }",
        "let f() { let p: *i32; let q: *u8; ptrcpy!(p, q); }",
        "let f() { print!(hello); }",
    ];
    for src in cases {
        let err = sequence_err(src);
        assert_eq!(err.code(), ErrorCode::E1014, "{src}");
    }
}

#[test]
fn arity_is_part_of_the_message() {
    let err = sequence_err("let f() { free!(); }");
    assert_eq!(
        err.kind,
        SemaErrorKind::IntrinsicMisuse {
            name: "free!".to_string(),
            reason: "expects 1 argument, found 0".to_string(),
        }
    );
}

#[test]
fn erase_hides_variables_and_types() {
    let err = sequence_err("let f() { let n: i32; erase!(n); Copy(&n, 1); }");
    assert_eq!(err.code(), ErrorCode::E1002);

    let err = sequence_err("let Point: struct { x: i32 } erase!(Point); let p: Point;");
    assert_eq!(err.code(), ErrorCode::E1003);

    let err = sequence_err("erase!(nothing);");
    assert_eq!(err.code(), ErrorCode::E1002);
}

#[test]
fn erase_in_a_nested_scope_outlives_the_scope() {
    let err = sequence_err("let f() { let x: i32; { erase!(x); } Copy(&x, 1); }");
    assert_eq!(err.code(), ErrorCode::E1002);
}

#[test]
fn erased_overloads_fail_resolution() {
    let err = sequence_err(
        "let ping(n: i32) {}
         erase!(ping);
         let f() { ping(1); }",
    );
    assert_eq!(err.code(), ErrorCode::E1009);
    assert!(err.kind.details()[0].ends_with("erased"));
}

#[test]
fn messages() {
    let (session, program) = sequence(
        "print!(\"building\");
         let f() { warn!(\"slow path\"); }",
    );
    assert!(program.to_c().starts_with("void _Tn1f"));
    let notes: Vec<_> = session.diagnostics.notes().collect();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].code, ErrorCode::W0005);
    assert_eq!(notes[0].message, "building");
    assert_eq!(session.diagnostics.count(ErrorCode::W0003), 1);
}

#[test]
fn panic_aborts() {
    let err = sequence_err("let f() { panic!(\"unreachable\"); }");
    assert_eq!(err.code(), ErrorCode::E1016);
    assert_eq!(
        err.kind,
        SemaErrorKind::UserPanic {
            message: "unreachable".to_string()
        }
    );
}

#[test]
fn raw_text_is_spliced_verbatim() {
    let (_, program) = sequence(
        "raw!(\"#include <stdio.h>\");
         let f() { raw!(\"puts(\\\"hi\\\");\"); }",
    );
    let c = program.to_c();
    assert!(c.starts_with("#include <stdio.h>\n"));
    assert!(c.contains("{\nputs(\\\"hi\\\");\n}\n"));
}

#[test]
fn unknown_intrinsic() {
    let err = sequence_err("let f() { launch!(\"x\"); }");
    assert_eq!(err.code(), ErrorCode::E1015);
}
