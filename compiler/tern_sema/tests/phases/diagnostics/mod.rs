//! Error codes, context chains and warnings.

use pretty_assertions::assert_eq;
use tern_diagnostic::{ErrorCode, Severity};
use tern_sema::SessionConfig;

use crate::common::{sequence, sequence_err, sequence_with};

#[test]
fn display_prints_location_then_context_outermost_first() {
    let err = sequence_err("let f() { let g() {} }");
    assert_eq!(
        err.to_string(),
        "main.tn:1:15: in file `main.tn`: in function `f`: a function declaration is not allowed here"
    );
}

#[test]
fn diagnostics_carry_code_and_context_notes() {
    let err = sequence_err("let f() {\n    let n: i32;\n    let n: i32;\n}");
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E1006);
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.message, "illegal redefinition of variable `n`");
    assert_eq!(diag.notes, vec!["in file `main.tn`", "in function `f`"]);
    let location = diag.location.unwrap();
    assert_eq!((location.line, location.column), (3, 9));
}

#[test]
fn structural_errors() {
    let cases = [
        ("let x i32;", ErrorCode::E0001),
        ("let x: i32", ErrorCode::E0002),
        ("let f() { ", ErrorCode::E0003),
        ("let f() { let g: struct { } }", ErrorCode::E0004),
        ("let x: [n]i32;", ErrorCode::E0005),
    ];
    for (src, code) in cases {
        assert_eq!(sequence_err(src).code(), code, "{src}");
    }
}

#[test]
fn unknown_names() {
    let cases = [
        ("let x: Missing;", ErrorCode::E1003),
        ("let f() { nothing; }", ErrorCode::E1002),
        ("let E: enum { A } let f(): E { return E::B; }", ErrorCode::E1005),
    ];
    for (src, code) in cases {
        assert_eq!(sequence_err(src).code(), code, "{src}");
    }
}

#[test]
fn unhandled_option_warning_is_configurable() {
    let src = "let E: enum { A, B }
               let f(e: E) { match e { case A {} } }";
    let (session, _) = sequence(src);
    assert_eq!(session.diagnostics.count(ErrorCode::W0001), 1);

    let quiet = SessionConfig::default().with_warn_unhandled_options(false);
    let (session, _) = sequence_with(quiet, src);
    assert!(session.diagnostics.is_empty());
}

#[test]
fn custom_entry_point_is_left_unmangled() {
    let config = SessionConfig::default().with_entry_point("start");
    let (_, program) = sequence_with(config, "let start(): i32 { return 0; }");
    assert_eq!(program.to_c(), "int32_t start(void) {\nreturn 0;\n}\n");
}

#[test]
fn tracing_can_be_initialized_repeatedly() {
    tern_sema::init_tracing();
    tern_sema::init_tracing();
}
