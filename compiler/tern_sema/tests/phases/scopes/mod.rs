//! Scope restore and destructor placement.

use pretty_assertions::assert_eq;
use tern_diagnostic::ErrorCode;

use crate::common::{lifecycle, sequence, sequence_err};

const POINT: &str = "let Point: struct { x: i32, y: i32 }\n";

/// Rendered `Del(&name);` line for a `Point` local.
fn del(session: &tern_sema::Session, name: &str) -> String {
    format!("{}(&{name});\n", lifecycle(session, "Del", "Point"))
}

#[test]
fn struct_local_is_destroyed_exactly_once() {
    let (session, program) = sequence(&format!("{POINT}let f() {{ let p: Point; }}"));
    let new = lifecycle(&session, "New", "Point");
    let del = del(&session, "p");
    let c = program.to_c();
    assert_eq!(c.matches(&del).count(), 1);
    assert!(c.contains(&format!("Point p;\n{new}(&p);\n{del}}}\n")));
}

#[test]
fn trivial_locals_are_never_destroyed() {
    let (_, program) = sequence(
        "let f(): i32 {
             let n: i32;
             let p: *u8;
             let a: [8]f64;
             let s: []bool;
             return 0;
         }",
    );
    assert!(!program.to_c().contains("Del"));
}

#[test]
fn struct_in_if_body_is_destroyed_at_its_closing_brace() {
    let (session, program) = sequence(&format!(
        "{POINT}let f(c: bool) {{
             if c {{ let p: Point; }}
         }}"
    ));
    let del = del(&session, "p");
    let c = program.to_c();
    assert_eq!(c.matches(&del).count(), 1);
    assert!(c.contains(&format!("{del}}}\n}}\n")));
}

#[test]
fn struct_in_loop_body_is_destroyed_each_iteration() {
    let (session, program) = sequence(&format!(
        "{POINT}let f(c: bool) {{
             while c {{ let p: Point; }}
         }}"
    ));
    let new = lifecycle(&session, "New", "Point");
    let del = del(&session, "p");
    assert!(program
        .to_c()
        .contains(&format!("while (c) {{\nPoint p;\n{new}(&p);\n{del}}}\n")));
}

#[test]
fn early_return_from_a_nested_scope_destroys_outer_locals() {
    let (session, program) = sequence(&format!(
        "{POINT}let f() {{
             let p: Point;
             {{
                 let q: Point;
                 return;
             }}
         }}"
    ));
    let (del_p, del_q) = (del(&session, "p"), del(&session, "q"));
    let c = program.to_c();
    // Innermost first on the return path; `p` again at the end of the body.
    assert!(c.contains(&format!("{del_q}{del_p}return;\n}}\n{del_p}}}\n")));
    assert_eq!(c.matches(&del_q).count(), 1);
    assert_eq!(c.matches(&del_p).count(), 2);
}

#[test]
fn locals_are_destroyed_in_reverse_declaration_order() {
    let (session, program) = sequence(&format!("{POINT}let f() {{ let a, b: Point; }}"));
    let c = program.to_c();
    assert!(c.contains(&format!("{}{}}}\n", del(&session, "b"), del(&session, "a"))));
}

#[test]
fn returned_local_is_moved_out() {
    let (session, program) = sequence(&format!(
        "{POINT}let make(): Point {{
             let p, spare: Point;
             return p;
         }}"
    ));
    let c = program.to_c();
    assert_eq!(c.matches(&del(&session, "p")).count(), 0);
    assert!(c.contains(&format!("{}return p;\n", del(&session, "spare"))));
}

#[test]
fn returned_expression_is_evaluated_before_destruction() {
    let (session, program) = sequence(&format!(
        "{POINT}let f(): i32 {{
             let p: Point;
             if true {{ return p.x; }}
             return Add(p.y, 1);
         }}"
    ));
    let del = del(&session, "p");
    let c = program.to_c();
    assert!(c.contains(&format!("int32_t _Tn_ret0 = p.x;\n{del}return _Tn_ret0;\n")));
    assert!(c.contains(&format!("int32_t _Tn_ret1 = (p.y + 1);\n{del}return _Tn_ret1;\n")));
    assert!(!c.contains("return p.x;"));
}

#[test]
fn locals_in_match_cases_are_destroyed_per_case() {
    let (session, program) = sequence(&format!(
        "{POINT}let Shape: enum {{ Dot, Line }}
         let f(s: Shape) {{
             match s {{
                 case Dot {{ let p: Point; }}
                 default {{ }}
             }}
         }}"
    ));
    let del = del(&session, "p");
    let c = program.to_c();
    assert!(c.contains("case 0: {\nPoint p;\n"));
    assert!(c.contains(&format!("{del}}}\nbreak;\n")));
}

#[test]
fn scope_exit_restores_outer_bindings() {
    let err = sequence_err(
        "let f() {
             { let inner: i32; }
             Copy(&inner, 1);
         }",
    );
    assert_eq!(err.code(), ErrorCode::E1002);
}

#[test]
fn functions_outlive_the_scope_they_are_referenced_from() {
    let (session, _) = sequence(
        "let Id<T>(x: T): T { return x; }
         let f() { { let n: i32; Copy(&n, Id<i32>(1)); } }
         let g(): i32 { return Id<i32>(2); }",
    );
    assert_eq!(session.table.get("Id").map(<[_]>::len), Some(1));
}

#[test]
fn globals_are_visible_in_functions() {
    let (_, program) = sequence(
        "let total: i64;
         let bump() { Copy(&total, Add(total, 1)); }",
    );
    assert!(program.to_c().contains("total = (total + ((int64_t)(1)));\n"));
}
