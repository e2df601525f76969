//! Shared helpers for phase tests.

use tern_ir::testing::tokenize;
use tern_sema::{Program, SemaError, Session, SessionConfig};
use tern_types::{Param, Type};

/// File name every test program is tokenized under.
pub const FILE: &str = "main.tn";

/// Sequence `src` in a fresh default session.
pub fn sequence(src: &str) -> (Session, Program) {
    let mut session = Session::new();
    let program = tern_sema::sequence_program(&mut session, &tokenize(src, FILE))
        .unwrap_or_else(|err| panic!("sequencing failed: {err}"));
    (session, program)
}

/// Sequence `src` with `config`.
pub fn sequence_with(config: SessionConfig, src: &str) -> (Session, Program) {
    let mut session = Session::with_config(config);
    let program = tern_sema::sequence_program(&mut session, &tokenize(src, FILE))
        .unwrap_or_else(|err| panic!("sequencing failed: {err}"));
    (session, program)
}

/// Sequence `src`, expecting it to fail.
pub fn sequence_err(src: &str) -> SemaError {
    let mut session = Session::new();
    match tern_sema::sequence_program(&mut session, &tokenize(src, FILE)) {
        Ok(program) => panic!("expected an error, got:\n{}", program.to_c()),
        Err(err) => err,
    }
}

/// C symbol of the `New`/`Del` overload for values of the struct or enum `ty`.
pub fn lifecycle(session: &Session, op: &str, ty: &str) -> String {
    let params = [Param::named("self", Type::atomic(ty).address_of())];
    session
        .mangler
        .mangle_function(op, &Type::function(&params, &Type::null()))
}

/// C symbol of a user function taking `params` and returning `ret`.
pub fn symbol(session: &Session, name: &str, params: &[Type], ret: &Type) -> String {
    let params: Vec<Param> = params.iter().cloned().map(Param::anonymous).collect();
    session.mangler.mangle_function(name, &Type::function(&params, ret))
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
