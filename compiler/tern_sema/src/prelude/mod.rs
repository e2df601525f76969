//! Primitive prelude.
//!
//! Tern has no infix operators: arithmetic, comparison and assignment on
//! primitives are ordinary overloaded calls (`Add(a, b)`, `Copy(dst, src)`)
//! backed by builtin overloads that emit the C operator directly.

use tern_types::{Param, Primitive, Type};

use crate::symbols::{MultiTableSymbol, SymbolKind, SymbolTable};

/// Source file recorded for prelude symbols.
pub const PRELUDE_FILE: &str = "<prelude>";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    const ARITHMETIC: [BinaryOp; 4] = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div];
    const COMPARISON: [BinaryOp; 6] = [
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Le,
        BinaryOp::Ge,
    ];

    /// The Tern call name.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Sub => "Sub",
            BinaryOp::Mul => "Mul",
            BinaryOp::Div => "Div",
            BinaryOp::Mod => "Mod",
            BinaryOp::Eq => "Eq",
            BinaryOp::Ne => "Ne",
            BinaryOp::Lt => "Lt",
            BinaryOp::Gt => "Gt",
            BinaryOp::Le => "Le",
            BinaryOp::Ge => "Ge",
            BinaryOp::And => "And",
            BinaryOp::Or => "Or",
        }
    }

    pub fn c_op(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// A builtin overload body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `Copy(dst: *T, src: T)`.
    Assign,
    Binary(BinaryOp),
    Neg,
    Not,
}

impl Builtin {
    /// Emit the C expression for already-adjusted argument texts.
    pub fn emit(self, args: &[String]) -> String {
        match (self, args) {
            (Builtin::Assign, [dst, src]) => format!("{} = {src}", deref_text(dst)),
            (Builtin::Binary(op), [lhs, rhs]) => format!("({lhs} {} {rhs})", op.c_op()),
            (Builtin::Neg, [operand]) => format!("(-{operand})"),
            (Builtin::Not, [operand]) => format!("(!{operand})"),
            // Arity is checked by overload resolution before emission.
            _ => String::new(),
        }
    }
}

/// The lvalue a pointer expression refers to: `&x` becomes `x`, anything
/// else is dereferenced.
pub fn deref_text(pointer: &str) -> String {
    match pointer.strip_prefix('&') {
        Some(inner) => inner.to_string(),
        None => format!("(*{pointer})"),
    }
}

fn builtin(table: &mut SymbolTable, name: &str, params: &[Type], ret: &Type, body: Builtin) {
    let params: Vec<Param> = params.iter().cloned().map(Param::anonymous).collect();
    table.insert(
        name,
        MultiTableSymbol {
            body: None,
            ty: Type::function(&params, ret),
            erased: false,
            source_file: PRELUDE_FILE.to_string(),
            kind: SymbolKind::Builtin(body),
        },
    );
}

/// Register every builtin overload.
pub fn register(table: &mut SymbolTable) {
    let bool_ty = Primitive::Bool.ty();

    for prim in Primitive::NUMERIC {
        let t = prim.ty();
        builtin(table, "Copy", &[t.address_of(), t.clone()], &Type::null(), Builtin::Assign);
        for op in BinaryOp::ARITHMETIC {
            builtin(table, op.name(), &[t.clone(), t.clone()], &t, Builtin::Binary(op));
        }
        if prim.is_integer() {
            builtin(table, "Mod", &[t.clone(), t.clone()], &t, Builtin::Binary(BinaryOp::Mod));
        }
        for op in BinaryOp::COMPARISON {
            builtin(table, op.name(), &[t.clone(), t.clone()], &bool_ty, Builtin::Binary(op));
        }
        if prim.is_signed() {
            builtin(table, "Neg", &[t.clone()], &t, Builtin::Neg);
        }
    }

    let b = bool_ty;
    builtin(table, "Copy", &[b.address_of(), b.clone()], &Type::null(), Builtin::Assign);
    for op in [BinaryOp::And, BinaryOp::Or, BinaryOp::Eq, BinaryOp::Ne] {
        builtin(table, op.name(), &[b.clone(), b.clone()], &b, Builtin::Binary(op));
    }
    builtin(table, "Not", &[b.clone()], &b, Builtin::Not);

    let s = Primitive::Str.ty();
    builtin(table, "Copy", &[s.address_of(), s], &Type::null(), Builtin::Assign);

    tracing::debug!(names = table.len(), "registered primitive prelude");
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
