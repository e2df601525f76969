//! Intrinsic statements (`alloc!`, `erase!`, `raw!`, …).
//!
//! The vocabulary is fixed. Intrinsics are statements: each takes a
//! parenthesized argument list and a terminating `;`, and checks its own
//! arity and operand types.

use tern_diagnostic::ErrorCode;
use tern_ir::{ProgramNode, Token, TokenCursor};
use tern_types::Type;

use super::expr::Expr;
use super::Sequencer;
use crate::error::{SemaErrorKind, SemaResult};
use crate::generics::split_top_level;

const INTRINSICS: [&str; 10] = [
    "alloc!", "free!", "ptrcpy!", "ptridx!", "sizeof!", "erase!", "print!", "warn!", "panic!", "raw!",
];

/// C spelling of a type inside `sizeof(…)`.
fn sizeof_operand(ty: &Type) -> String {
    ty.c_declaration("").trim_end().to_string()
}

fn line(text: String) -> Option<ProgramNode> {
    Some(ProgramNode::line(vec![ProgramNode::atom(text)]))
}

impl Sequencer<'_> {
    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn sequence_intrinsic(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Option<ProgramNode>> {
        let tok = self.next_token(cursor, "intrinsic")?;
        let name = tok.text.as_str();
        if !INTRINSICS.contains(&name) {
            return Err(self.error(SemaErrorKind::UnknownIntrinsic { name: name.to_string() }));
        }
        let inner = self.take_balanced(cursor, "(", ")")?;
        self.expect(cursor, ";")?;
        tracing::trace!(intrinsic = name, "intrinsic");

        match name {
            "alloc!" => {
                let [ptr, count] = self.intrinsic_args(name, inner)?;
                let ptr = self.pointer_operand(name, ptr, "first")?;
                let count = self.integer_operand(name, count, "second")?;
                let pointee = ptr.ty.deref().unwrap_or_default();
                Ok(line(format!(
                    "{} = malloc(sizeof({}) * ({}))",
                    ptr.text,
                    sizeof_operand(&pointee),
                    count.text
                )))
            }
            "free!" => {
                let [ptr] = self.intrinsic_args(name, inner)?;
                let ptr = self.pointer_operand(name, ptr, "only")?;
                Ok(line(format!("free({})", ptr.text)))
            }
            "ptrcpy!" => {
                let [dst, src] = self.intrinsic_args(name, inner)?;
                let dst = self.pointer_operand(name, dst, "first")?;
                let src = self.pointer_operand(name, src, "second")?;
                self.same_pointer_type(name, &dst, &src)?;
                Ok(line(format!("{} = {}", dst.text, src.text)))
            }
            "ptridx!" => {
                let [dst, ptr, index] = self.intrinsic_args(name, inner)?;
                let dst = self.pointer_operand(name, dst, "first")?;
                let ptr = self.pointer_operand(name, ptr, "second")?;
                let index = self.integer_operand(name, index, "third")?;
                self.same_pointer_type(name, &dst, &ptr)?;
                Ok(line(format!("{} = &{}[{}]", dst.text, ptr.text, index.text)))
            }
            "sizeof!" => {
                let [dst, ty] = self.intrinsic_args(name, inner)?;
                let dst = self.integer_operand(name, dst, "first")?;
                let ty = self.parse_complete_type(ty)?;
                Ok(line(format!("{} = sizeof({})", dst.text, sizeof_operand(&ty))))
            }
            "erase!" => {
                let [target] = self.intrinsic_args(name, inner)?;
                let [symbol] = target else {
                    return Err(self.error(SemaErrorKind::misuse(name, "expects a single name")));
                };
                // Both, so a type and its lifecycle overloads go together.
                let in_table = self.session.table.erase(&symbol.text);
                let in_types = self.session.types.erase(&symbol.text);
                if !in_table && !in_types {
                    return Err(self.error(SemaErrorKind::UnknownSymbol {
                        name: symbol.text.clone(),
                    }));
                }
                tracing::debug!(name = %symbol.text, "erased");
                Ok(None)
            }
            "print!" => {
                let message = self.string_operand(name, inner)?;
                self.session.note(ErrorCode::W0005, message);
                Ok(None)
            }
            "warn!" => {
                let message = self.string_operand(name, inner)?;
                self.session.warn(ErrorCode::W0003, message);
                Ok(None)
            }
            "panic!" => {
                let message = self.string_operand(name, inner)?;
                Err(self.error(SemaErrorKind::UserPanic { message }))
            }
            _ => {
                let text = self.string_operand(name, inner)?;
                Ok(Some(ProgramNode::atom(format!("{text}\n"))))
            }
        }
    }

    /// Split the argument list, requiring exactly `N` arguments.
    fn intrinsic_args<'t, const N: usize>(&self, name: &str, inner: &'t [Token]) -> SemaResult<[&'t [Token]; N]> {
        let args = split_top_level(inner);
        let found = args.len();
        args.try_into().map_err(|_| {
            self.error(SemaErrorKind::misuse(
                name,
                format!("expects {N} argument{}, found {found}", if N == 1 { "" } else { "s" }),
            ))
        })
    }

    fn pointer_operand(&mut self, name: &str, tokens: &[Token], which: &str) -> SemaResult<Expr> {
        let expr = self.parse_complete_expr(tokens)?;
        if !expr.ty.is_pointer() {
            return Err(self.error(SemaErrorKind::misuse(
                name,
                format!("{which} argument must be a pointer, found `{}`", expr.ty),
            )));
        }
        Ok(expr)
    }

    fn integer_operand(&mut self, name: &str, tokens: &[Token], which: &str) -> SemaResult<Expr> {
        let expr = self.parse_complete_expr(tokens)?;
        if !expr.ty.is_integer() {
            return Err(self.error(SemaErrorKind::misuse(
                name,
                format!("{which} argument must be an integer, found `{}`", expr.ty),
            )));
        }
        Ok(expr)
    }

    fn same_pointer_type(&self, name: &str, a: &Expr, b: &Expr) -> SemaResult<()> {
        if a.ty.eq_ignoring_params(&b.ty) {
            Ok(())
        } else {
            Err(self.error(SemaErrorKind::misuse(
                name,
                format!("pointer types differ: `{}` and `{}`", a.ty, b.ty),
            )))
        }
    }

    /// The unquoted content of a single string literal argument.
    fn string_operand(&self, name: &str, inner: &[Token]) -> SemaResult<String> {
        let content = match inner {
            [literal] => literal
                .text
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"')),
            _ => None,
        };
        content
            .map(str::to_string)
            .ok_or_else(|| self.error(SemaErrorKind::misuse(name, "expects a string literal")))
    }
}
