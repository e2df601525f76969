//! Expressions.
//!
//! Tern has no infix operators, so an expression is a prefix chain of `&`
//! and `*` over a primary (literal, variable, call, enum construction or
//! parenthesized expression) followed by member accesses.

use tern_diagnostic::ErrorCode;
use tern_ir::{Token, TokenCursor};
use tern_stack::ensure_sufficient_stack;
use tern_types::{check_literal, type_vector, LiteralType, Type};

use super::Sequencer;
use crate::error::{SemaErrorKind, SemaResult};
use crate::generics::{self, split_top_level};
use crate::prelude::deref_text;

/// A resolved expression: its C text and type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Expr {
    pub text: String,
    pub ty: Type,
}

impl Expr {
    pub fn new(text: impl Into<String>, ty: Type) -> Self {
        Expr {
            text: text.into(),
            ty,
        }
    }

    /// Dereference until the value is not a pointer.
    pub fn auto_deref(mut self) -> Self {
        while let Some(inner) = self.ty.deref() {
            self.text = format!("(*{})", self.text);
            self.ty = inner;
        }
        self
    }
}

/// Whether a value of type `found` may stand where `expected` is wanted:
/// equal, or a conversion inside one numeric family.
pub(super) fn assignable(expected: &Type, found: &Type) -> bool {
    if expected.eq_ignoring_params(found) {
        return true;
    }
    match (expected.primitive(), found.primitive()) {
        (Some(e), Some(f)) => (e.is_integer() && f.is_integer()) || (e.is_float() && f.is_float()),
        _ => false,
    }
}

impl Sequencer<'_> {
    pub(super) fn parse_expr(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Expr> {
        ensure_sufficient_stack(|| self.parse_prefixed(cursor))
    }

    /// An expression that must span `tokens` exactly.
    pub(super) fn parse_complete_expr(&mut self, tokens: &[Token]) -> SemaResult<Expr> {
        let mut cursor = TokenCursor::new(tokens);
        let expr = self.parse_expr(&mut cursor)?;
        self.expect_end(&cursor, "end of expression")?;
        Ok(expr)
    }

    fn parse_prefixed(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Expr> {
        let tok = self.peek_or_end(cursor, "expression")?;
        match tok.text.as_str() {
            "&" => {
                cursor.next();
                let inner = self.parse_expr(cursor)?;
                Ok(Expr::new(format!("&{}", inner.text), inner.ty.address_of()))
            }
            "*" => {
                cursor.next();
                let inner = self.parse_expr(cursor)?;
                match inner.ty.deref() {
                    Some(ty) => Ok(Expr::new(format!("(*{})", inner.text), ty)),
                    None => Err(self.error(SemaErrorKind::mismatch(
                        "a pointer",
                        &inner.ty,
                        "dereference",
                    ))),
                }
            }
            _ => {
                let primary = self.parse_primary(cursor)?;
                self.parse_members(cursor, primary)
            }
        }
    }

    fn parse_primary(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Expr> {
        if cursor.at("(") {
            let inner = self.take_balanced(cursor, "(", ")")?;
            let expr = self.parse_complete_expr(inner)?;
            return Ok(Expr::new(format!("({})", expr.text), expr.ty));
        }

        let tok = self.next_token(cursor, "expression")?;
        if let Some(literal) = check_literal(&tok.text).map_err(|e| self.error(e.into()))? {
            return Ok(self.literal(&tok.text, literal));
        }
        if !tok.is_identifier() {
            return Err(self.error(SemaErrorKind::ExpectedToken {
                expected: "expression".to_string(),
                found: tok.text.clone(),
            }));
        }

        let name = tok.text.as_str();
        if cursor.at("<") {
            let generic_tokens = self.take_balanced(cursor, "<", ">")?;
            if cursor.at("::") {
                let args = split_top_level(generic_tokens)
                    .into_iter()
                    .map(|arg| self.parse_complete_type(arg))
                    .collect::<SemaResult<Vec<_>>>()?;
                let enum_name = self.instantiate_type(name, &args)?;
                return self.parse_enum_value(cursor, &enum_name);
            }
            return self.parse_generic_call(cursor, name, generic_tokens);
        }
        if cursor.at("::") {
            return self.parse_enum_value(cursor, name);
        }
        if cursor.at("(") {
            let args = self.parse_call_args(cursor)?;
            return self.call(name, args);
        }

        match self.session.table.lookup_variable(name) {
            Some(symbol) => Ok(Expr::new(name, symbol.ty.clone())),
            None => Err(self.error(SemaErrorKind::UnknownSymbol {
                name: name.to_string(),
            })),
        }
    }

    fn literal(&mut self, text: &str, literal: LiteralType) -> Expr {
        if literal.clamped {
            self.session.warn(
                ErrorCode::W0002,
                format!("untyped numeric literal `{text}` does not fit in `i64` and was clamped"),
            );
            return Expr::new(i64::MAX.to_string(), literal.ty);
        }
        // C99 has no binary literals.
        let binary = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B"));
        if let Some(value) = binary.and_then(|digits| u64::from_str_radix(digits, 2).ok()) {
            return Expr::new(format!("0x{value:X}"), literal.ty);
        }
        // A leading zero would make C read the digits as octal.
        if text.len() > 1 && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = text.parse::<u64>() {
                return Expr::new(value.to_string(), literal.ty);
            }
        }
        Expr::new(text, literal.ty)
    }

    /// `.member` chains, dereferencing pointers automatically.
    fn parse_members(&mut self, cursor: &mut TokenCursor<'_>, mut expr: Expr) -> SemaResult<Expr> {
        while cursor.eat(".") {
            let member = self.identifier(cursor, "member name")?;
            let member_ty = self
                .session
                .types
                .struct_of(&expr.ty)
                .and_then(|data| data.member_type(&member.text))
                .cloned();
            let Some(member_ty) = member_ty else {
                return Err(self.error(SemaErrorKind::UnknownMember {
                    ty: expr.ty.to_string(),
                    member: member.text.clone(),
                }));
            };
            expr.text = match expr.ty.pointer_depth() {
                0 => format!("{}.{}", expr.text, member.text),
                1 => format!("{}->{}", expr.text, member.text),
                depth => format!("({}{})->{}", "*".repeat(depth - 1), expr.text, member.text),
            };
            expr.ty = member_ty;
        }
        Ok(expr)
    }

    /// `( expr, … )`.
    pub(super) fn parse_call_args(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Vec<Expr>> {
        let inner = self.take_balanced(cursor, "(", ")")?;
        split_top_level(inner)
            .into_iter()
            .map(|arg| self.parse_complete_expr(arg))
            .collect()
    }

    /// A call through overload resolution, after the array and null-pointer
    /// special forms.
    pub(super) fn call(&mut self, name: &str, args: Vec<Expr>) -> SemaResult<Expr> {
        match (name, args.as_slice()) {
            ("Get", [array, index]) if index.ty.is_integer() => {
                if let Some(element) = array.ty.element() {
                    return Ok(Expr::new(format!("{}[{}]", array.text, index.text), element));
                }
            }
            // `Copy(&p, 0)` on a pointer variable `p`.
            ("Copy", [target, zero])
                if zero.text == "0" && target.ty.deref().is_some_and(|t| t.is_pointer() || t.is_array()) =>
            {
                return Ok(Expr::new(format!("{} = NULL", deref_text(&target.text)), Type::null()));
            }
            _ => {}
        }

        let types: Vec<Type> = args.iter().map(|a| a.ty.clone()).collect();
        let resolved = self.session.resolve_call(name, &types)?;
        let texts = args.into_iter().map(|a| a.text).collect();
        let text = self.session.emit_call(&resolved, texts);
        Ok(Expr::new(text, resolved.ret))
    }

    /// `name<T, …>(args)`: instantiate for the argument types, then call.
    fn parse_generic_call(
        &mut self,
        cursor: &mut TokenCursor<'_>,
        name: &str,
        generic_tokens: &[Token],
    ) -> SemaResult<Expr> {
        let substitutions = split_top_level(generic_tokens)
            .into_iter()
            .map(|arg| self.parse_complete_type(arg).map(|ty| ty.to_tokens()))
            .collect::<SemaResult<Vec<_>>>()?;
        let args = self.parse_call_args(cursor)?;
        let types: Vec<Type> = args.iter().map(|a| a.ty.clone()).collect();
        let call_vector = type_vector(&types);

        let declared = generics::instantiate(self, name, &substitutions, Some(&call_vector))?;
        self.call(&declared, args)
    }

    /// `Enum::Option` or `Enum::Option(payload)`.
    fn parse_enum_value(&mut self, cursor: &mut TokenCursor<'_>, enum_name: &str) -> SemaResult<Expr> {
        self.expect(cursor, "::")?;
        let option = self.identifier(cursor, "enum option")?;

        let Some(data) = self.session.types.get_enum(enum_name) else {
            return Err(self.error(SemaErrorKind::UnknownType {
                name: enum_name.to_string(),
            }));
        };
        let (Some(tag), Some(payload)) = (data.discriminant(&option.text), data.payload(&option.text).cloned())
        else {
            return Err(self.error(SemaErrorKind::UnknownOption {
                ty: enum_name.to_string(),
                option: option.text.clone(),
            }));
        };
        let ty = Type::atomic(enum_name);

        if !cursor.at("(") {
            if !payload.is_null() {
                return Err(self.error(SemaErrorKind::mismatch(
                    &payload,
                    "no payload",
                    format!("`{enum_name}::{}`", option.text),
                )));
            }
            return Ok(Expr::new(format!("(({enum_name}){{.tag = {tag}}})"), ty));
        }

        let args = self.parse_call_args(cursor)?;
        let value = match args.as_slice() {
            [value] if !payload.is_null() && assignable(&payload, &value.ty) => value,
            [value] => {
                return Err(self.error(SemaErrorKind::mismatch(
                    &payload,
                    &value.ty,
                    format!("`{enum_name}::{}`", option.text),
                )));
            }
            _ => {
                return Err(self.error(SemaErrorKind::mismatch(
                    "one payload value",
                    format!("{} values", args.len()),
                    format!("`{enum_name}::{}`", option.text),
                )));
            }
        };
        Ok(Expr::new(
            format!(
                "(({enum_name}){{.tag = {tag}, .data.{} = ({})}})",
                option.text, value.text
            ),
            ty,
        ))
    }
}
