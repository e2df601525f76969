//! Type syntax.

use tern_ir::{Token, TokenCursor};
use tern_types::{Type, TypeNode};

use super::Sequencer;
use crate::error::{SemaErrorKind, SemaResult};
use crate::generics::{self, split_top_level};

impl Sequencer<'_> {
    /// `*T`, `[]T`, `[N]T`, `Name` or `Name<T, …>`.
    pub(super) fn parse_type(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Type> {
        let tok = self.next_token(cursor, "type")?;
        match tok.text.as_str() {
            "*" => {
                let mut ty = self.parse_type(cursor)?;
                ty.push_front(TypeNode::Pointer);
                Ok(ty)
            }
            "[" => {
                let node = if cursor.eat("]") {
                    TypeNode::UnsizedArray
                } else {
                    let bound = self.next_token(cursor, "array bound")?;
                    if !bound.text.chars().all(|c| c.is_ascii_digit()) {
                        return Err(self.error(SemaErrorKind::MalformedType {
                            found: bound.text.clone(),
                        }));
                    }
                    self.expect(cursor, "]")?;
                    TypeNode::SizedArray(bound.text.clone())
                };
                let mut ty = self.parse_type(cursor)?;
                ty.push_front(node);
                Ok(ty)
            }
            _ if tok.is_identifier() => {
                if cursor.at("<") {
                    let args = self.parse_generic_args(cursor)?;
                    let mangled = self.instantiate_type(&tok.text, &args)?;
                    Ok(Type::atomic(mangled))
                } else if self.session.is_known_type(&tok.text) {
                    Ok(Type::atomic(tok.text.clone()))
                } else {
                    Err(self.error(SemaErrorKind::UnknownType {
                        name: tok.text.clone(),
                    }))
                }
            }
            _ => Err(self.error(SemaErrorKind::MalformedType {
                found: tok.text.clone(),
            })),
        }
    }

    /// A type that must span `tokens` exactly.
    pub(super) fn parse_complete_type(&mut self, tokens: &[Token]) -> SemaResult<Type> {
        let mut cursor = TokenCursor::new(tokens);
        let ty = self.parse_type(&mut cursor)?;
        self.expect_end(&cursor, "end of type")?;
        Ok(ty)
    }

    /// `<T, …>` after a generic name.
    pub(super) fn parse_generic_args(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Vec<Type>> {
        let inner = self.take_balanced(cursor, "<", ">")?;
        split_top_level(inner)
            .into_iter()
            .map(|arg| self.parse_complete_type(arg))
            .collect()
    }

    /// The struct/enum instance `name<args…>`, instantiating it on first use.
    pub(super) fn instantiate_type(&mut self, name: &str, args: &[Type]) -> SemaResult<String> {
        let substitutions: Vec<Vec<String>> = args.iter().map(Type::to_tokens).collect();
        let mangled = self.session.mangler.mangle_generic(name, &substitutions);
        if self.session.is_known_type(&mangled) {
            return Ok(mangled);
        }
        if self.session.generics.type_template(name).is_none() {
            return Err(self.error(SemaErrorKind::UnknownGeneric {
                name: name.to_string(),
            }));
        }
        generics::instantiate(self, name, &substitutions, None)
    }
}
