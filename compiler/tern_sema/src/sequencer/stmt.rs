//! Statements, scopes and destructor placement.

use tern_ir::{KeywordKind, ProgramNode, TokenCursor};
use tern_stack::ensure_sufficient_stack;
use tern_types::{check_literal, Type};

use super::expr::assignable;
use super::{ScopeFrame, Sequencer};
use crate::error::{SemaErrorKind, SemaResult};

/// A scheduled destructor call for a local going out of scope.
#[derive(Clone, Debug)]
struct Destructor {
    variable: String,
    /// Scope child index of the declaration.
    at: usize,
    call: String,
}

impl Destructor {
    fn node(&self) -> ProgramNode {
        ProgramNode::line(vec![ProgramNode::atom(self.call.clone())])
    }
}

/// Whether evaluating `text` after the destructors run is still safe: a bare
/// name or literal.
fn is_simple_operand(text: &str) -> bool {
    let name = !text.is_empty() && text.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    name || matches!(check_literal(text), Ok(Some(_)))
}

/// Insert destructor calls before every `return` in `children`, at any
/// depth. `limit` is the index of the enclosing top-level child; only locals
/// declared at or before it are live there.
///
/// A returned expression that may read a destroyed local is stored in a
/// temporary first, so it is evaluated before the destructors run.
fn guard_returns(
    children: &mut Vec<ProgramNode>,
    destructors: &[Destructor],
    limit: Option<usize>,
    temporaries: &mut usize,
) {
    let old = std::mem::take(children);
    children.reserve(old.len());
    for (i, mut child) in old.into_iter().enumerate() {
        let limit = limit.unwrap_or(i);
        if child.is_keyword(KeywordKind::Return) {
            let returned = child.children().get(1).and_then(ProgramNode::text);
            let guards: Vec<ProgramNode> = destructors
                .iter()
                .filter(|d| d.at <= limit && returned != Some(d.variable.as_str()))
                .map(Destructor::node)
                .collect();
            if let Some(value) = returned.filter(|v| !guards.is_empty() && !is_simple_operand(v)) {
                let ty = child.ty().clone();
                let temp = format!("_Tn_ret{temporaries}");
                *temporaries += 1;
                children.push(ProgramNode::line(vec![ProgramNode::atom(format!(
                    "{} = {value}",
                    ty.c_declaration(&temp)
                ))]));
                child = ProgramNode::keyword(
                    KeywordKind::Return,
                    vec![ProgramNode::atom("return "), ProgramNode::typed_atom(temp, ty.clone())],
                )
                .with_ty(ty);
            }
            children.extend(guards);
        } else if let Some(inner) = child.children_mut() {
            guard_returns(inner, destructors, Some(limit), temporaries);
        }
        children.push(child);
    }
}

impl Sequencer<'_> {
    pub(super) fn open_frame(&mut self) {
        self.frames.push(ScopeFrame {
            snapshot: self.session.table.snapshot(),
            declared: Vec::new(),
            position: 0,
            parameters: false,
        });
    }

    /// Leave a scope without destroying anything in it.
    pub(super) fn discard_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.session.table.restore(frame.snapshot);
        }
    }

    /// `{ stmt* }`.
    pub(super) fn sequence_scope(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<ProgramNode> {
        let inner = self.take_balanced(cursor, "{", "}")?;
        let mut body = TokenCursor::new(inner);

        self.open_frame();
        let mut children = Vec::new();
        while !body.at_end() {
            if let Some(frame) = self.frames.last_mut() {
                frame.position = children.len();
            }
            match self.sequence_statement(&mut body) {
                Ok(nodes) => children.extend(nodes),
                Err(err) => {
                    self.discard_frame();
                    return Err(err);
                }
            }
        }
        Ok(ProgramNode::scope(self.close_frame(children)?))
    }

    /// A scope, or a single statement wrapped into one.
    pub(super) fn sequence_body(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<ProgramNode> {
        if cursor.at("{") {
            return self.sequence_scope(cursor);
        }
        self.open_frame();
        match self.sequence_statement(cursor) {
            Ok(children) => Ok(ProgramNode::scope(self.close_frame(children)?)),
            Err(err) => {
                self.discard_frame();
                Err(err)
            }
        }
    }

    pub(super) fn sequence_statement(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Vec<ProgramNode>> {
        ensure_sufficient_stack(|| self.statement(cursor))
    }

    fn statement(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Vec<ProgramNode>> {
        let tok = self.peek_or_end(cursor, "statement")?;
        tracing::trace!(token = %tok.text, line = tok.line, "statement");
        match tok.text.as_str() {
            "let" => self.sequence_let(cursor),
            "{" => Ok(vec![self.sequence_scope(cursor)?]),
            "if" => Ok(vec![self.sequence_conditional(cursor, KeywordKind::If)?]),
            "while" => Ok(vec![self.sequence_conditional(cursor, KeywordKind::While)?]),
            "else" => {
                cursor.next();
                let body = self.sequence_body(cursor)?;
                Ok(vec![ProgramNode::keyword(
                    KeywordKind::Else,
                    vec![ProgramNode::atom("else "), body],
                )])
            }
            "match" => Ok(vec![self.sequence_match(cursor)?]),
            "return" => Ok(vec![self.sequence_return(cursor)?]),
            "case" | "default" => Err(self.error(SemaErrorKind::MisplacedDeclaration {
                what: "a case outside `match`",
            })),
            _ if tok.is_intrinsic() => Ok(self.sequence_intrinsic(cursor)?.into_iter().collect()),
            _ => {
                let expr = self.parse_expr(cursor)?;
                self.expect(cursor, ";")?;
                Ok(vec![ProgramNode::line(vec![ProgramNode::typed_atom(
                    expr.text, expr.ty,
                )])])
            }
        }
    }

    /// `if cond body` / `while cond body`.
    fn sequence_conditional(&mut self, cursor: &mut TokenCursor<'_>, kind: KeywordKind) -> SemaResult<ProgramNode> {
        let keyword = self.next_token(cursor, "`if` or `while`")?;
        let cond = self.parse_expr(cursor)?;
        if !cond.ty.is_bool() {
            return Err(self.error(SemaErrorKind::mismatch(
                "bool",
                &cond.ty,
                format!("`{}` condition", keyword.text),
            )));
        }
        let body = self.sequence_body(cursor)?;
        Ok(ProgramNode::keyword(
            kind,
            vec![
                ProgramNode::atom(format!("{} (", keyword.text)),
                ProgramNode::typed_atom(cond.text, cond.ty),
                ProgramNode::atom(") "),
                body,
            ],
        ))
    }

    fn sequence_return(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<ProgramNode> {
        self.expect(cursor, "return")?;
        if cursor.eat(";") {
            return Ok(ProgramNode::keyword(KeywordKind::Return, vec![ProgramNode::atom("return")]));
        }
        let value = self.parse_expr(cursor)?;
        self.expect(cursor, ";")?;
        let ty = value.ty.clone();
        Ok(ProgramNode::keyword(
            KeywordKind::Return,
            vec![
                ProgramNode::atom("return "),
                ProgramNode::typed_atom(value.text, value.ty),
            ],
        )
        .with_ty(ty))
    }

    /// `else` placement and returned types of a finished scope.
    fn check_scope(&self, children: &[ProgramNode]) -> SemaResult<()> {
        for (i, child) in children.iter().enumerate() {
            match child.keyword_kind() {
                Some(KeywordKind::Else) => {
                    let follows_if = i
                        .checked_sub(1)
                        .and_then(|prev| children.get(prev))
                        .is_some_and(|prev| prev.is_keyword(KeywordKind::If));
                    if !follows_if {
                        return Err(self.error(SemaErrorKind::ElseWithoutIf));
                    }
                }
                Some(KeywordKind::Return) => self.check_return(child.ty())?,
                _ => {}
            }
        }
        Ok(())
    }

    fn check_return(&self, found: &Type) -> SemaResult<()> {
        let Some(expected) = &self.return_type else {
            return Ok(());
        };
        let ok = if expected.is_null() || found.is_null() {
            expected.is_null() && found.is_null()
        } else {
            assignable(expected, found)
        };
        if ok {
            Ok(())
        } else {
            Err(self.error(SemaErrorKind::mismatch(expected, found, "return value")))
        }
    }

    /// Pop the innermost scope, restoring the table and scheduling destructor
    /// calls for the non-trivial locals it declared.
    pub(super) fn close_frame(&mut self, mut children: Vec<ProgramNode>) -> SemaResult<Vec<ProgramNode>> {
        let checked = self.check_scope(&children);
        let Some(frame) = self.frames.pop() else {
            return checked.map(|()| children);
        };
        let mut out_of_scope = self.session.table.restore(frame.snapshot);
        checked?;

        let mut destructors = Vec::new();
        for local in frame.declared.iter().rev().filter(|l| !l.ty.is_trivial()) {
            let Some(pos) = out_of_scope
                .iter()
                .position(|(name, ty)| *name == local.name && *ty == local.ty)
            else {
                continue;
            };
            out_of_scope.swap_remove(pos);
            let call = self.lifecycle_call("Del", &local.ty, format!("&{}", local.name))?;
            destructors.push(Destructor {
                variable: local.name.clone(),
                at: local.at,
                call,
            });
        }
        if destructors.is_empty() {
            return Ok(children);
        }
        tracing::trace!(count = destructors.len(), "scheduled destructors");

        guard_returns(&mut children, &destructors, None, &mut self.temporaries);
        let ends_in_return = children
            .last()
            .is_some_and(|last| last.is_keyword(KeywordKind::Return));
        if !ends_in_return {
            children.extend(destructors.iter().map(Destructor::node));
        }
        Ok(children)
    }
}
