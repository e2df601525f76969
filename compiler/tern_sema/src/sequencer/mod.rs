//! The sequencer: a single forward pass over the token stream that resolves
//! names, types and overloads and builds the typed [`ProgramNode`] tree.
//!
//! Declarations, statements and expressions are handled in sibling modules;
//! this module owns the pass state (open scopes, the enclosing function's
//! return type) and the entry points.
//!
//! # Scopes
//!
//! Every `{` pushes a [`ScopeFrame`] holding a full snapshot of the symbol
//! table. Closing the scope restores the snapshot, keeping functions defined
//! inside, and schedules destructor calls for the non-trivial locals that
//! went out of scope.
//!
//! # Detached sequencing
//!
//! Generic instances are sequenced through [`SequenceService`]. When that
//! happens inside a function body the open frames are set aside and the
//! table is reduced to the globals, so the instance cannot see the caller's
//! locals.

mod decl;
mod expr;
mod intrinsics;
mod matching;
mod stmt;
mod types;

use tern_ir::{CursorError, ProgramNode, Token, TokenCursor};
use tern_stack::ensure_sufficient_stack;
use tern_types::Type;

use crate::error::{ResultExt, SemaError, SemaErrorKind, SemaResult};
use crate::generics::SequenceService;
use crate::session::Session;
use crate::symbols::SymbolTable;

/// A sequenced compilation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    /// Top-level declarations in emission order. Generic instances precede
    /// the declaration that triggered them.
    pub declarations: Vec<ProgramNode>,
}

impl Program {
    /// Concatenated C text of every declaration.
    pub fn to_c(&self) -> String {
        let mut out = String::new();
        for decl in &self.declarations {
            decl.write_to(&mut out);
        }
        out
    }
}

/// A local declared in a scope.
#[derive(Clone, Debug)]
struct Local {
    name: String,
    ty: Type,
    /// Index of the scope child the declaration produced.
    at: usize,
}

struct ScopeFrame {
    snapshot: SymbolTable,
    declared: Vec<Local>,
    /// Index the next statement's nodes will take in the scope.
    position: usize,
    /// Holds a function's parameters. C puts them in the same scope as the
    /// function's outermost block.
    parameters: bool,
}

pub struct Sequencer<'s> {
    session: &'s mut Session,
    frames: Vec<ScopeFrame>,
    /// Return type of the function being sequenced.
    return_type: Option<Type>,
    /// Counter for return-value temporaries.
    temporaries: usize,
}

impl<'s> Sequencer<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Sequencer {
            session,
            frames: Vec::new(),
            return_type: None,
            temporaries: 0,
        }
    }

    /// Sequence a whole compilation unit.
    #[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
    pub fn sequence_program(&mut self, tokens: &[Token]) -> SemaResult<Program> {
        let mut cursor = TokenCursor::new(tokens);
        let mut declarations = Vec::new();

        while let Some(first) = cursor.peek() {
            let nodes = ensure_sufficient_stack(|| self.sequence_declaration(&mut cursor))
                .with_context(|| format!("in file `{}`", first.file))?;
            declarations.extend(self.session.take_pending());
            declarations.extend(nodes);
        }
        declarations.extend(self.session.autogen_bodies());

        tracing::debug!(declarations = declarations.len(), "program sequenced");
        Ok(Program { declarations })
    }

    fn sequence_declarations(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Vec<ProgramNode>> {
        let mut nodes = Vec::new();
        while !cursor.at_end() {
            nodes.extend(self.sequence_declaration(cursor)?);
        }
        Ok(nodes)
    }

    /// Sequence top-level tokens with local scopes hidden.
    fn sequence_detached(&mut self, tokens: &[Token]) -> SemaResult<Vec<ProgramNode>> {
        let frames = std::mem::take(&mut self.frames);
        let return_type = self.return_type.take();
        let location = self.session.location().clone();

        let outer = match frames.first() {
            Some(frame) => {
                let mut globals = frame.snapshot.snapshot();
                globals.absorb_functions(&self.session.table);
                std::mem::replace(&mut self.session.table, globals)
            }
            None => self.session.table.snapshot(),
        };

        let result = ensure_sufficient_stack(|| self.sequence_declarations(&mut TokenCursor::new(tokens)));

        let inner = std::mem::replace(&mut self.session.table, outer);
        if result.is_ok() {
            self.session.table.absorb_functions(&inner);
        }
        self.frames = frames;
        self.return_type = return_type;
        self.session.set_location(location);
        result
    }

    // -- Cursor helpers: every consumed token moves the current location --

    fn cursor_error(&self, err: CursorError) -> SemaError {
        SemaError::from_cursor(err, self.session.location())
    }

    fn error(&self, kind: SemaErrorKind) -> SemaError {
        self.session.error(kind)
    }

    fn expect<'t>(&mut self, cursor: &mut TokenCursor<'t>, text: &str) -> SemaResult<&'t Token> {
        let tok = cursor.expect(text).map_err(|e| self.cursor_error(e))?;
        self.session.track(tok);
        Ok(tok)
    }

    fn next_token<'t>(&mut self, cursor: &mut TokenCursor<'t>, what: &str) -> SemaResult<&'t Token> {
        let tok = cursor.expect_any(what).map_err(|e| self.cursor_error(e))?;
        self.session.track(tok);
        Ok(tok)
    }

    fn identifier<'t>(&mut self, cursor: &mut TokenCursor<'t>, what: &str) -> SemaResult<&'t Token> {
        let tok = self.next_token(cursor, what)?;
        if tok.is_identifier() {
            Ok(tok)
        } else {
            Err(self.error(SemaErrorKind::ExpectedToken {
                expected: what.to_string(),
                found: tok.text.clone(),
            }))
        }
    }

    fn take_balanced<'t>(
        &mut self,
        cursor: &mut TokenCursor<'t>,
        open: &str,
        close: &str,
    ) -> SemaResult<&'t [Token]> {
        if let Some(tok) = cursor.peek() {
            self.session.track(tok);
        }
        cursor
            .take_balanced(open, close)
            .map_err(|e| self.cursor_error(e))
    }

    /// Fail unless `cursor` is exhausted.
    fn expect_end(&mut self, cursor: &TokenCursor<'_>, what: &str) -> SemaResult<()> {
        match cursor.peek() {
            None => Ok(()),
            Some(tok) => {
                self.session.track(tok);
                Err(self.error(SemaErrorKind::ExpectedToken {
                    expected: what.to_string(),
                    found: tok.text.clone(),
                }))
            }
        }
    }

    fn peek_or_end<'t>(&mut self, cursor: &TokenCursor<'t>, expected: &str) -> SemaResult<&'t Token> {
        match cursor.peek() {
            Some(tok) => {
                self.session.track(tok);
                Ok(tok)
            }
            None => Err(self.error(SemaErrorKind::UnexpectedEnd {
                expected: expected.to_string(),
            })),
        }
    }
}

impl SequenceService for Sequencer<'_> {
    fn session(&mut self) -> &mut Session {
        &mut *self.session
    }

    fn sequence_tokens(&mut self, tokens: &[Token]) -> SemaResult<Vec<ProgramNode>> {
        self.sequence_detached(tokens)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
