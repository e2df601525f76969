//! Tokens and a forward-only cursor over them.

use std::fmt;
use std::sync::Arc;

/// A pre-lexed token with its origin.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub text: String,
    pub line: u32,
    pub column: u32,
    pub file: Arc<str>,
}

impl Token {
    pub fn new(text: impl Into<String>, file: Arc<str>, line: u32, column: u32) -> Self {
        Token {
            text: text.into(),
            line,
            column,
            file,
        }
    }

    /// Whether the token text is exactly `text`.
    #[inline]
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    /// Intrinsic names end in `!` (`alloc!`, `panic!`).
    pub fn is_intrinsic(&self) -> bool {
        self.text.len() > 1 && self.text.ends_with('!')
    }

    /// Identifier-shaped: starts with a letter or `_`, continues with
    /// alphanumerics or `_`.
    pub fn is_identifier(&self) -> bool {
        let mut chars = self.text.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("expected `{expected}`, found `{found}`")]
    Expected { expected: String, found: Token },

    #[error("unexpected end of input, expected `{expected}`")]
    UnexpectedEnd { expected: String },

    #[error("unbalanced `{open}`")]
    Unbalanced { open: String, at: Token },
}

impl CursorError {
    /// The token the error points at, if any.
    pub fn token(&self) -> Option<&Token> {
        match self {
            CursorError::Expected { found, .. } => Some(found),
            CursorError::Unbalanced { at, .. } => Some(at),
            CursorError::UnexpectedEnd { .. } => None,
        }
    }
}

/// Index cursor over an immutable token slice.
///
/// Tokens are consumed strictly front to back; nothing is re-read once
/// consumed. Captured sub-slices borrow from the underlying slice.
#[derive(Clone, Debug)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        TokenCursor { tokens, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_text(&self) -> Option<&'a str> {
        self.peek().map(|t| t.text.as_str())
    }

    /// Look `n` tokens ahead; `peek_nth(0)` is `peek()`.
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    /// Whether the next token is `text`.
    pub fn at(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is(text))
    }

    /// Consume the next token if it is `text`.
    pub fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume the next token, which must be `text`.
    pub fn expect(&mut self, text: &str) -> Result<&'a Token, CursorError> {
        match self.peek() {
            Some(tok) if tok.is(text) => {
                self.pos += 1;
                Ok(tok)
            }
            Some(tok) => Err(CursorError::Expected {
                expected: text.to_string(),
                found: tok.clone(),
            }),
            None => Err(CursorError::UnexpectedEnd {
                expected: text.to_string(),
            }),
        }
    }

    /// Consume any next token; `what` names it for the error.
    pub fn expect_any(&mut self, what: &str) -> Result<&'a Token, CursorError> {
        self.next().ok_or_else(|| CursorError::UnexpectedEnd {
            expected: what.to_string(),
        })
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The most recently consumed token.
    pub fn previous(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Everything not yet consumed.
    pub fn remaining(&self) -> &'a [Token] {
        self.tokens.get(self.pos..).unwrap_or(&[])
    }

    /// Consume a bracketed group starting at `open` and return its inside,
    /// verbatim. Nested `open`/`close` pairs are kept inside the capture.
    pub fn take_balanced(&mut self, open: &str, close: &str) -> Result<&'a [Token], CursorError> {
        let start_tok = self.expect(open)?;
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(tok) = self.next() {
            if tok.is(open) {
                depth += 1;
            } else if tok.is(close) {
                depth -= 1;
                if depth == 0 {
                    return Ok(&self.tokens[start..self.pos - 1]);
                }
            }
        }
        Err(CursorError::Unbalanced {
            open: open.to_string(),
            at: start_tok.clone(),
        })
    }

    /// Consume tokens up to the first `text` outside any `()`, `[]` or `{}`
    /// group, consume that terminator, and return what came before it.
    pub fn take_until(&mut self, text: &str) -> Result<&'a [Token], CursorError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            if depth == 0 && tok.is(text) {
                let captured = &self.tokens[start..self.pos];
                self.pos += 1;
                return Ok(captured);
            }
            match tok.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
        }
        Err(CursorError::UnexpectedEnd {
            expected: text.to_string(),
        })
    }
}

impl<'a> Iterator for TokenCursor<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
