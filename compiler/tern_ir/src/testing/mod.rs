//! Minimal tokenizer for tests and lexer-less embedders.
//!
//! Produces the token shapes the sequencer expects: identifiers (optionally
//! ending in `!`), numbers (`12`, `0xFF`, `3.5`), quoted strings with their
//! quotes, `::`, and single-character punctuation. `//` comments and
//! whitespace are dropped. Lines and columns are 1-based.

use std::sync::Arc;

use crate::Token;

pub fn tokenize(source: &str, file: &str) -> Vec<Token> {
    let file: Arc<str> = Arc::from(file);
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();

    let mut i = 0;
    let mut line = 1u32;
    let mut column = 1u32;

    while i < chars.len() {
        let c = chars[i];
        let (start_line, start_column) = (line, column);

        if c == '\n' {
            i += 1;
            line += 1;
            column = 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            column += 1;
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        let start = i;
        if c == '"' {
            i += 1;
            while i < chars.len() && chars[i] != '"' {
                if chars[i] == '\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(chars.len());
        } else if c.is_ascii_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            if chars.get(i) == Some(&'!') {
                i += 1;
            }
        } else if c.is_ascii_digit() {
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(char::is_ascii_digit) {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
        } else if c == ':' && chars.get(i + 1) == Some(&':') {
            i += 2;
        } else {
            i += 1;
        }

        let text: String = chars[start..i].iter().collect();
        column += u32::try_from(i - start).unwrap_or(u32::MAX);
        tokens.push(Token::new(text, Arc::clone(&file), start_line, start_column));
    }

    tokens
}
