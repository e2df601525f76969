//! Intermediate representation shared by the Tern front end.
//!
//! - [`Token`] and [`TokenCursor`]: the pre-lexed input and a forward-only
//!   cursor over it
//! - [`ProgramNode`]: the typed output tree of C fragments
//! - [`testing`]: a small tokenizer for tests and embedders that have no
//!   lexer of their own

mod node;
pub mod testing;
mod token;

pub use node::{EnumKeywordKind, KeywordKind, ProgramNode};
pub use token::{CursorError, Token, TokenCursor};
