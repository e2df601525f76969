//! Front-end errors.
//!
//! A [`SemaError`] is fatal: the first one aborts the compilation unit. It
//! carries what went wrong ([`SemaErrorKind`]), where (the location of the
//! token being processed), and the chain of enclosing constructs added on the
//! way out with [`ResultExt::context`].

use std::fmt;

use tern_diagnostic::{Diagnostic, ErrorCode, SourceLocation};
use tern_ir::CursorError;
use tern_types::LiteralError;

pub type SemaResult<T> = Result<T, SemaError>;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SemaErrorKind {
    // Structural
    #[error("expected `{expected}`, found `{found}`")]
    ExpectedToken { expected: String, found: String },

    #[error("unexpected end of input, expected `{expected}`")]
    UnexpectedEnd { expected: String },

    #[error("unbalanced `{open}`")]
    UnbalancedDelimiter { open: String },

    #[error("{what} is not allowed here")]
    MisplacedDeclaration { what: &'static str },

    #[error("malformed type at `{found}`")]
    MalformedType { found: String },

    // Semantic
    #[error("type mismatch in {context}: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: String,
        found: String,
        context: String,
    },

    #[error("unknown symbol `{name}`")]
    UnknownSymbol { name: String },

    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    #[error("`{ty}` has no member `{member}`")]
    UnknownMember { ty: String, member: String },

    #[error("enum `{ty}` has no option `{option}`")]
    UnknownOption { ty: String, option: String },

    #[error("illegal redefinition of {what} `{name}`")]
    Redefinition { what: &'static str, name: String },

    #[error("ambiguous call to `{name}`: {} candidates match exactly", candidates.len())]
    AmbiguousCall {
        name: String,
        candidates: Vec<String>,
    },

    #[error("call to `{name}` needs multiple automatic referencing")]
    MultipleAutoRef { name: String },

    #[error("no overload of `{name}` accepts ({args})")]
    NoMatchingOverload {
        name: String,
        args: String,
        rejections: Vec<String>,
    },

    #[error("`else` must directly follow an `if`")]
    ElseWithoutIf,

    #[error("`default` must be the last case of a `match`")]
    DefaultNotLast,

    #[error("option `{option}` is matched more than once")]
    DuplicateCase { option: String },

    #[error(transparent)]
    Literal(#[from] LiteralError),

    #[error("invalid use of `{name}`: {reason}")]
    IntrinsicMisuse { name: String, reason: String },

    #[error("unknown intrinsic `{name}`")]
    UnknownIntrinsic { name: String },

    #[error("panic: {message}")]
    UserPanic { message: String },

    #[error("`{name}` uses the reserved symbol prefix")]
    ReservedIdentifier { name: String },

    // Generics
    #[error("no candidate of generic `{name}` could be instantiated")]
    GenericsFailed { name: String, failures: Vec<String> },

    #[error("unknown generic `{name}`")]
    UnknownGeneric { name: String },
}

impl SemaErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            SemaErrorKind::ExpectedToken { .. } => ErrorCode::E0001,
            SemaErrorKind::UnexpectedEnd { .. } => ErrorCode::E0002,
            SemaErrorKind::UnbalancedDelimiter { .. } => ErrorCode::E0003,
            SemaErrorKind::MisplacedDeclaration { .. } => ErrorCode::E0004,
            SemaErrorKind::MalformedType { .. } => ErrorCode::E0005,
            SemaErrorKind::TypeMismatch { .. } => ErrorCode::E1001,
            SemaErrorKind::UnknownSymbol { .. } => ErrorCode::E1002,
            SemaErrorKind::UnknownType { .. } => ErrorCode::E1003,
            SemaErrorKind::UnknownMember { .. } => ErrorCode::E1004,
            SemaErrorKind::UnknownOption { .. } => ErrorCode::E1005,
            SemaErrorKind::Redefinition { .. } => ErrorCode::E1006,
            SemaErrorKind::AmbiguousCall { .. } => ErrorCode::E1007,
            SemaErrorKind::MultipleAutoRef { .. } => ErrorCode::E1008,
            SemaErrorKind::NoMatchingOverload { .. } => ErrorCode::E1009,
            SemaErrorKind::ElseWithoutIf => ErrorCode::E1010,
            SemaErrorKind::DefaultNotLast => ErrorCode::E1011,
            SemaErrorKind::DuplicateCase { .. } => ErrorCode::E1012,
            SemaErrorKind::Literal(_) => ErrorCode::E1013,
            SemaErrorKind::IntrinsicMisuse { .. } => ErrorCode::E1014,
            SemaErrorKind::UnknownIntrinsic { .. } => ErrorCode::E1015,
            SemaErrorKind::UserPanic { .. } => ErrorCode::E1016,
            SemaErrorKind::ReservedIdentifier { .. } => ErrorCode::E1017,
            SemaErrorKind::GenericsFailed { .. } => ErrorCode::E2001,
            SemaErrorKind::UnknownGeneric { .. } => ErrorCode::E2002,
        }
    }

    /// Per-candidate detail lines, if the kind carries any.
    pub fn details(&self) -> &[String] {
        match self {
            SemaErrorKind::AmbiguousCall { candidates, .. } => candidates,
            SemaErrorKind::NoMatchingOverload { rejections, .. } => rejections,
            SemaErrorKind::GenericsFailed { failures, .. } => failures,
            _ => &[],
        }
    }

    pub(crate) fn mismatch(
        expected: impl fmt::Display,
        found: impl fmt::Display,
        context: impl Into<String>,
    ) -> Self {
        SemaErrorKind::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
            context: context.into(),
        }
    }

    pub(crate) fn misuse(name: &str, reason: impl Into<String>) -> Self {
        SemaErrorKind::IntrinsicMisuse {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// A fatal front-end error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SemaError {
    pub kind: SemaErrorKind,
    pub location: SourceLocation,
    /// Enclosing constructs, innermost first.
    pub context: Vec<String>,
}

impl From<CursorError> for SemaErrorKind {
    fn from(err: CursorError) -> Self {
        match err {
            CursorError::Expected { expected, found } => SemaErrorKind::ExpectedToken {
                expected,
                found: found.text,
            },
            CursorError::UnexpectedEnd { expected } => SemaErrorKind::UnexpectedEnd { expected },
            CursorError::Unbalanced { open, .. } => SemaErrorKind::UnbalancedDelimiter { open },
        }
    }
}

impl SemaError {
    pub fn new(kind: SemaErrorKind, location: SourceLocation) -> Self {
        SemaError {
            kind,
            location,
            context: Vec::new(),
        }
    }

    /// A cursor failure, located at the offending token when there is one.
    pub fn from_cursor(err: CursorError, fallback: &SourceLocation) -> Self {
        let location = err.token().map_or_else(
            || fallback.clone(),
            |tok| SourceLocation::new(tok.file.as_ref(), tok.line, tok.column),
        );
        SemaError::new(err.into(), location)
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code())
            .with_message(self.kind.to_string())
            .at(self.location.clone());
        for detail in self.kind.details() {
            diag = diag.with_note(detail.clone());
        }
        for ctx in self.context.iter().rev() {
            diag = diag.with_note(ctx.clone());
        }
        diag
    }
}

impl fmt::Display for SemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.location)?;
        for ctx in self.context.iter().rev() {
            write!(f, "{ctx}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for SemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Context chaining for [`SemaResult`].
pub trait ResultExt<T> {
    /// Record the enclosing construct on the error path.
    fn context(self, context: impl Into<String>) -> SemaResult<T>;

    /// Like [`ResultExt::context`], building the text only on error.
    fn with_context<C: Into<String>>(self, f: impl FnOnce() -> C) -> SemaResult<T>;
}

impl<T> ResultExt<T> for SemaResult<T> {
    fn context(self, context: impl Into<String>) -> SemaResult<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<C: Into<String>>(self, f: impl FnOnce() -> C) -> SemaResult<T> {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
