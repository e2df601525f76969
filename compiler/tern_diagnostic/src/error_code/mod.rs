//! Error codes for all front-end diagnostics.
//!
//! Each code is a unique identifier (e.g. `E1009`) whose first digit names the
//! kind of problem.

use std::fmt;

/// Error codes for all front-end diagnostics.
///
/// Format: `E####` / `W####` where:
/// - E0xxx: structural errors (token stream shape)
/// - E1xxx: semantic errors (names, types, overloads, intrinsics)
/// - E2xxx: generic instantiation errors
/// - W0xxx: warnings and compile-time notes
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Structural Errors (E0xxx)
    /// Expected a specific token
    E0001,
    /// Unexpected end of input
    E0002,
    /// Unbalanced delimiter
    E0003,
    /// Declaration not allowed here
    E0004,
    /// Malformed type
    E0005,

    // Semantic Errors (E1xxx)
    /// Type mismatch
    E1001,
    /// Unknown symbol
    E1002,
    /// Unknown type
    E1003,
    /// Unknown struct member
    E1004,
    /// Unknown enum option
    E1005,
    /// Illegal redefinition
    E1006,
    /// Ambiguous call
    E1007,
    /// Multiple automatic referencing
    E1008,
    /// No matching overload
    E1009,
    /// `else` without a preceding `if`
    E1010,
    /// `default` is not the last case
    E1011,
    /// Duplicate `case`
    E1012,
    /// Invalid literal
    E1013,
    /// Intrinsic misuse
    E1014,
    /// Unknown intrinsic
    E1015,
    /// Compile-time panic
    E1016,
    /// Reserved identifier
    E1017,

    // Generics Errors (E2xxx)
    /// No generic candidate could be instantiated
    E2001,
    /// Unknown generic
    E2002,

    // Warnings (W0xxx)
    /// Enum options not handled by `match`
    W0001,
    /// Numeric literal wider than `i64`
    W0002,
    /// Compile-time warning
    W0003,
    /// Source file name is not snake_case `.tn`
    W0004,
    /// Compile-time note
    W0005,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        // Structural
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E0005,
        // Semantic
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        ErrorCode::E1010,
        ErrorCode::E1011,
        ErrorCode::E1012,
        ErrorCode::E1013,
        ErrorCode::E1014,
        ErrorCode::E1015,
        ErrorCode::E1016,
        ErrorCode::E1017,
        // Generics
        ErrorCode::E2001,
        ErrorCode::E2002,
        // Warnings
        ErrorCode::W0001,
        ErrorCode::W0002,
        ErrorCode::W0003,
        ErrorCode::W0004,
        ErrorCode::W0005,
    ];

    /// Get the code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Structural
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            // Semantic
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E1011 => "E1011",
            ErrorCode::E1012 => "E1012",
            ErrorCode::E1013 => "E1013",
            ErrorCode::E1014 => "E1014",
            ErrorCode::E1015 => "E1015",
            ErrorCode::E1016 => "E1016",
            ErrorCode::E1017 => "E1017",
            // Generics
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            // Warnings
            ErrorCode::W0001 => "W0001",
            ErrorCode::W0002 => "W0002",
            ErrorCode::W0003 => "W0003",
            ErrorCode::W0004 => "W0004",
            ErrorCode::W0005 => "W0005",
        }
    }

    /// One-line summary used as the fallback message.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "expected token",
            ErrorCode::E0002 => "unexpected end of input",
            ErrorCode::E0003 => "unbalanced delimiter",
            ErrorCode::E0004 => "declaration not allowed here",
            ErrorCode::E0005 => "malformed type",
            ErrorCode::E1001 => "type mismatch",
            ErrorCode::E1002 => "unknown symbol",
            ErrorCode::E1003 => "unknown type",
            ErrorCode::E1004 => "unknown member",
            ErrorCode::E1005 => "unknown enum option",
            ErrorCode::E1006 => "illegal redefinition",
            ErrorCode::E1007 => "ambiguous call",
            ErrorCode::E1008 => "multiple automatic referencing",
            ErrorCode::E1009 => "no matching overload",
            ErrorCode::E1010 => "else without if",
            ErrorCode::E1011 => "default must be the last case",
            ErrorCode::E1012 => "duplicate case",
            ErrorCode::E1013 => "invalid literal",
            ErrorCode::E1014 => "invalid intrinsic use",
            ErrorCode::E1015 => "unknown intrinsic",
            ErrorCode::E1016 => "compile-time panic",
            ErrorCode::E1017 => "reserved identifier",
            ErrorCode::E2001 => "generic instantiation failed",
            ErrorCode::E2002 => "unknown generic",
            ErrorCode::W0001 => "unhandled enum options",
            ErrorCode::W0002 => "untyped numeric literal",
            ErrorCode::W0003 => "compile-time warning",
            ErrorCode::W0004 => "non-conforming source file name",
            ErrorCode::W0005 => "compile-time note",
        }
    }

    /// Check if this is a structural error (E0xxx range).
    pub fn is_structural_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    /// Check if this is a semantic error (E1xxx range).
    pub fn is_semantic_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a generics error (E2xxx range).
    pub fn is_generics_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is a warning code (Wxxxx range).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E1009"` or `"W0001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
