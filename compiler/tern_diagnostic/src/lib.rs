//! Diagnostics for the Tern front end.
//!
//! - Error codes for searchability ([`ErrorCode`])
//! - A builder-style [`Diagnostic`] carrying the `file:line:column` it refers to
//! - A [`Diagnostics`] collector for the non-fatal warnings and notes a
//!   compilation session accumulates

mod collector;
mod diagnostic;
mod error_code;

pub use collector::Diagnostics;
pub use diagnostic::{Diagnostic, Severity, SourceLocation};
pub use error_code::ErrorCode;
