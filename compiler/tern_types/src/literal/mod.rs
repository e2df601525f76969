//! Literal classification.
//!
//! Decides whether a raw token is a literal and, if so, which type it has.
//! Tokens that are not literals fall through to symbol lookup.

use crate::{Primitive, Type};

/// The inferred type of a literal token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteralType {
    pub ty: Type,
    /// A decimal literal too large for `i64` was clamped to `i64`.
    pub clamped: bool,
}

impl LiteralType {
    fn exact(prim: Primitive) -> Self {
        LiteralType {
            ty: prim.ty(),
            clamped: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("malformed {radix} literal `{text}`")]
    Malformed { text: String, radix: &'static str },

    #[error("literal `{text}` needs {bits} bits; the widest integer has 64")]
    TooWide { text: String, bits: u32 },
}

/// Classify `text` as a literal.
///
/// Returns `Ok(None)` when the token is not a literal at all.
pub fn check_literal(text: &str) -> Result<Option<LiteralType>, LiteralError> {
    match text {
        "true" | "false" => return Ok(Some(LiteralType::exact(Primitive::Bool))),
        _ => {}
    }

    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Ok(Some(LiteralType::exact(Primitive::Str)));
    }

    if let Some(digits) = strip_radix(text, 'x') {
        return radix_literal(text, digits, "hexadecimal", 4, |c| c.is_ascii_hexdigit());
    }
    if let Some(digits) = strip_radix(text, 'b') {
        return radix_literal(text, digits, "binary", 1, |c| c == '0' || c == '1');
    }

    if is_digits(text) {
        return Ok(Some(decimal_literal(text)));
    }

    if let Some((whole, frac)) = text.split_once('.') {
        if is_digits(whole) && is_digits(frac) {
            return Ok(Some(LiteralType::exact(Primitive::F64)));
        }
    }

    Ok(None)
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn strip_radix(text: &str, marker: char) -> Option<&str> {
    let rest = text.strip_prefix('0')?;
    rest.strip_prefix(marker)
        .or_else(|| rest.strip_prefix(marker.to_ascii_uppercase()))
}

fn radix_literal(
    text: &str,
    digits: &str,
    radix: &'static str,
    bits_per_digit: u32,
    valid: impl Fn(char) -> bool,
) -> Result<Option<LiteralType>, LiteralError> {
    if digits.is_empty() || !digits.chars().all(valid) {
        return Err(LiteralError::Malformed {
            text: text.to_string(),
            radix,
        });
    }

    let bits = u32::try_from(digits.len())
        .unwrap_or(u32::MAX)
        .saturating_mul(bits_per_digit);
    match Primitive::unsigned_for_bits(bits) {
        Some(prim) => Ok(Some(LiteralType::exact(prim))),
        None => Err(LiteralError::TooWide {
            text: text.to_string(),
            bits,
        }),
    }
}

fn decimal_literal(text: &str) -> LiteralType {
    match text.parse::<u64>() {
        Ok(value) if value <= i32::MAX as u64 => LiteralType::exact(Primitive::I32),
        Ok(value) if value <= i64::MAX as u64 => LiteralType::exact(Primitive::I64),
        _ => LiteralType {
            ty: Primitive::I64.ty(),
            clamped: true,
        },
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
