//! Symbol mangling.
//!
//! Turns overloaded functions and generic instances into flat, unique C
//! identifiers.
//!
//! # Mangling Scheme
//!
//! ```text
//! _Tn <name> <type>                  function overloads
//! _Tn <name> G <sub> (J <sub>)* E    generic instances
//! ```
//!
//! - `_Tn` is the prefix identifying Tern symbols
//! - names are length-prefixed: `add` is `3add`
//! - characters outside `[A-Za-z0-9_]` are hex-escaped per UTF-8 byte (`_x2d`)
//! - type nodes: `P` pointer, `A` unsized array, `S<len><bound>` sized array,
//!   `F` function start, `J` join, `R` return marker; parameter names are
//!   omitted
//!
//! An identifier that is already mangled is spliced in without its prefix,
//! so `Box<Box<i32>>` and `Box<_Tn3BoxG3i32E>` produce the same symbol.
//!
//! # Examples
//!
//! | Tern symbol | Mangled name |
//! |-------------|--------------|
//! | `add(a: i32, b: i32): i32` | `_Tn3addF3i32J3i32R3i32` |
//! | `main(): i32` | `main` |
//! | `Box<i32>` | `_Tn3BoxG3i32E` |
//! | `Pair<*u8, [4]f64>` | `_Tn4PairGP2u8JS143f64E` |

use std::fmt::Write;

use rustc_hash::FxHashSet;

use crate::{Type, TypeNode};

/// The prefix for all Tern mangled symbols.
pub const MANGLE_PREFIX: &str = "_Tn";

/// Symbol mangler for generating unique C names.
#[derive(Debug, Clone)]
pub struct Mangler {
    /// Function names emitted as-is (the program entry point).
    preserved: FxHashSet<String>,
}

impl Default for Mangler {
    fn default() -> Self {
        Self::with_entry_point("main")
    }
}

impl Mangler {
    /// Create a mangler that leaves `main` unmangled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mangler that leaves `entry_point` unmangled.
    #[must_use]
    pub fn with_entry_point(entry_point: &str) -> Self {
        let mut preserved = FxHashSet::default();
        preserved.insert(entry_point.to_string());
        Mangler { preserved }
    }

    /// Whether `name` was produced by a mangler.
    pub fn is_mangled(name: &str) -> bool {
        name.starts_with(MANGLE_PREFIX)
    }

    /// Mangle a function overload from its name and signature type.
    #[must_use]
    pub fn mangle_function(&self, name: &str, ty: &Type) -> String {
        if self.preserved.contains(name) {
            return name.to_string();
        }

        let mut result = String::with_capacity(32);
        result.push_str(MANGLE_PREFIX);
        Self::encode_identifier(&mut result, name);
        Self::encode_type(&mut result, ty);
        result
    }

    /// Mangle a generic instance from its base name and one token vector per
    /// substituted parameter.
    #[must_use]
    pub fn mangle_generic(&self, name: &str, substitutions: &[Vec<String>]) -> String {
        let mut result = String::with_capacity(32);
        result.push_str(MANGLE_PREFIX);
        Self::encode_identifier(&mut result, name);
        result.push('G');
        for (i, sub) in substitutions.iter().enumerate() {
            if i > 0 {
                result.push('J');
            }
            Self::encode_tokens(&mut result, sub);
        }
        result.push('E');
        result
    }

    /// Mangle a type written as source tokens (`Box`, `<`, `i32`, `>`).
    ///
    /// Agrees with [`Mangler::mangle_generic`] for generic instances, which is
    /// what type-vector matching relies on.
    #[must_use]
    pub fn mangle_type_tokens(&self, tokens: &[String]) -> String {
        let mut result = String::with_capacity(32);
        result.push_str(MANGLE_PREFIX);
        Self::encode_tokens(&mut result, tokens);
        result
    }

    // -- Internal encoding helpers --

    #[inline]
    fn encode_byte_hex(out: &mut String, b: u8) {
        let _ = write!(out, "_x{b:02x}");
    }

    /// Encode a length-prefixed identifier, splicing already-mangled names.
    fn encode_identifier(out: &mut String, name: &str) {
        if let Some(spliced) = name.strip_prefix(MANGLE_PREFIX) {
            out.push_str(spliced);
            return;
        }

        let mut encoded = String::with_capacity(name.len());
        for c in name.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                encoded.push(c);
            } else {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    Self::encode_byte_hex(&mut encoded, b);
                }
            }
        }
        let _ = write!(out, "{}{encoded}", encoded.len());
    }

    fn encode_type(out: &mut String, ty: &Type) {
        for node in ty.nodes() {
            match node {
                TypeNode::Pointer => out.push('P'),
                TypeNode::Atomic(name) => Self::encode_identifier(out, name),
                TypeNode::UnsizedArray => out.push('A'),
                TypeNode::SizedArray(bound) => {
                    out.push('S');
                    Self::encode_identifier(out, bound);
                }
                TypeNode::Join => out.push('J'),
                TypeNode::FunctionStart => out.push('F'),
                TypeNode::ReturnMarker => out.push('R'),
                TypeNode::ParamName(_) => {}
            }
        }
    }

    fn encode_tokens(out: &mut String, tokens: &[String]) {
        let mut i = 0;
        while i < tokens.len() {
            match tokens[i].as_str() {
                "*" => out.push('P'),
                "<" => out.push('G'),
                ">" => out.push('E'),
                "," => out.push('J'),
                "[" if tokens.get(i + 1).map(String::as_str) == Some("]") => {
                    out.push('A');
                    i += 1;
                }
                "[" if tokens.get(i + 2).map(String::as_str) == Some("]") => {
                    out.push('S');
                    Self::encode_identifier(out, &tokens[i + 1]);
                    i += 2;
                }
                other => Self::encode_identifier(out, other),
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests;
