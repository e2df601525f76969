//! Type model for Tern.
//!
//! A [`Type`] is an ordered sequence of [`TypeNode`]s read in prefix order:
//! a `Pointer` node refers to whatever follows it. Function signatures are
//! flattened into the same sequence using `FunctionStart`, `ParamName`,
//! `Join` and `ReturnMarker` nodes.
//!
//! Besides the type itself this crate owns everything that only needs a type
//! to work:
//! - literal classification ([`check_literal`])
//! - the primitive table and C spellings ([`Primitive`])
//! - symbol mangling ([`Mangler`])
//! - value-keyed derived caches ([`DerivedCache`])

mod cache;
mod literal;
mod mangle;
mod primitive;
mod ty;

pub use cache::{DerivedCache, DEFAULT_CACHE_THRESHOLD};
pub use literal::{check_literal, LiteralError, LiteralType};
pub use mangle::{Mangler, MANGLE_PREFIX};
pub use primitive::{Family, Primitive};
pub use ty::{type_vector, Param, Signature, Type, TypeNode, NULL_NAME};
