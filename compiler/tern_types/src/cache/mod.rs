//! Memoized derivations keyed by [`Type`] value.
//!
//! Keys are whole type values, so a mutated type is simply a different key
//! and cached entries never go stale. Each map is cleared wholesale once it
//! grows past its threshold.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{Signature, Type};

/// Default entry count at which a cache map is cleared.
pub const DEFAULT_CACHE_THRESHOLD: usize = 1000;

#[derive(Debug)]
pub struct DerivedCache {
    threshold: usize,
    signatures: FxHashMap<Type, Option<Rc<Signature>>>,
    c_types: FxHashMap<Type, Rc<str>>,
}

impl Default for DerivedCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_THRESHOLD)
    }
}

impl DerivedCache {
    pub fn new(threshold: usize) -> Self {
        DerivedCache {
            threshold: threshold.max(1),
            signatures: FxHashMap::default(),
            c_types: FxHashMap::default(),
        }
    }

    /// Memoized [`Type::signature`].
    pub fn signature(&mut self, ty: &Type) -> Option<Rc<Signature>> {
        if let Some(hit) = self.signatures.get(ty) {
            return hit.clone();
        }
        if self.signatures.len() >= self.threshold {
            tracing::trace!(entries = self.signatures.len(), "clearing signature cache");
            self.signatures.clear();
        }
        let sig = ty.signature().map(Rc::new);
        self.signatures.insert(ty.clone(), sig.clone());
        sig
    }

    /// Return type of a function type; `NULL` for non-functions.
    pub fn return_type(&mut self, ty: &Type) -> Type {
        self.signature(ty)
            .map(|sig| sig.ret.clone())
            .unwrap_or_default()
    }

    /// Memoized [`Type::c_type`].
    pub fn c_type(&mut self, ty: &Type) -> Rc<str> {
        if let Some(hit) = self.c_types.get(ty) {
            return Rc::clone(hit);
        }
        if self.c_types.len() >= self.threshold {
            tracing::trace!(entries = self.c_types.len(), "clearing C type cache");
            self.c_types.clear();
        }
        let rendered: Rc<str> = Rc::from(ty.c_type());
        self.c_types.insert(ty.clone(), Rc::clone(&rendered));
        rendered
    }

    /// Total memoized entries across all maps.
    pub fn len(&self) -> usize {
        self.signatures.len() + self.c_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
