//! Compilation-session context.
//!
//! One `Session` owns every table a compilation unit mutates: symbols, type
//! layouts, generic templates, derived caches and collected warnings. It is
//! threaded explicitly through the sequencer and the instantiation engine.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tern_diagnostic::{Diagnostic, Diagnostics, ErrorCode, SourceLocation};
use tern_ir::{ProgramNode, Token};
use tern_types::{type_vector, DerivedCache, Mangler, Type};

use crate::config::SessionConfig;
use crate::error::{SemaError, SemaErrorKind, SemaResult};
use crate::generics::GenericRegistry;
use crate::overload::{self, ArgAdjust, OverloadCandidate, OverloadError};
use crate::prelude::{self, Builtin};
use crate::registry::TypeRegistry;
use crate::symbols::{SymbolKind, SymbolTable};

/// Where a resolved call goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Callee {
    /// A user or generated function, by C symbol.
    Function(String),
    Builtin(Builtin),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCall {
    pub callee: Callee,
    pub ret: Type,
    pub adjustments: SmallVec<[ArgAdjust; 4]>,
}

pub struct Session {
    pub config: SessionConfig,
    pub table: SymbolTable,
    pub types: TypeRegistry,
    pub generics: GenericRegistry,
    pub cache: DerivedCache,
    pub mangler: Mangler,
    pub diagnostics: Diagnostics,
    location: SourceLocation,
    /// Instances materialized since the last top-level declaration.
    pending: Vec<ProgramNode>,
    /// Structs/enums whose declaration is in progress.
    incomplete: FxHashSet<String>,
    /// Autogenerated lifecycle functions, by name and type.
    autogen: Vec<(String, Type)>,
    checked_files: FxHashSet<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let mut table = SymbolTable::new();
        prelude::register(&mut table);
        Session {
            cache: DerivedCache::new(config.cache_threshold),
            mangler: Mangler::with_entry_point(&config.entry_point),
            config,
            table,
            types: TypeRegistry::new(),
            generics: GenericRegistry::new(),
            diagnostics: Diagnostics::new(),
            location: SourceLocation::new(prelude::PRELUDE_FILE, 0, 0),
            pending: Vec::new(),
            incomplete: FxHashSet::default(),
            autogen: Vec::new(),
            checked_files: FxHashSet::default(),
        }
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn set_location(&mut self, location: SourceLocation) {
        self.location = location;
    }

    /// Advance the current location to `tok`, checking its file name the
    /// first time that file is seen.
    pub fn track(&mut self, tok: &Token) {
        self.location = SourceLocation::new(tok.file.as_ref(), tok.line, tok.column);
        if self.config.enforce_file_naming && !self.checked_files.contains(tok.file.as_ref()) {
            self.checked_files.insert(tok.file.to_string());
            if !is_conventional_file_name(&tok.file) {
                self.warn(
                    ErrorCode::W0004,
                    format!("file `{}` should be snake_case with a `.tn` extension", tok.file),
                );
            }
        }
    }

    /// A fatal error at the current location.
    pub fn error(&self, kind: SemaErrorKind) -> SemaError {
        SemaError::new(kind, self.location.clone())
    }

    pub fn warn(&mut self, code: ErrorCode, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(code = %code, location = %self.location, "{message}");
        self.diagnostics.push(
            Diagnostic::warning(code)
                .with_message(message)
                .at(self.location.clone()),
        );
    }

    pub fn note(&mut self, code: ErrorCode, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(code = %code, location = %self.location, "{message}");
        self.diagnostics.push(
            Diagnostic::note(code)
                .with_message(message)
                .at(self.location.clone()),
        );
    }

    pub fn push_pending(&mut self, nodes: Vec<ProgramNode>) {
        self.pending.extend(nodes);
    }

    pub fn take_pending(&mut self) -> Vec<ProgramNode> {
        std::mem::take(&mut self.pending)
    }

    pub fn mark_incomplete(&mut self, name: &str) {
        self.incomplete.insert(name.to_string());
    }

    pub fn mark_complete(&mut self, name: &str) {
        self.incomplete.remove(name);
    }

    pub fn is_incomplete(&self, name: &str) -> bool {
        self.incomplete.contains(name)
    }

    /// Primitives, visible structs/enums, and types being declared.
    pub fn is_known_type(&self, name: &str) -> bool {
        self.types.is_known_type(name) || self.is_incomplete(name)
    }

    pub fn record_autogen(&mut self, name: &str, ty: Type) {
        self.autogen.push((name.to_string(), ty));
    }

    /// Autogenerated function definitions no user definition replaced, in
    /// registration order.
    pub fn autogen_bodies(&self) -> Vec<ProgramNode> {
        self.autogen
            .iter()
            .filter_map(|(name, ty)| self.table.find_function(name, ty))
            .filter(|symbol| symbol.is_placeholder())
            .filter_map(|symbol| symbol.body.as_deref().cloned())
            .collect()
    }

    /// Whether a visible function overload of `name` takes arguments whose
    /// type vector is a prefix of `call`.
    pub fn has_overload_for(&self, name: &str, call: &[String]) -> bool {
        self.table
            .overloads(name)
            .filter(|s| s.kind == SymbolKind::Function && !s.erased)
            .filter_map(|s| s.ty.signature())
            .any(|sig| {
                let params: Vec<Type> = sig.param_types().cloned().collect();
                let vector = type_vector(&params);
                (!vector.is_empty() || call.is_empty()) && call.starts_with(&vector)
            })
    }

    /// Pick the overload of `name` for `args`.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name, args = args.len()))]
    pub fn resolve_call(&mut self, name: &str, args: &[Type]) -> SemaResult<ResolvedCall> {
        let overloads: Vec<(Type, SymbolKind, bool)> = self
            .table
            .overloads(name)
            .map(|s| (s.ty.clone(), s.kind, s.erased))
            .collect();
        if overloads.is_empty() {
            return Err(self.error(SemaErrorKind::UnknownSymbol {
                name: name.to_string(),
            }));
        }

        let mut candidates = Vec::with_capacity(overloads.len());
        let mut returns = Vec::with_capacity(overloads.len());
        for (ty, _, erased) in &overloads {
            let sig = self.cache.signature(ty);
            candidates.push(OverloadCandidate {
                params: sig
                    .as_deref()
                    .map(|sig| sig.param_types().cloned().collect())
                    .unwrap_or_default(),
                erased: *erased,
            });
            returns.push(sig.map(|sig| sig.ret.clone()).unwrap_or_default());
        }

        match overload::resolve(&candidates, args) {
            Ok(resolution) => {
                let (ty, kind, _) = &overloads[resolution.index];
                let callee = match kind {
                    SymbolKind::Builtin(builtin) => Callee::Builtin(*builtin),
                    _ => Callee::Function(self.mangler.mangle_function(name, ty)),
                };
                tracing::trace!(stage = ?resolution.stage, callee = ?callee, "resolved");
                Ok(ResolvedCall {
                    callee,
                    ret: returns[resolution.index].clone(),
                    adjustments: resolution.adjustments,
                })
            }
            Err(OverloadError::Ambiguous(indices)) => Err(self.error(SemaErrorKind::AmbiguousCall {
                name: name.to_string(),
                candidates: indices
                    .into_iter()
                    .map(|i| format!("`{}`", overloads[i].0))
                    .collect(),
            })),
            Err(OverloadError::MultipleAutoRef) => Err(self.error(SemaErrorKind::MultipleAutoRef {
                name: name.to_string(),
            })),
            Err(OverloadError::NoMatch(rejections)) => {
                Err(self.error(SemaErrorKind::NoMatchingOverload {
                    name: name.to_string(),
                    args: args
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                    rejections: rejections
                        .into_iter()
                        .map(|(i, why)| format!("`{}`: {why}", overloads[i].0))
                        .collect(),
                }))
            }
        }
    }

    /// C text of a resolved call over already-rendered argument texts.
    pub fn emit_call(&mut self, call: &ResolvedCall, args: Vec<String>) -> String {
        let args: Vec<String> = args
            .into_iter()
            .zip(&call.adjustments)
            .map(|(text, adjust)| match adjust {
                ArgAdjust::None => text,
                ArgAdjust::Cast(ty) => format!("(({})({text}))", self.cache.c_type(ty)),
                ArgAdjust::Ref => format!("&{text}"),
                ArgAdjust::Deref(levels) => format!("({}{text})", "*".repeat(*levels)),
            })
            .collect();
        match &call.callee {
            Callee::Function(symbol) => format!("{symbol}({})", args.join(", ")),
            Callee::Builtin(builtin) => builtin.emit(&args),
        }
    }
}

/// `snake_case.tn`, judged on the base name.
fn is_conventional_file_name(path: &str) -> bool {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let Some(stem) = base.strip_suffix(".tn") else {
        return false;
    };
    !stem.is_empty()
        && stem
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
