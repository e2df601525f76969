//! Symbol table with overload sets and snapshot-based scoping.
//!
//! Every name maps to an ordered overload set. Entries are only ever appended,
//! except that an autogenerated placeholder is replaced in place by the real
//! definition, and `erase!` hides entries without removing them.
//!
//! Scopes are snapshots: entering a block clones the table, leaving it
//! [`restore`](SymbolTable::restore)s the clone while keeping every function
//! defined in between, and reports the locals that went out of scope.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tern_ir::ProgramNode;
use tern_types::Type;

use crate::prelude::Builtin;

/// Text of the atom that marks an autogenerated function body.
pub const AUTOGEN_SENTINEL: &str = "/* autogenerated */\n";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Variable,
    Builtin(Builtin),
}

/// One entry of an overload set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiTableSymbol {
    /// Function definition; `None` for variables, builtins and forward
    /// declarations.
    pub body: Option<Rc<ProgramNode>>,
    pub ty: Type,
    pub erased: bool,
    pub source_file: String,
    pub kind: SymbolKind,
}

impl MultiTableSymbol {
    pub fn variable(ty: Type, source_file: impl Into<String>) -> Self {
        MultiTableSymbol {
            body: None,
            ty,
            erased: false,
            source_file: source_file.into(),
            kind: SymbolKind::Variable,
        }
    }

    pub fn function(ty: Type, body: Option<ProgramNode>, source_file: impl Into<String>) -> Self {
        MultiTableSymbol {
            body: body.map(Rc::new),
            ty,
            erased: false,
            source_file: source_file.into(),
            kind: SymbolKind::Function,
        }
    }

    /// Functions and builtins are callable and survive scope restore.
    pub fn is_callable(&self) -> bool {
        !matches!(self.kind, SymbolKind::Variable)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable)
    }

    /// A forward declaration or an autogenerated definition: something a
    /// real definition may replace.
    pub fn is_placeholder(&self) -> bool {
        self.kind == SymbolKind::Function
            && self.body.as_deref().is_none_or(is_autogenerated)
    }
}

/// Whether a function node's body starts with [`AUTOGEN_SENTINEL`].
pub fn is_autogenerated(node: &ProgramNode) -> bool {
    node.children()
        .iter()
        .find(|child| child.is_scope())
        .and_then(|scope| scope.children().first())
        .and_then(ProgramNode::text)
        == Some(AUTOGEN_SENTINEL)
}

/// Result of [`SymbolTable::define_function`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Defined {
    /// New overload appended.
    Inserted,
    /// A placeholder was replaced in place.
    Replaced,
    /// A forward declaration for an already-defined overload; nothing changed.
    AlreadyDefined,
}

/// A second definition of an overload that already has one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Redefinition;

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: FxHashMap<String, Vec<MultiTableSymbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to `name`'s overload set.
    pub fn insert(&mut self, name: &str, symbol: MultiTableSymbol) {
        self.entries.entry(name.to_string()).or_default().push(symbol);
    }

    pub fn get(&self, name: &str) -> Option<&[MultiTableSymbol]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<MultiTableSymbol>> {
        self.entries.get_mut(name)
    }

    /// Callable entries of `name`, in declaration order, erased ones included.
    pub fn overloads(&self, name: &str) -> impl Iterator<Item = &MultiTableSymbol> {
        self.get(name)
            .unwrap_or(&[])
            .iter()
            .filter(|s| s.is_callable())
    }

    /// The innermost visible variable named `name`.
    pub fn lookup_variable(&self, name: &str) -> Option<&MultiTableSymbol> {
        self.get(name)?
            .iter()
            .rev()
            .find(|s| s.is_variable() && !s.erased)
    }

    /// Mark every entry of `name` erased. Returns whether any existed.
    pub fn erase(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entries) if !entries.is_empty() => {
                for entry in entries {
                    entry.erased = true;
                }
                true
            }
            _ => false,
        }
    }

    /// The function overload of `name` whose type equals `ty` ignoring
    /// parameter names.
    pub fn find_function(&self, name: &str, ty: &Type) -> Option<&MultiTableSymbol> {
        self.overloads(name)
            .find(|s| s.kind == SymbolKind::Function && s.ty.eq_ignoring_params(ty))
    }

    /// Define a function overload, replacing a placeholder with the same
    /// type if there is one.
    pub fn define_function(
        &mut self,
        name: &str,
        symbol: MultiTableSymbol,
    ) -> Result<Defined, Redefinition> {
        let overloads = self.entries.entry(name.to_string()).or_default();
        let existing = overloads
            .iter_mut()
            .find(|s| s.kind == SymbolKind::Function && s.ty.eq_ignoring_params(&symbol.ty));

        match existing {
            None => {
                overloads.push(symbol);
                Ok(Defined::Inserted)
            }
            Some(slot) if slot.is_placeholder() => {
                let erased = slot.erased;
                *slot = symbol;
                slot.erased |= erased;
                Ok(Defined::Replaced)
            }
            Some(_) if symbol.is_placeholder() => Ok(Defined::AlreadyDefined),
            Some(_) => Err(Redefinition),
        }
    }

    /// Full copy for later [`restore`](SymbolTable::restore).
    pub fn snapshot(&self) -> SymbolTable {
        self.clone()
    }

    /// Pull in callable entries of `other` that this table lacks, upgrading
    /// placeholders that `other` has since defined.
    pub fn absorb_functions(&mut self, other: &SymbolTable) {
        for (name, entries) in &other.entries {
            for symbol in entries.iter().filter(|s| s.is_callable()) {
                let overloads = self.entries.entry(name.clone()).or_default();
                let existing = overloads
                    .iter_mut()
                    .find(|s| s.kind == symbol.kind && s.ty.eq_ignoring_params(&symbol.ty));
                match existing {
                    None => overloads.push(symbol.clone()),
                    Some(slot) => {
                        if slot.is_placeholder() && !symbol.is_placeholder() {
                            slot.body.clone_from(&symbol.body);
                        }
                        slot.erased |= symbol.erased;
                    }
                }
            }
        }
    }

    /// Reset to `snapshot`, keeping every callable entry defined since and
    /// the erasure of every variable the snapshot still holds.
    ///
    /// Returns the variables present now but not in the snapshot, counted per
    /// name and type, sorted by name.
    pub fn restore(&mut self, mut snapshot: SymbolTable) -> Vec<(String, Type)> {
        let mut out_of_scope = Vec::new();
        let mut erased = Vec::new();
        for (name, live) in &self.entries {
            let mut remaining: Vec<(usize, &Type)> = snapshot
                .get(name)
                .unwrap_or(&[])
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_variable())
                .map(|(i, s)| (i, &s.ty))
                .collect();
            for symbol in live.iter().filter(|s| s.is_variable()) {
                match remaining.iter().position(|(_, ty)| **ty == symbol.ty) {
                    Some(i) => {
                        let (index, _) = remaining.remove(i);
                        if symbol.erased {
                            erased.push((name.clone(), index));
                        }
                    }
                    None => out_of_scope.push((name.clone(), symbol.ty.clone())),
                }
            }
        }
        out_of_scope.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, index) in erased {
            if let Some(entry) = snapshot.entries.get_mut(&name).and_then(|e| e.get_mut(index)) {
                entry.erased = true;
            }
        }

        let live = std::mem::replace(self, snapshot);
        self.absorb_functions(&live);
        out_of_scope
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
