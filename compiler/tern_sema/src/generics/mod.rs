//! Generic templates and their instantiation.
//!
//! Templates are stored as captured declaration tokens. Instantiating one
//! substitutes the concrete type tokens for the parameter names and feeds the
//! result back through the sequencer, so an instance is checked exactly like
//! a hand-written declaration.
//!
//! Several templates may share a base name; candidates are tried in
//! registration order and the first one that instantiates cleanly wins.

use rustc_hash::FxHashMap;
use tern_ir::{ProgramNode, Token};
use tern_types::Mangler;

use crate::error::{SemaErrorKind, SemaResult};
use crate::session::Session;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenericKind {
    Function,
    Struct,
    Enum,
}

impl GenericKind {
    pub fn describe(self) -> &'static str {
        match self {
            GenericKind::Function => "function",
            GenericKind::Struct => "struct",
            GenericKind::Enum => "enum",
        }
    }
}

/// A captured template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericInfo {
    pub kind: GenericKind,
    pub generic_param_names: Vec<String>,
    /// Parameter types of a function template, comma separated.
    pub type_vector_pattern: Vec<String>,
    /// The declaration with its `<…>` list removed.
    pub body_tokens: Vec<Token>,
    /// Body-less forward declaration of a function template.
    pub pre_block: Vec<Token>,
    /// Lifecycle function templates attached to a struct/enum template.
    pub post_block: Vec<Token>,
    pub origin_file: String,
    /// Substitutions already materialized.
    pub instances: Vec<Vec<Vec<String>>>,
}

impl GenericInfo {
    pub fn new(kind: GenericKind, generic_param_names: Vec<String>, origin_file: impl Into<String>) -> Self {
        GenericInfo {
            kind,
            generic_param_names,
            type_vector_pattern: Vec::new(),
            body_tokens: Vec::new(),
            pre_block: Vec::new(),
            post_block: Vec::new(),
            origin_file: origin_file.into(),
            instances: Vec::new(),
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, GenericKind::Struct | GenericKind::Enum)
    }

    /// Parameter name → substituted tokens.
    fn substitution_map<'a>(&'a self, substitutions: &'a [Vec<String>]) -> FxHashMap<&'a str, &'a [String]> {
        self.generic_param_names
            .iter()
            .map(String::as_str)
            .zip(substitutions.iter().map(Vec::as_slice))
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct GenericRegistry {
    templates: FxHashMap<String, Vec<GenericInfo>>,
}

impl GenericRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, info: GenericInfo) {
        let name = name.into();
        tracing::debug!(
            name = %name,
            kind = info.kind.describe(),
            params = info.generic_param_names.len(),
            "registered generic"
        );
        self.templates.entry(name).or_default().push(info);
    }

    pub fn get(&self, name: &str) -> Option<&[GenericInfo]> {
        self.templates.get(name).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<GenericInfo>> {
        self.templates.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// The struct/enum template registered under `name`, if any.
    pub fn type_template(&self, name: &str) -> Option<&GenericInfo> {
        self.get(name)?.iter().find(|info| info.is_type())
    }

    pub fn type_template_mut(&mut self, name: &str) -> Option<&mut GenericInfo> {
        self.templates
            .get_mut(name)?
            .iter_mut()
            .find(|info| info.is_type())
    }
}

/// What the instantiation engine needs from the sequencer.
pub trait SequenceService {
    fn session(&mut self) -> &mut Session;

    /// Sequence a run of top-level declarations, detached from any local
    /// scope currently open.
    fn sequence_tokens(&mut self, tokens: &[Token]) -> SemaResult<Vec<ProgramNode>>;
}

/// Lifecycle functions are always instantiated: an overload for another
/// type never stands in for them.
fn is_lifecycle(name: &str) -> bool {
    matches!(name, "New" | "Del" | "Copy")
}

/// Instantiate the template `name` with `substitutions`, one token vector
/// per generic parameter.
///
/// `call_vector` is the argument type vector of a generic function call.
/// Returns the name the instance is declared under: the mangled name for
/// structs and enums, the base name for functions.
#[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
pub fn instantiate<S: SequenceService + ?Sized>(
    service: &mut S,
    name: &str,
    substitutions: &[Vec<String>],
    call_vector: Option<&[String]>,
) -> SemaResult<String> {
    let Some(candidates) = service.session().generics.get(name).map(<[_]>::to_vec) else {
        return Err(service
            .session()
            .error(SemaErrorKind::UnknownGeneric { name: name.to_string() }));
    };

    let mangled = service.session().mangler.mangle_generic(name, substitutions);
    let mut failures = Vec::new();
    let mut tried = false;

    // A call instantiates function templates; a type position instantiates
    // struct and enum templates.
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.is_type() == call_vector.is_some() {
            continue;
        }
        tried = true;
        let label = format!(
            "{} `{name}<{}>`",
            candidate.kind.describe(),
            candidate.generic_param_names.join(", ")
        );
        if candidate.generic_param_names.len() != substitutions.len() {
            failures.push(format!(
                "{label}: expects {} type arguments, found {}",
                candidate.generic_param_names.len(),
                substitutions.len()
            ));
            continue;
        }

        let session = service.session();
        if candidate.is_type() && (session.types.is_registered(&mangled) || session.is_incomplete(&mangled)) {
            return Ok(mangled);
        }
        if let (GenericKind::Function, Some(call)) = (candidate.kind, call_vector) {
            if !is_lifecycle(name) && session.has_overload_for(name, call) {
                tracing::trace!("existing overload satisfies the call");
                return Ok(name.to_string());
            }
            if let Err(reason) = check_type_vec(&session.mangler, call, candidate, substitutions) {
                failures.push(format!("{label}: {reason}"));
                continue;
            }
        }
        if candidate.instances.iter().any(|done| done == substitutions) {
            return Ok(declared_name(candidate, name, &mangled));
        }

        match materialize(service, name, index, candidate, substitutions, &mangled) {
            Ok(()) => return Ok(declared_name(candidate, name, &mangled)),
            Err(err) => {
                tracing::debug!(error = %err, "candidate failed");
                failures.push(format!("{label}: {err}"));
            }
        }
    }

    if !tried {
        return Err(service
            .session()
            .error(SemaErrorKind::UnknownGeneric { name: name.to_string() }));
    }
    Err(service.session().error(SemaErrorKind::GenericsFailed {
        name: name.to_string(),
        failures,
    }))
}

fn declared_name(candidate: &GenericInfo, name: &str, mangled: &str) -> String {
    if candidate.is_type() {
        mangled.to_string()
    } else {
        name.to_string()
    }
}

fn record_instance(session: &mut Session, name: &str, index: usize, substitutions: &[Vec<String>], add: bool) {
    let Some(info) = session.generics.get_mut(name).and_then(|c| c.get_mut(index)) else {
        return;
    };
    if add {
        info.instances.push(substitutions.to_vec());
    } else if let Some(pos) = info.instances.iter().position(|s| s == substitutions) {
        info.instances.remove(pos);
    }
}

fn materialize<S: SequenceService + ?Sized>(
    service: &mut S,
    name: &str,
    index: usize,
    candidate: &GenericInfo,
    substitutions: &[Vec<String>],
    mangled: &str,
) -> SemaResult<()> {
    record_instance(service.session(), name, index, substitutions, true);

    let map = candidate.substitution_map(substitutions);
    let pre = substitute(&candidate.pre_block, &map);
    let mut body = substitute(&candidate.body_tokens, &map);
    let post = substitute(&candidate.post_block, &map);

    if candidate.is_type() {
        if let Some(tok) = body.get_mut(1) {
            tok.text = mangled.to_string();
        }
        service.session().mark_incomplete(mangled);
    }

    let result = sequence_blocks(service, [&pre, &body, &post]);

    if candidate.is_type() {
        service.session().mark_complete(mangled);
    }
    match result {
        Ok(nodes) => {
            tracing::debug!(instance = %mangled, nodes = nodes.len(), "instantiated");
            service.session().push_pending(nodes);
            Ok(())
        }
        Err(err) => {
            record_instance(service.session(), name, index, substitutions, false);
            Err(err)
        }
    }
}

fn sequence_blocks<S: SequenceService + ?Sized>(
    service: &mut S,
    blocks: [&[Token]; 3],
) -> SemaResult<Vec<ProgramNode>> {
    let mut nodes = Vec::new();
    for block in blocks {
        if !block.is_empty() {
            nodes.extend(service.sequence_tokens(block)?);
        }
    }
    Ok(nodes)
}

/// Replace every parameter-name token with its substitution. Inserted
/// tokens keep the position of the token they replace.
pub fn substitute(tokens: &[Token], map: &FxHashMap<&str, &[String]>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for tok in tokens {
        match map.get(tok.text.as_str()) {
            Some(replacement) => out.extend(replacement.iter().map(|text| Token {
                text: text.clone(),
                ..tok.clone()
            })),
            None => out.push(tok.clone()),
        }
    }
    out
}

/// Split a token run at commas outside any bracket pair.
pub fn split_top_level<T: AsRef<str>>(tokens: &[T]) -> Vec<&[T]> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.as_ref() {
            "(" | "[" | "{" | "<" => depth += 1,
            ")" | "]" | "}" | ">" => depth = depth.saturating_sub(1),
            "," if depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

fn leading_pointers(tokens: &[String]) -> usize {
    tokens.iter().take_while(|t| *t == "*").count()
}

/// Check that a function template, substituted, accepts the call's argument
/// types.
///
/// Pointer depth may differ the way overload resolution bridges it: one
/// automatic `&`, any number of automatic `*`.
pub fn check_type_vec(
    mangler: &Mangler,
    call_vector: &[String],
    candidate: &GenericInfo,
    substitutions: &[Vec<String>],
) -> Result<(), String> {
    let map = candidate.substitution_map(substitutions);
    let call_args = split_top_level(call_vector);
    let pattern_args = split_top_level(&candidate.type_vector_pattern);
    if call_args.len() != pattern_args.len() {
        return Err(format!(
            "expects {} arguments, found {}",
            pattern_args.len(),
            call_args.len()
        ));
    }

    for (i, (call, pattern)) in call_args.iter().zip(&pattern_args).enumerate() {
        let expanded: Vec<String> = pattern
            .iter()
            .flat_map(|tok| match map.get(tok.as_str()) {
                Some(sub) => sub.to_vec(),
                None => vec![tok.clone()],
            })
            .collect();

        let (call_depth, pattern_depth) = (leading_pointers(call), leading_pointers(&expanded));
        let (call_rest, pattern_rest) = (&call[call_depth..], &expanded[pattern_depth..]);
        let depth_ok = pattern_depth <= call_depth + 1;
        let base_ok = call_rest == pattern_rest
            || matches!(call_rest, [single] if *single == mangler.mangle_type_tokens(pattern_rest));
        if !depth_ok || !base_ok {
            return Err(format!(
                "argument {} is `{}`, template expects `{}`",
                i + 1,
                call.join(" "),
                expanded.join(" ")
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
