//! Overload resolution.
//!
//! Picks one overload for a call from its argument types in three ordered
//! stages, stopping at the first stage with a usable result:
//!
//! 1. **Exact**: every argument equals its parameter (ignoring parameter
//!    names). More than one visible exact match is ambiguous.
//! 2. **Casting**: every argument is equal or converts within its numeric
//!    family. Fewest conversions wins, then fewest narrowing conversions,
//!    then declaration order.
//! 3. **Reference**: argument and parameter agree after stripping pointers.
//!    The pointer-depth difference is bridged with `&` (at most one level) or
//!    `*`. Lowest total depth change wins.
//!
//! Erased candidates take part in matching but are dropped before a winner
//! is chosen, so a call that only matches erased overloads fails with the
//! erasure listed as the reason.

use smallvec::SmallVec;
use tern_types::Type;

/// One overload as seen by the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverloadCandidate {
    pub params: Vec<Type>,
    pub erased: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Exact,
    Casting,
    Reference,
}

/// How one argument must be adjusted to fit its parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgAdjust {
    None,
    /// Numeric conversion to the parameter type.
    Cast(Type),
    /// Automatic `&`.
    Ref,
    /// Automatic `*`, this many levels.
    Deref(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Index into the candidate list.
    pub index: usize,
    pub stage: Stage,
    pub adjustments: SmallVec<[ArgAdjust; 4]>,
}

/// Why a candidate was not chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    ArityMismatch { expected: usize, found: usize },
    Erased,
    /// Zero-based index of the first argument no stage could fit.
    TypeMismatch { index: usize },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::ArityMismatch { expected, found } => {
                write!(f, "arity mismatch (expected {expected}, found {found})")
            }
            Rejection::Erased => f.write_str("erased"),
            Rejection::TypeMismatch { index } => {
                write!(f, "type mismatch at argument {}", index + 1)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverloadError {
    /// Several visible exact matches.
    Ambiguous(Vec<usize>),
    /// The only reference-stage fits need `&&`.
    MultipleAutoRef,
    /// Nothing fits; one entry per candidate.
    NoMatch(Vec<(usize, Rejection)>),
}

/// Resolve a call with `args` against `candidates`.
#[tracing::instrument(level = "trace", skip_all, fields(candidates = candidates.len(), args = args.len()))]
pub fn resolve(
    candidates: &[OverloadCandidate],
    args: &[Type],
) -> Result<Resolution, OverloadError> {
    let arity_ok: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.params.len() == args.len())
        .map(|(i, _)| i)
        .collect();

    if let Some(resolution) = exact_stage(candidates, &arity_ok, args)? {
        return Ok(resolution);
    }
    if let Some(resolution) = casting_stage(candidates, &arity_ok, args) {
        return Ok(resolution);
    }
    reference_stage(candidates, &arity_ok, args)
}

fn exact_stage(
    candidates: &[OverloadCandidate],
    arity_ok: &[usize],
    args: &[Type],
) -> Result<Option<Resolution>, OverloadError> {
    let visible: Vec<usize> = arity_ok
        .iter()
        .copied()
        .filter(|&i| {
            candidates[i]
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| param.eq_ignoring_params(arg))
        })
        .filter(|&i| !candidates[i].erased)
        .collect();

    match visible.as_slice() {
        [] => Ok(None),
        [index] => {
            tracing::trace!(index, "exact match");
            Ok(Some(Resolution {
                index: *index,
                stage: Stage::Exact,
                adjustments: args.iter().map(|_| ArgAdjust::None).collect(),
            }))
        }
        _ => Err(OverloadError::Ambiguous(visible)),
    }
}

/// A conversion inside the integer or float family.
fn converts_within_family(arg: &Type, param: &Type) -> bool {
    match (arg.primitive(), param.primitive()) {
        (Some(a), Some(p)) => {
            (a.is_integer() && p.is_integer()) || (a.is_float() && p.is_float())
        }
        _ => false,
    }
}

fn narrows(arg: &Type, param: &Type) -> bool {
    match (arg.primitive(), param.primitive()) {
        (Some(a), Some(p)) => a.narrows_to(p),
        _ => false,
    }
}

fn casting_stage(
    candidates: &[OverloadCandidate],
    arity_ok: &[usize],
    args: &[Type],
) -> Option<Resolution> {
    let mut best: Option<((usize, usize, usize), SmallVec<[ArgAdjust; 4]>)> = None;

    for &i in arity_ok {
        let candidate = &candidates[i];
        if candidate.erased {
            continue;
        }
        let mut cost = 0usize;
        let mut narrowing = 0usize;
        let mut adjustments = SmallVec::new();
        let fits = candidate.params.iter().zip(args).all(|(param, arg)| {
            if param.eq_ignoring_params(arg) {
                adjustments.push(ArgAdjust::None);
                true
            } else if converts_within_family(arg, param) {
                cost += 1;
                narrowing += usize::from(narrows(arg, param));
                adjustments.push(ArgAdjust::Cast(param.clone()));
                true
            } else {
                false
            }
        });
        if !fits {
            continue;
        }
        let key = (cost, narrowing, i);
        if best.as_ref().is_none_or(|(best_key, _)| key < *best_key) {
            best = Some((key, adjustments));
        }
    }

    best.map(|((cost, _, index), adjustments)| {
        tracing::trace!(index, cost, "casting match");
        Resolution {
            index,
            stage: Stage::Casting,
            adjustments,
        }
    })
}

enum RefFit {
    Fits { cost: usize, adjustments: SmallVec<[ArgAdjust; 4]> },
    /// Needs more than one automatic `&`.
    MultiRef,
    /// First argument that does not fit.
    Mismatch(usize),
}

fn reference_fit(params: &[Type], args: &[Type]) -> RefFit {
    let mut cost = 0usize;
    let mut adjustments = SmallVec::new();
    let mut multi_ref = false;

    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        let (param_depth, arg_depth) = (param.pointer_depth(), arg.pointer_depth());
        let (param_base, arg_base) = (param.strip_pointers(), arg.strip_pointers());

        if !param_base.eq_ignoring_params(&arg_base) {
            // Same-depth value conversions are allowed here too, so
            // `Copy(wide, 5)` fits `Copy(*i64, i64)`.
            if param_depth == 0 && arg_depth == 0 && converts_within_family(arg, param) {
                cost += 1;
                adjustments.push(ArgAdjust::Cast(param.clone()));
                continue;
            }
            return RefFit::Mismatch(index);
        }

        match arg_depth.cmp(&param_depth) {
            std::cmp::Ordering::Equal => adjustments.push(ArgAdjust::None),
            std::cmp::Ordering::Less if param_depth - arg_depth == 1 => {
                cost += 1;
                adjustments.push(ArgAdjust::Ref);
            }
            std::cmp::Ordering::Less => {
                multi_ref = true;
                adjustments.push(ArgAdjust::None);
            }
            std::cmp::Ordering::Greater => {
                let levels = arg_depth - param_depth;
                cost += levels;
                adjustments.push(ArgAdjust::Deref(levels));
            }
        }
    }

    if multi_ref {
        RefFit::MultiRef
    } else {
        RefFit::Fits { cost, adjustments }
    }
}

fn reference_stage(
    candidates: &[OverloadCandidate],
    arity_ok: &[usize],
    args: &[Type],
) -> Result<Resolution, OverloadError> {
    let mut best: Option<(usize, usize, SmallVec<[ArgAdjust; 4]>)> = None;
    let mut saw_multi_ref = false;
    let mut rejections = Vec::with_capacity(candidates.len());

    for (i, candidate) in candidates.iter().enumerate() {
        if !arity_ok.contains(&i) {
            rejections.push((
                i,
                Rejection::ArityMismatch {
                    expected: candidate.params.len(),
                    found: args.len(),
                },
            ));
            continue;
        }
        match reference_fit(&candidate.params, args) {
            RefFit::Fits { .. } | RefFit::MultiRef if candidate.erased => {
                rejections.push((i, Rejection::Erased));
            }
            RefFit::Fits { cost, adjustments } => {
                if best.as_ref().is_none_or(|(best_cost, _, _)| cost < *best_cost) {
                    best = Some((cost, i, adjustments));
                }
            }
            RefFit::MultiRef => saw_multi_ref = true,
            RefFit::Mismatch(index) => {
                // Exact and casting fits are found before this stage, so an
                // erased one surfaces here as erased rather than mismatched.
                let rejection = if candidate.erased && exact_or_cast_fit(&candidate.params, args) {
                    Rejection::Erased
                } else {
                    Rejection::TypeMismatch { index }
                };
                rejections.push((i, rejection));
            }
        }
    }

    match best {
        Some((cost, index, adjustments)) => {
            tracing::trace!(index, cost, "reference match");
            Ok(Resolution {
                index,
                stage: Stage::Reference,
                adjustments,
            })
        }
        None if saw_multi_ref => Err(OverloadError::MultipleAutoRef),
        None => Err(OverloadError::NoMatch(rejections)),
    }
}

fn exact_or_cast_fit(params: &[Type], args: &[Type]) -> bool {
    params
        .iter()
        .zip(args)
        .all(|(param, arg)| param.eq_ignoring_params(arg) || converts_within_family(arg, param))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
