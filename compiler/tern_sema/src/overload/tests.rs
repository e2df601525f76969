use super::*;
use pretty_assertions::assert_eq;
use tern_types::Primitive;

fn candidate(params: &[Type]) -> OverloadCandidate {
    OverloadCandidate {
        params: params.to_vec(),
        erased: false,
    }
}

fn erased(params: &[Type]) -> OverloadCandidate {
    OverloadCandidate {
        params: params.to_vec(),
        erased: true,
    }
}

fn i32_ty() -> Type {
    Primitive::I32.ty()
}

fn i64_ty() -> Type {
    Primitive::I64.ty()
}

fn point() -> Type {
    Type::atomic("Point")
}

#[test]
fn exact_match_wins_over_casting() {
    let candidates = [candidate(&[i64_ty()]), candidate(&[i32_ty()])];
    let resolution = resolve(&candidates, &[i32_ty()]).unwrap();
    assert_eq!(resolution.index, 1);
    assert_eq!(resolution.stage, Stage::Exact);
    assert_eq!(resolution.adjustments.as_slice(), &[ArgAdjust::None]);
}

#[test]
fn two_exact_matches_are_ambiguous() {
    let candidates = [candidate(&[i32_ty()]), candidate(&[i32_ty()])];
    assert_eq!(
        resolve(&candidates, &[i32_ty()]),
        Err(OverloadError::Ambiguous(vec![0, 1]))
    );
}

#[test]
fn erased_exact_match_is_not_ambiguous() {
    let candidates = [erased(&[i32_ty()]), candidate(&[i32_ty()])];
    assert_eq!(resolve(&candidates, &[i32_ty()]).unwrap().index, 1);
}

#[test]
fn casting_prefers_fewer_conversions() {
    let candidates = [
        candidate(&[i64_ty(), i64_ty()]),
        candidate(&[i64_ty(), i32_ty()]),
    ];
    let resolution = resolve(&candidates, &[i32_ty(), i32_ty()]).unwrap();
    assert_eq!(resolution.index, 1);
    assert_eq!(resolution.stage, Stage::Casting);
    assert_eq!(
        resolution.adjustments.as_slice(),
        &[ArgAdjust::Cast(i64_ty()), ArgAdjust::None]
    );
}

#[test]
fn casting_ties_prefer_widening() {
    let candidates = [candidate(&[Primitive::I8.ty()]), candidate(&[i64_ty()])];
    let resolution = resolve(&candidates, &[i32_ty()]).unwrap();
    assert_eq!(resolution.index, 1);
}

#[test]
fn casting_ties_fall_back_to_declaration_order() {
    let candidates = [candidate(&[i64_ty()]), candidate(&[i64_ty()])];
    assert_eq!(resolve(&candidates, &[i32_ty()]).unwrap().index, 0);
}

#[test]
fn casting_never_crosses_families() {
    let candidates = [candidate(&[Primitive::F64.ty()])];
    assert_eq!(
        resolve(&candidates, &[i32_ty()]),
        Err(OverloadError::NoMatch(vec![(0, Rejection::TypeMismatch { index: 0 })]))
    );
}

#[test]
fn reference_stage_auto_refs_one_level() {
    let candidates = [candidate(&[point().address_of()])];
    let resolution = resolve(&candidates, &[point()]).unwrap();
    assert_eq!(resolution.stage, Stage::Reference);
    assert_eq!(resolution.adjustments.as_slice(), &[ArgAdjust::Ref]);
}

#[test]
fn reference_stage_auto_derefs_many_levels() {
    let candidates = [candidate(&[point()])];
    let arg = point().address_of().address_of();
    let resolution = resolve(&candidates, &[arg]).unwrap();
    assert_eq!(resolution.adjustments.as_slice(), &[ArgAdjust::Deref(2)]);
}

#[test]
fn reference_stage_prefers_smallest_depth_change() {
    let candidates = [
        candidate(&[point().address_of()]),
        candidate(&[point().address_of().address_of()]),
    ];
    let arg = point().address_of().address_of().address_of();
    assert_eq!(resolve(&candidates, &[arg]).unwrap().index, 1);
}

#[test]
fn double_auto_ref_is_reported() {
    let candidates = [candidate(&[point().address_of().address_of()])];
    assert_eq!(
        resolve(&candidates, &[point()]),
        Err(OverloadError::MultipleAutoRef)
    );
}

#[test]
fn assignment_into_wider_variable_combines_ref_and_cast() {
    let candidates = [candidate(&[i64_ty().address_of(), i64_ty()])];
    let resolution = resolve(&candidates, &[i64_ty(), i32_ty()]).unwrap();
    assert_eq!(
        resolution.adjustments.as_slice(),
        &[ArgAdjust::Ref, ArgAdjust::Cast(i64_ty())]
    );
}

#[test]
fn failures_list_every_candidate() {
    let candidates = [
        candidate(&[i32_ty(), i32_ty()]),
        erased(&[Primitive::Str.ty()]),
        candidate(&[Primitive::Bool.ty()]),
    ];
    let Err(OverloadError::NoMatch(rejections)) = resolve(&candidates, &[Primitive::Str.ty()])
    else {
        panic!("expected no match");
    };
    assert_eq!(
        rejections,
        vec![
            (0, Rejection::ArityMismatch { expected: 2, found: 1 }),
            (1, Rejection::Erased),
            (2, Rejection::TypeMismatch { index: 0 }),
        ]
    );
    assert_eq!(rejections[2].1.to_string(), "type mismatch at argument 1");
}

#[test]
fn stage_order_is_deterministic() {
    // a cast and a reference fit exist; casting comes first
    let candidates = [
        candidate(&[i32_ty().address_of()]),
        candidate(&[Primitive::I16.ty()]),
    ];
    let first = resolve(&candidates, &[i32_ty()]).unwrap();
    let second = resolve(&candidates, &[i32_ty()]).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.stage, Stage::Casting);
    assert_eq!(first.index, 1);
}
