use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn ptr(inner: Type) -> Type {
    inner.address_of()
}

fn add_sig() -> Type {
    Type::function(
        &[
            Param::named("a", Type::atomic("i32")),
            Param::named("b", ptr(Type::atomic("u8"))),
        ],
        &Type::atomic("i64"),
    )
}

#[test]
fn default_is_null() {
    let ty = Type::default();
    assert!(ty.is_null());
    assert_eq!(ty.nodes(), &[TypeNode::Atomic(NULL_NAME.to_string())]);
    assert_eq!(ty.atomic_name(), None);
}

#[test]
fn push_onto_null_replaces_sentinel() {
    let mut ty = Type::null();
    ty.push_back(TypeNode::Pointer);
    ty.push_back(TypeNode::Atomic("i32".into()));
    assert_eq!(
        ty.nodes(),
        &[TypeNode::Pointer, TypeNode::Atomic("i32".into())]
    );

    let mut front = Type::null();
    front.push_front(TypeNode::Atomic("u8".into()));
    front.push_front(TypeNode::UnsizedArray);
    assert_eq!(front.to_string(), "[]u8");
}

#[test]
fn popping_last_node_restores_null() {
    let mut ty = ptr(Type::atomic("i32"));
    assert_eq!(ty.pop_front(), Some(TypeNode::Pointer));
    assert_eq!(ty.pop_back(), Some(TypeNode::Atomic("i32".into())));
    assert!(ty.is_null());
    assert_eq!(ty.pop_back(), None);
}

#[test]
fn append_splices_and_ignores_null() {
    let mut ty = Type::from_nodes([TypeNode::SizedArray("4".into())]);
    ty.append(&Type::atomic("u8"));
    assert_eq!(ty.to_string(), "[4]u8");

    let before = ty.clone();
    ty.append(&Type::null());
    assert_eq!(ty, before);
}

#[test]
fn pointer_queries() {
    let ty = ptr(ptr(Type::atomic("Node")));
    assert!(ty.is_pointer());
    assert!(!ty.is_array());
    assert_eq!(ty.pointer_depth(), 2);
    assert_eq!(ty.strip_pointers(), Type::atomic("Node"));
    assert_eq!(ty.deref(), Some(ptr(Type::atomic("Node"))));
    assert_eq!(Type::atomic("Node").deref(), None);
}

#[test]
fn array_element() {
    let ty = Type::from_nodes([TypeNode::UnsizedArray, TypeNode::Atomic("i32".into())]);
    assert!(ty.is_array());
    assert_eq!(ty.element(), Some(Type::atomic("i32")));
    assert!(ty.is_trivial());
}

#[test]
fn triviality() {
    assert!(Type::atomic("i32").is_trivial());
    assert!(Type::null().is_trivial());
    assert!(ptr(Type::atomic("Point")).is_trivial());
    assert!(!Type::atomic("Point").is_trivial());
}

#[test]
fn function_display() {
    assert_eq!(add_sig().to_string(), "fn(a: i32, b: *u8): i64");
    let no_ret = Type::function(&[], &Type::null());
    assert_eq!(no_ret.to_string(), "fn()");
}

#[test]
fn function_nodes_are_prefix_ordered() {
    assert_eq!(
        add_sig().nodes(),
        &[
            TypeNode::FunctionStart,
            TypeNode::ParamName("a".into()),
            TypeNode::Atomic("i32".into()),
            TypeNode::Join,
            TypeNode::ParamName("b".into()),
            TypeNode::Pointer,
            TypeNode::Atomic("u8".into()),
            TypeNode::ReturnMarker,
            TypeNode::Atomic("i64".into()),
        ]
    );
}

#[test]
fn signature_reads_back_params_and_return() {
    let sig = add_sig().signature().expect("function type");
    assert_eq!(sig.arity(), 2);
    assert_eq!(sig.params[0].name.as_deref(), Some("a"));
    assert_eq!(sig.params[1].ty, ptr(Type::atomic("u8")));
    assert_eq!(sig.ret, Type::atomic("i64"));
}

#[test]
fn signature_without_return_is_null() {
    let ty = Type::function(&[Param::named("x", Type::atomic("f64"))], &Type::null());
    let sig = ty.signature().expect("function type");
    assert!(sig.ret.is_null());
    assert_eq!(sig.arity(), 1);
}

#[test]
fn signature_of_non_function_is_none() {
    assert_eq!(Type::atomic("i32").signature(), None);
    let truncated = Type::from_nodes([TypeNode::FunctionStart, TypeNode::Atomic("i32".into())]);
    assert_eq!(truncated.signature(), None);
}

#[test]
fn equality_ignoring_param_names() {
    let a = Type::function(&[Param::named("x", Type::atomic("i32"))], &Type::null());
    let b = Type::function(&[Param::named("y", Type::atomic("i32"))], &Type::null());
    assert_ne!(a, b);
    assert!(a.eq_ignoring_params(&b));
    assert_eq!(a.without_params(), b.without_params());
}

#[test]
fn tokens_spell_the_type() {
    let ty = Type::from_nodes([
        TypeNode::Pointer,
        TypeNode::SizedArray("4".into()),
        TypeNode::Atomic("u8".into()),
    ]);
    assert_eq!(ty.to_tokens(), vec!["*", "[", "4", "]", "u8"]);
    assert_eq!(
        type_vector(&[Type::atomic("i32"), ptr(Type::atomic("f64"))]),
        vec!["i32", ",", "*", "f64"]
    );
}

fn arb_leaf() -> impl Strategy<Value = TypeNode> {
    prop_oneof![
        Just(TypeNode::Atomic("i32".into())),
        Just(TypeNode::Atomic("u8".into())),
        Just(TypeNode::Atomic("Point".into())),
    ]
}

fn arb_type() -> impl Strategy<Value = Type> {
    (
        prop::collection::vec(
            prop_oneof![
                Just(TypeNode::Pointer),
                Just(TypeNode::UnsizedArray),
                Just(TypeNode::SizedArray("8".into())),
            ],
            0..4,
        ),
        arb_leaf(),
    )
        .prop_map(|(mut prefix, leaf)| {
            prefix.push(leaf);
            Type::from_nodes(prefix)
        })
}

proptest! {
    #[test]
    fn address_of_then_deref_is_identity(ty in arb_type()) {
        prop_assert_eq!(ty.address_of().deref(), Some(ty.clone()));
        prop_assert_eq!(ty.address_of().pointer_depth(), ty.pointer_depth() + 1);
    }

    #[test]
    fn mutation_changes_identity(ty in arb_type()) {
        let mut grown = ty.clone();
        grown.push_front(TypeNode::Pointer);
        prop_assert_ne!(grown, ty);
    }

    #[test]
    fn equality_is_structural(ty in arb_type()) {
        let rebuilt = Type::from_nodes(ty.nodes().iter().cloned());
        prop_assert_eq!(&rebuilt, &ty);
        prop_assert!(rebuilt.eq_ignoring_params(&ty));
    }
}
