//! Structural type representation.
//!
//! Types are plain values: equality and hashing are structural, and every
//! mutating operation leaves a value that compares (and hashes) differently
//! from the one it started as. Caches keyed by `Type` therefore never need
//! invalidation.

use std::fmt;

use smallvec::SmallVec;

use crate::Primitive;

/// Name of the sentinel atomic used for "no type".
pub const NULL_NAME: &str = "NULL";

/// One node of a [`Type`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// Pointer to whatever follows.
    Pointer,
    /// A named type: a primitive, a struct, an enum, or a mangled instance.
    Atomic(String),
    /// `[]T`, represented as a pointer in emitted code.
    UnsizedArray,
    /// `[N]T` with its bound expression kept verbatim.
    SizedArray(String),
    /// Separator between function parameters.
    Join,
    /// Opens a function signature.
    FunctionStart,
    /// Separates parameters from the return type.
    ReturnMarker,
    /// Name of the parameter whose type follows.
    ParamName(String),
}

/// A type: an ordered sequence of [`TypeNode`]s.
///
/// The empty type is never represented by an empty sequence; it is the
/// `NULL` atomic (see [`Type::null`]). Pushing onto a `NULL` type replaces the
/// sentinel, and popping the last node restores it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Type {
    nodes: SmallVec<[TypeNode; 4]>,
}

/// A named (or anonymous) function parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Option<String>,
    pub ty: Type,
}

impl Param {
    pub fn named(name: impl Into<String>, ty: Type) -> Self {
        Param {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn anonymous(ty: Type) -> Self {
        Param { name: None, ty }
    }
}

/// The parameter list and return type read back out of a function [`Type`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<Param>,
    /// `NULL` when the function declares no return type.
    pub ret: Type,
}

impl Signature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn param_types(&self) -> impl Iterator<Item = &Type> {
        self.params.iter().map(|p| &p.ty)
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::null()
    }
}

impl Type {
    /// The `NULL` sentinel.
    pub fn null() -> Self {
        Type {
            nodes: smallvec::smallvec![TypeNode::Atomic(NULL_NAME.to_string())],
        }
    }

    /// A single named type.
    pub fn atomic(name: impl Into<String>) -> Self {
        Type {
            nodes: smallvec::smallvec![TypeNode::Atomic(name.into())],
        }
    }

    /// Build a type from raw nodes. An empty iterator yields `NULL`.
    pub fn from_nodes(nodes: impl IntoIterator<Item = TypeNode>) -> Self {
        let nodes: SmallVec<[TypeNode; 4]> = nodes.into_iter().collect();
        if nodes.is_empty() {
            Self::null()
        } else {
            Type { nodes }
        }
    }

    /// Build a function signature type.
    pub fn function(params: &[Param], ret: &Type) -> Self {
        let mut ty = Type::from_nodes([TypeNode::FunctionStart]);
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                ty.push_back(TypeNode::Join);
            }
            if let Some(name) = &param.name {
                ty.push_back(TypeNode::ParamName(name.clone()));
            }
            ty.append(&param.ty);
        }
        ty.push_back(TypeNode::ReturnMarker);
        ty.append(ret);
        ty
    }

    pub fn nodes(&self) -> &[TypeNode] {
        &self.nodes
    }

    pub fn is_null(&self) -> bool {
        match self.nodes.as_slice() {
            [] => true,
            [TypeNode::Atomic(name)] => name == NULL_NAME,
            _ => false,
        }
    }

    pub fn first(&self) -> Option<&TypeNode> {
        self.nodes.first()
    }

    pub fn last(&self) -> Option<&TypeNode> {
        self.nodes.last()
    }

    pub fn push_back(&mut self, node: TypeNode) {
        if self.is_null() {
            self.nodes.clear();
        }
        self.nodes.push(node);
    }

    pub fn push_front(&mut self, node: TypeNode) {
        if self.is_null() {
            self.nodes.clear();
        }
        self.nodes.insert(0, node);
    }

    /// Splice all nodes of `other` onto the end. Appending `NULL` is a no-op.
    pub fn append(&mut self, other: &Type) {
        if other.is_null() {
            return;
        }
        if self.is_null() {
            self.nodes.clear();
        }
        self.nodes.extend(other.nodes.iter().cloned());
    }

    pub fn pop_front(&mut self) -> Option<TypeNode> {
        if self.is_null() {
            return None;
        }
        let node = self.nodes.remove(0);
        if self.nodes.is_empty() {
            *self = Self::null();
        }
        Some(node)
    }

    pub fn pop_back(&mut self) -> Option<TypeNode> {
        if self.is_null() {
            return None;
        }
        let node = self.nodes.pop();
        if self.nodes.is_empty() {
            *self = Self::null();
        }
        node
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.first(), Some(TypeNode::Pointer))
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self.first(),
            Some(TypeNode::UnsizedArray | TypeNode::SizedArray(_))
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(self.first(), Some(TypeNode::FunctionStart))
    }

    /// Number of leading pointer nodes.
    pub fn pointer_depth(&self) -> usize {
        self.nodes
            .iter()
            .take_while(|n| matches!(n, TypeNode::Pointer))
            .count()
    }

    /// The type with every leading pointer removed.
    #[must_use]
    pub fn strip_pointers(&self) -> Type {
        Type::from_nodes(
            self.nodes
                .iter()
                .skip_while(|n| matches!(n, TypeNode::Pointer))
                .cloned(),
        )
    }

    /// The pointee type, or `None` if this is not a pointer.
    pub fn deref(&self) -> Option<Type> {
        if self.is_pointer() {
            Some(Type::from_nodes(self.nodes.iter().skip(1).cloned()))
        } else {
            None
        }
    }

    /// The element type of an array, or `None` if this is not an array.
    pub fn element(&self) -> Option<Type> {
        if self.is_array() {
            Some(Type::from_nodes(self.nodes.iter().skip(1).cloned()))
        } else {
            None
        }
    }

    /// A pointer to this type.
    #[must_use]
    pub fn address_of(&self) -> Type {
        let mut ty = self.clone();
        ty.push_front(TypeNode::Pointer);
        ty
    }

    /// The name if this is a single named type (not `NULL`).
    pub fn atomic_name(&self) -> Option<&str> {
        match self.nodes.as_slice() {
            [TypeNode::Atomic(name)] if name != NULL_NAME => Some(name),
            _ => None,
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        self.atomic_name().and_then(Primitive::from_name)
    }

    pub fn is_integer(&self) -> bool {
        self.primitive().is_some_and(Primitive::is_integer)
    }

    pub fn is_float(&self) -> bool {
        self.primitive().is_some_and(Primitive::is_float)
    }

    pub fn is_bool(&self) -> bool {
        self.primitive() == Some(Primitive::Bool)
    }

    /// Trivial types have no destructor: `NULL`, primitives, pointers, arrays
    /// and function types. Anything else is a user struct or enum value.
    pub fn is_trivial(&self) -> bool {
        match self.atomic_name() {
            Some(name) => Primitive::from_name(name).is_some(),
            None => true,
        }
    }

    /// Copy of this type without `ParamName` nodes.
    #[must_use]
    pub fn without_params(&self) -> Type {
        Type::from_nodes(
            self.nodes
                .iter()
                .filter(|n| !matches!(n, TypeNode::ParamName(_)))
                .cloned(),
        )
    }

    /// Structural equality that ignores parameter names.
    pub fn eq_ignoring_params(&self, other: &Type) -> bool {
        let lhs = self
            .nodes
            .iter()
            .filter(|n| !matches!(n, TypeNode::ParamName(_)));
        let rhs = other
            .nodes
            .iter()
            .filter(|n| !matches!(n, TypeNode::ParamName(_)));
        lhs.eq(rhs)
    }

    /// Read a function type back into parameters and return type.
    ///
    /// Returns `None` for non-function types or a signature missing its
    /// `ReturnMarker`.
    pub fn signature(&self) -> Option<Signature> {
        let mut nodes = self.nodes.iter();
        if nodes.next() != Some(&TypeNode::FunctionStart) {
            return None;
        }

        let mut params = Vec::new();
        let mut name = None;
        let mut current = Type::null();
        let mut pending = false;
        loop {
            match nodes.next()? {
                TypeNode::ReturnMarker => {
                    if pending {
                        params.push(Param {
                            name: name.take(),
                            ty: std::mem::take(&mut current),
                        });
                    }
                    break;
                }
                TypeNode::Join => {
                    params.push(Param {
                        name: name.take(),
                        ty: std::mem::take(&mut current),
                    });
                    pending = false;
                }
                TypeNode::ParamName(n) => {
                    name = Some(n.clone());
                    pending = true;
                }
                other => {
                    current.push_back(other.clone());
                    pending = true;
                }
            }
        }

        let ret = Type::from_nodes(nodes.cloned());
        Some(Signature { params, ret })
    }

    /// Source-level tokens spelling this type (`*`, `[`, `4`, `]`, `i32`).
    ///
    /// These are the tokens generic substitution and type-vector matching
    /// work on.
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            match node {
                TypeNode::Pointer => tokens.push("*".to_string()),
                TypeNode::Atomic(name) => tokens.push(name.clone()),
                TypeNode::UnsizedArray => {
                    tokens.push("[".to_string());
                    tokens.push("]".to_string());
                }
                TypeNode::SizedArray(bound) => {
                    tokens.push("[".to_string());
                    tokens.push(bound.clone());
                    tokens.push("]".to_string());
                }
                TypeNode::Join => tokens.push(",".to_string()),
                TypeNode::FunctionStart => {
                    tokens.push("fn".to_string());
                    tokens.push("(".to_string());
                }
                TypeNode::ReturnMarker => {
                    tokens.push(")".to_string());
                    tokens.push(":".to_string());
                }
                TypeNode::ParamName(name) => {
                    tokens.push(name.clone());
                    tokens.push(":".to_string());
                }
            }
        }
        tokens
    }
}

/// Flatten argument types into one comma-joined token vector.
pub fn type_vector(types: &[Type]) -> Vec<String> {
    let mut tokens = Vec::new();
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            tokens.push(",".to_string());
        }
        tokens.extend(ty.to_tokens());
    }
    tokens
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes = self.nodes.iter().peekable();
        while let Some(node) = nodes.next() {
            match node {
                TypeNode::Pointer => f.write_str("*")?,
                TypeNode::Atomic(name) => f.write_str(name)?,
                TypeNode::UnsizedArray => f.write_str("[]")?,
                TypeNode::SizedArray(bound) => write!(f, "[{bound}]")?,
                TypeNode::Join => f.write_str(", ")?,
                TypeNode::FunctionStart => f.write_str("fn(")?,
                TypeNode::ParamName(name) => write!(f, "{name}: ")?,
                TypeNode::ReturnMarker => {
                    f.write_str(")")?;
                    if nodes.peek().is_some() {
                        f.write_str(": ")?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
