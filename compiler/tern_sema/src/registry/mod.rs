//! Registry for user-defined structs and enums.
//!
//! Member and option order is layout order (enum discriminants are option
//! indices) and is never changed after registration. Erased definitions stay
//! registered so their names cannot be reused silently.

use rustc_hash::FxHashMap;
use tern_types::{Primitive, Type};

/// Layout of a struct.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructLookupData {
    /// Member names in declaration order.
    pub members: Vec<String>,
    pub types: FxHashMap<String, Type>,
    pub erased: bool,
}

impl StructLookupData {
    pub fn push_member(&mut self, name: impl Into<String>, ty: Type) {
        let name = name.into();
        self.types.insert(name.clone(), ty);
        self.members.push(name);
    }

    pub fn member_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    /// Members with their types, in layout order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Type)> {
        self.members
            .iter()
            .filter_map(|m| self.types.get(m).map(|ty| (m.as_str(), ty)))
    }
}

/// Options of an enum. Options without a payload map to `NULL`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumLookupData {
    pub options: Vec<String>,
    pub types: FxHashMap<String, Type>,
    pub erased: bool,
}

impl EnumLookupData {
    pub fn push_option(&mut self, name: impl Into<String>, payload: Type) {
        let name = name.into();
        self.types.insert(name.clone(), payload);
        self.options.push(name);
    }

    /// Tag value of `option`.
    pub fn discriminant(&self, option: &str) -> Option<usize> {
        self.options.iter().position(|o| o == option)
    }

    /// Payload type of `option`; `NULL` when it carries none.
    pub fn payload(&self, option: &str) -> Option<&Type> {
        self.types.get(option)
    }

    pub fn has_payloads(&self) -> bool {
        self.types.values().any(|ty| !ty.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.options
            .iter()
            .filter_map(|o| self.types.get(o).map(|ty| (o.as_str(), ty)))
    }
}

#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    structs: FxHashMap<String, StructLookupData>,
    enums: FxHashMap<String, EnumLookupData>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or overwrite) a struct layout.
    pub fn register_struct(&mut self, name: impl Into<String>, data: StructLookupData) {
        let name = name.into();
        tracing::debug!(name = %name, members = data.members.len(), "registered struct");
        self.structs.insert(name, data);
    }

    pub fn register_enum(&mut self, name: impl Into<String>, data: EnumLookupData) {
        let name = name.into();
        tracing::debug!(name = %name, options = data.options.len(), "registered enum");
        self.enums.insert(name, data);
    }

    /// A visible struct named `name`.
    pub fn get_struct(&self, name: &str) -> Option<&StructLookupData> {
        self.structs.get(name).filter(|s| !s.erased)
    }

    pub fn get_enum(&self, name: &str) -> Option<&EnumLookupData> {
        self.enums.get(name).filter(|e| !e.erased)
    }

    /// Whether a struct or enum of this name was ever registered, erased or
    /// not.
    pub fn is_registered(&self, name: &str) -> bool {
        self.structs.contains_key(name) || self.enums.contains_key(name)
    }

    /// Primitives and visible structs/enums.
    pub fn is_known_type(&self, name: &str) -> bool {
        Primitive::from_name(name).is_some()
            || self.get_struct(name).is_some()
            || self.get_enum(name).is_some()
    }

    /// The struct layout behind `ty`, after auto-dereference.
    pub fn struct_of(&self, ty: &Type) -> Option<&StructLookupData> {
        ty.strip_pointers()
            .atomic_name()
            .and_then(|name| self.get_struct(name))
    }

    pub fn enum_of(&self, ty: &Type) -> Option<&EnumLookupData> {
        ty.atomic_name().and_then(|name| self.get_enum(name))
    }

    /// Flag struct/enum data erased. Returns whether any existed.
    pub fn erase(&mut self, name: &str) -> bool {
        let mut found = false;
        if let Some(data) = self.structs.get_mut(name) {
            data.erased = true;
            found = true;
        }
        if let Some(data) = self.enums.get_mut(name) {
            data.erased = true;
            found = true;
        }
        found
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
