//! Built-in primitive types and their C spellings.

use crate::{Type, TypeNode};

/// A built-in primitive type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Str,
    Void,
}

/// Conversion family. Implicit casts only happen inside one numeric family.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Integer,
    Float,
    Bool,
    Str,
    Void,
}

impl Primitive {
    pub const ALL: [Primitive; 13] = [
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::F32,
        Primitive::F64,
        Primitive::Bool,
        Primitive::Str,
        Primitive::Void,
    ];

    /// Integers and floats, in declaration order.
    pub const NUMERIC: [Primitive; 10] = [
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::F32,
        Primitive::F64,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "i8" => Primitive::I8,
            "i16" => Primitive::I16,
            "i32" => Primitive::I32,
            "i64" => Primitive::I64,
            "u8" => Primitive::U8,
            "u16" => Primitive::U16,
            "u32" => Primitive::U32,
            "u64" => Primitive::U64,
            "f32" => Primitive::F32,
            "f64" => Primitive::F64,
            "bool" => Primitive::Bool,
            "str" => Primitive::Str,
            "void" => Primitive::Void,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Bool => "bool",
            Primitive::Str => "str",
            Primitive::Void => "void",
        }
    }

    pub fn c_name(self) -> &'static str {
        match self {
            Primitive::I8 => "int8_t",
            Primitive::I16 => "int16_t",
            Primitive::I32 => "int32_t",
            Primitive::I64 => "int64_t",
            Primitive::U8 => "uint8_t",
            Primitive::U16 => "uint16_t",
            Primitive::U32 => "uint32_t",
            Primitive::U64 => "uint64_t",
            Primitive::F32 => "float",
            Primitive::F64 => "double",
            Primitive::Bool => "bool",
            Primitive::Str => "const char*",
            Primitive::Void => "void",
        }
    }

    pub fn family(self) -> Family {
        match self {
            Primitive::I8
            | Primitive::I16
            | Primitive::I32
            | Primitive::I64
            | Primitive::U8
            | Primitive::U16
            | Primitive::U32
            | Primitive::U64 => Family::Integer,
            Primitive::F32 | Primitive::F64 => Family::Float,
            Primitive::Bool => Family::Bool,
            Primitive::Str => Family::Str,
            Primitive::Void => Family::Void,
        }
    }

    pub fn is_integer(self) -> bool {
        self.family() == Family::Integer
    }

    pub fn is_float(self) -> bool {
        self.family() == Family::Float
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::I8
                | Primitive::I16
                | Primitive::I32
                | Primitive::I64
                | Primitive::F32
                | Primitive::F64
        )
    }

    /// Storage width in bits; zero for non-numeric primitives.
    pub fn bits(self) -> u32 {
        match self {
            Primitive::I8 | Primitive::U8 => 8,
            Primitive::I16 | Primitive::U16 => 16,
            Primitive::I32 | Primitive::U32 | Primitive::F32 => 32,
            Primitive::I64 | Primitive::U64 | Primitive::F64 => 64,
            Primitive::Bool | Primitive::Str | Primitive::Void => 0,
        }
    }

    /// Whether converting `self` into `target` may lose information.
    ///
    /// Only meaningful within one family.
    pub fn narrows_to(self, target: Primitive) -> bool {
        target.bits() < self.bits() || (self.is_signed() != target.is_signed())
    }

    /// Smallest unsigned integer holding `bits` bits.
    pub fn unsigned_for_bits(bits: u32) -> Option<Primitive> {
        match bits {
            0..=8 => Some(Primitive::U8),
            9..=16 => Some(Primitive::U16),
            17..=32 => Some(Primitive::U32),
            33..=64 => Some(Primitive::U64),
            _ => None,
        }
    }

    pub fn ty(self) -> Type {
        Type::atomic(self.name())
    }
}

impl Type {
    /// C spelling of this type when used as a parameter, return or cast
    /// type. Arrays decay to pointers.
    pub fn c_type(&self) -> String {
        if self.is_null() {
            return "void".to_string();
        }

        let mut pointers = 0usize;
        let mut base = None;
        for node in self.nodes() {
            match node {
                TypeNode::Pointer | TypeNode::UnsizedArray | TypeNode::SizedArray(_) => {
                    pointers += 1;
                }
                TypeNode::Atomic(name) => {
                    base = Some(name.as_str());
                    break;
                }
                TypeNode::FunctionStart => {
                    base = Some("void");
                    pointers += 1;
                    break;
                }
                TypeNode::Join | TypeNode::ReturnMarker | TypeNode::ParamName(_) => break,
            }
        }

        let base = match base {
            None => "void",
            Some(name) => Primitive::from_name(name).map_or(name, |prim| prim.c_name()),
        };

        let mut out = String::with_capacity(base.len() + pointers);
        out.push_str(base);
        for _ in 0..pointers {
            out.push('*');
        }
        out
    }

    /// C declarator for a variable or member named `name`.
    ///
    /// Leading sized-array bounds become C array dimensions
    /// (`[2][3]i32` declares `int32_t m[2][3]`).
    pub fn c_declaration(&self, name: &str) -> String {
        let mut bounds = Vec::new();
        let mut rest = self.clone();
        while let Some(TypeNode::SizedArray(bound)) = rest.first() {
            bounds.push(bound.clone());
            rest.pop_front();
        }

        let mut out = format!("{} {name}", rest.c_type());
        for bound in bounds {
            out.push('[');
            out.push_str(&bound);
            out.push(']');
        }
        out
    }
}

#[cfg(test)]
mod tests;
