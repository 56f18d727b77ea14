use std::{borrow::Cow, collections::HashMap};

use once_cell::sync::Lazy;

/// Classification tag carried by a [`TypeHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    SignedInteger,
    UnsignedInteger,
    Float,
    Bool,
    Char,
    Unit,
    Null,
    IntegerLiteral,
    FloatLiteral,
    Resource,
}

/// An immutable registry key `(name, class)`. Handles exist so lookups
/// into the type registry are spelled once, not retyped as strings at
/// every call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    pub name: Cow<'static, str>,
    pub class: TypeClass,
}

impl TypeHandle {
    pub const I8: TypeHandle = TypeHandle::of("i8", TypeClass::SignedInteger);
    pub const I16: TypeHandle = TypeHandle::of("i16", TypeClass::SignedInteger);
    pub const I32: TypeHandle = TypeHandle::of("i32", TypeClass::SignedInteger);
    pub const I64: TypeHandle = TypeHandle::of("i64", TypeClass::SignedInteger);
    pub const ISIZE: TypeHandle = TypeHandle::of("isize", TypeClass::SignedInteger);
    pub const U8: TypeHandle = TypeHandle::of("u8", TypeClass::UnsignedInteger);
    pub const U16: TypeHandle = TypeHandle::of("u16", TypeClass::UnsignedInteger);
    pub const U32: TypeHandle = TypeHandle::of("u32", TypeClass::UnsignedInteger);
    pub const U64: TypeHandle = TypeHandle::of("u64", TypeClass::UnsignedInteger);
    pub const USIZE: TypeHandle = TypeHandle::of("usize", TypeClass::UnsignedInteger);
    pub const F32: TypeHandle = TypeHandle::of("f32", TypeClass::Float);
    pub const F64: TypeHandle = TypeHandle::of("f64", TypeClass::Float);
    pub const BOOL: TypeHandle = TypeHandle::of("bool", TypeClass::Bool);
    pub const CHAR: TypeHandle = TypeHandle::of("char", TypeClass::Char);
    pub const UNIT: TypeHandle = TypeHandle::of("()", TypeClass::Unit);
    pub const NULL: TypeHandle = TypeHandle::of("null", TypeClass::Null);
    pub const INT_LITERAL: TypeHandle = TypeHandle::of("integer literal", TypeClass::IntegerLiteral);
    pub const FLOAT_LITERAL: TypeHandle = TypeHandle::of("float literal", TypeClass::FloatLiteral);

    const fn of(name: &'static str, class: TypeClass) -> Self {
        TypeHandle {
            name: Cow::Borrowed(name),
            class,
        }
    }

    pub fn resource(name: impl ToString) -> Self {
        TypeHandle {
            name: Cow::Owned(name.to_string()),
            class: TypeClass::Resource,
        }
    }

    /// The handles of every registered primitive, in registration order.
    pub fn primitives() -> [TypeHandle; 14] {
        [
            TypeHandle::I8,
            TypeHandle::I16,
            TypeHandle::I32,
            TypeHandle::I64,
            TypeHandle::ISIZE,
            TypeHandle::U8,
            TypeHandle::U16,
            TypeHandle::U32,
            TypeHandle::U64,
            TypeHandle::USIZE,
            TypeHandle::F32,
            TypeHandle::F64,
            TypeHandle::BOOL,
            TypeHandle::CHAR,
        ]
    }
}

/// Primitive source-name lookup used when resolving parsed type nodes.
pub static PRIMITIVE_HANDLES: Lazy<HashMap<&'static str, TypeHandle>> = Lazy::new(|| {
    TypeHandle::primitives()
        .into_iter()
        .map(|handle| {
            let name = match handle.name {
                Cow::Borrowed(name) => name,
                Cow::Owned(_) => unreachable!("primitive handles are static"),
            };
            (name, handle)
        })
        .collect()
});
