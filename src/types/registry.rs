use std::{collections::HashMap, sync::Mutex};

use crate::{
    ast::TypeNode,
    errors::CompileError,
};

use super::{
    FloatType, IntType, ResourceType, Type, TypeClass, TypeHandle, PRIMITIVE_HANDLES,
};

/// Registry of all types of a compilation, keyed by handle for the fixed
/// set and by name for resources. The maps are lock-protected so the
/// registry could be shared across threads; a compilation only ever
/// touches it from the driver thread.
pub struct TypeRegistry {
    types: Mutex<HashMap<TypeHandle, Type>>,
    resources: Mutex<HashMap<String, ResourceType>>,
    pointer_width: u32,
}

impl TypeRegistry {
    /// Builds the registry with every primitive, the two literal types,
    /// unit and null pre-registered. `pointer_width` is the target's
    /// pointer size in bits, which fixes `isize`/`usize`.
    pub fn new(pointer_width: u32) -> Self {
        let mut types = HashMap::new();

        let int = |name, width, signed| Type::Int(IntType { name, width, signed });
        types.insert(TypeHandle::I8, int("i8", 8, true));
        types.insert(TypeHandle::I16, int("i16", 16, true));
        types.insert(TypeHandle::I32, int("i32", 32, true));
        types.insert(TypeHandle::I64, int("i64", 64, true));
        types.insert(TypeHandle::ISIZE, int("isize", pointer_width, true));
        types.insert(TypeHandle::U8, int("u8", 8, false));
        types.insert(TypeHandle::U16, int("u16", 16, false));
        types.insert(TypeHandle::U32, int("u32", 32, false));
        types.insert(TypeHandle::U64, int("u64", 64, false));
        types.insert(TypeHandle::USIZE, int("usize", pointer_width, false));
        types.insert(
            TypeHandle::F32,
            Type::Float(FloatType {
                name: "f32",
                width: 32,
            }),
        );
        types.insert(
            TypeHandle::F64,
            Type::Float(FloatType {
                name: "f64",
                width: 64,
            }),
        );
        types.insert(TypeHandle::BOOL, Type::Bool);
        types.insert(TypeHandle::CHAR, Type::Char);
        types.insert(TypeHandle::UNIT, Type::Unit);
        types.insert(TypeHandle::NULL, Type::Null);
        types.insert(TypeHandle::INT_LITERAL, Type::IntLiteral);
        types.insert(TypeHandle::FLOAT_LITERAL, Type::FloatLiteral);

        TypeRegistry {
            types: Mutex::new(types),
            resources: Mutex::new(HashMap::new()),
            pointer_width,
        }
    }

    pub fn pointer_width(&self) -> u32 {
        self.pointer_width
    }

    /// Look up a registered type. A missing handle is a compiler bug, not
    /// a user error.
    pub fn get_type(&self, handle: &TypeHandle) -> Type {
        if handle.class == TypeClass::Resource {
            return self
                .get_resource(&handle.name)
                .map(Type::Resource)
                .unwrap_or_else(|| panic!("type handle '{}' is not registered", handle.name));
        }

        self.types
            .lock()
            .expect("type registry lock poisoned")
            .get(handle)
            .cloned()
            .unwrap_or_else(|| panic!("type handle '{}' is not registered", handle.name))
    }

    pub fn get_resource(&self, name: &str) -> Option<ResourceType> {
        self.resources
            .lock()
            .expect("type registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Registers a resource, returning the existing instance when the
    /// name is already taken. Duplicate *definitions* are diagnosed by
    /// the registration pass, not here.
    pub fn create_resource_type(
        &self,
        name: &str,
        defined_in: Option<String>,
        generics: Vec<Type>,
    ) -> ResourceType {
        let mut resources = self.resources.lock().expect("type registry lock poisoned");
        resources
            .entry(name.to_string())
            .or_insert_with(|| ResourceType::new(name, defined_in, generics))
            .clone()
    }

    /// Memoized `Vector<T>` instantiation. The instance shares the method
    /// set of the generic `Vector` resource; its struct layout
    /// `{ T* elements, usize size, usize capacity }` is materialized by
    /// the code generator on first use.
    pub fn get_or_create_vector_type(&self, element: Type) -> ResourceType {
        let name = format!("Vector<{element}>");
        if let Some(existing) = self.get_resource(&name) {
            return existing;
        }

        let vector = ResourceType::new(&name, None, vec![element]);
        if let Some(base) = self.get_resource("Vector") {
            vector.set_methods(base.methods());
        }

        let mut resources = self.resources.lock().expect("type registry lock poisoned");
        resources.entry(name).or_insert(vector).clone()
    }

    /// Resolve a parsed type node. `unit` names the compilation unit for
    /// diagnostics.
    pub fn resolve_type(&self, node: &TypeNode, unit: &str) -> Result<Type, CompileError> {
        match node {
            TypeNode::Unit { .. } => Ok(Type::Unit),
            TypeNode::Named { name, span } => {
                if let Some(handle) = PRIMITIVE_HANDLES.get(name.as_str()) {
                    return Ok(self.get_type(handle));
                }
                self.get_resource(name).map(Type::Resource).ok_or_else(|| {
                    CompileError::error(unit, *span, format!("Unknown type: {name}"))
                })
            }
            TypeNode::Generic {
                name,
                arguments,
                span,
            } => {
                if name != "Vector" {
                    return Err(CompileError::error(
                        unit,
                        *span,
                        format!("Unknown generic type: {name}"),
                    ));
                }
                if arguments.len() != 1 {
                    return Err(CompileError::error(
                        unit,
                        *span,
                        format!(
                            "Vector takes exactly one type parameter, got {}",
                            arguments.len()
                        ),
                    ));
                }
                let element = self.resolve_type(&arguments[0], unit)?;
                Ok(Type::Resource(self.get_or_create_vector_type(element)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Span;

    use super::*;

    #[test]
    fn handles_resolve_to_their_named_types() {
        let registry = TypeRegistry::new(64);

        for handle in TypeHandle::primitives() {
            let ty = registry.get_type(&handle);
            assert_eq!(ty.name(), handle.name.as_ref());
        }
    }

    #[test]
    fn pointer_width_fixes_isize_and_usize() {
        let registry = TypeRegistry::new(32);

        assert_eq!(registry.get_type(&TypeHandle::USIZE).int_width(), Some(32));
        assert_eq!(registry.get_type(&TypeHandle::ISIZE).int_width(), Some(32));
    }

    #[test]
    fn vector_instances_are_memoized() {
        let registry = TypeRegistry::new(64);
        let element = registry.get_type(&TypeHandle::I32);

        let first = registry.get_or_create_vector_type(element.clone());
        let second = registry.get_or_create_vector_type(element);

        assert_eq!(first.name(), "Vector<i32>");
        assert_eq!(first.name(), second.name());
        assert_eq!(
            Type::Resource(first),
            Type::Resource(second),
            "equal element types must yield the same vector type"
        );
    }

    #[test]
    fn unknown_names_are_reported_with_position() {
        let registry = TypeRegistry::new(64);
        let node = TypeNode::named("Mystery", Span::new((4, 2), (4, 9)));

        let error = registry.resolve_type(&node, "main.reso").unwrap_err();
        assert_eq!(error.message, "Unknown type: Mystery");
        assert_eq!(error.line, 4);
        assert_eq!(error.column, 2);
    }

    #[test]
    fn only_vector_may_be_generic() {
        let registry = TypeRegistry::new(64);
        let node = TypeNode::Generic {
            name: "Map".to_string(),
            arguments: vec![TypeNode::named("i32", Span::default())],
            span: Span::default(),
        };

        let error = registry.resolve_type(&node, "main.reso").unwrap_err();
        assert_eq!(error.message, "Unknown generic type: Map");
    }
}
