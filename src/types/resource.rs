use std::{cell::RefCell, rc::Rc};

use crate::ast::Visibility;

use super::Type;

/// A resource field. The field's index in the struct layout is its
/// position in the declaration order.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub is_const: bool,
    pub visibility: Visibility,
}

/// A declared path segment: a plain name or a typed indexer parameter.
#[derive(Debug, Clone)]
pub enum PathSegment {
    Named(String),
    Indexer { name: String, ty: Type },
}

impl PathSegment {
    /// Contribution to the path uniqueness key; indexers collapse to a
    /// placeholder so `[i: usize]` and `[n: usize]` name the same path.
    pub fn key(&self) -> String {
        match self {
            PathSegment::Named(name) => name.clone(),
            PathSegment::Indexer { .. } => "{Indexer}".to_string(),
        }
    }

    /// Contribution to the mangled LLVM symbol name.
    pub fn mangle(&self) -> String {
        match self {
            PathSegment::Named(name) => name.clone(),
            PathSegment::Indexer { ty, .. } => format!("{{{ty}}}"),
        }
    }
}

/// Uniqueness key of a whole path.
pub fn path_key(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(PathSegment::key)
        .collect::<Vec<_>>()
        .join("/")
}

/// The LLVM symbol of a resource method:
/// `Resource_segment_…_method`, indexers rendered as `{TypeName}`.
pub fn mangled_method_name(resource: &str, segments: &[PathSegment], method: &str) -> String {
    let mut parts = vec![resource.to_string()];
    parts.extend(segments.iter().map(PathSegment::mangle));
    parts.push(method.to_string());
    parts.join("_")
}

/// How a method call is lowered: through a declared LLVM function, or by
/// a builder synthesizing IR inline at every call site.
#[derive(Debug, Clone)]
pub enum MethodBody {
    Declared { symbol: String },
    Builtin(BuiltinMethod),
}

/// The synthesized `Vector` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMethod {
    VectorGet,
    VectorSet,
    VectorAdd,
    VectorInsert,
    VectorRemove,
    VectorSize,
    VectorCapacity,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub return_type: Type,
    /// Explicit parameters; path indexer parameters are carried by `path`.
    pub parameters: Vec<(String, Type)>,
    pub visibility: Visibility,
    pub path: Vec<PathSegment>,
    pub body: MethodBody,
}

impl Method {
    pub fn path_key(&self) -> String {
        path_key(&self.path)
    }

    /// Indexer parameters contributed by the path, in segment order.
    pub fn indexer_parameters(&self) -> Vec<(String, Type)> {
        self.path
            .iter()
            .filter_map(|segment| match segment {
                PathSegment::Indexer { name, ty } => Some((name.clone(), ty.clone())),
                PathSegment::Named(_) => None,
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct ResourceData {
    pub name: String,
    /// Unit that declared the resource; `None` for built-ins.
    pub defined_in: Option<String>,
    pub generics: Vec<Type>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub initializer_visibility: Visibility,
}

/// Shared handle to a resource. Cloning is cheap; the underlying data is
/// filled in over the two registration passes.
#[derive(Debug, Clone)]
pub struct ResourceType(Rc<RefCell<ResourceData>>);

impl ResourceType {
    pub fn new(name: impl ToString, defined_in: Option<String>, generics: Vec<Type>) -> Self {
        ResourceType(Rc::new(RefCell::new(ResourceData {
            name: name.to_string(),
            defined_in,
            generics,
            fields: Vec::new(),
            methods: Vec::new(),
            initializer_visibility: Visibility::Global,
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn defined_in(&self) -> Option<String> {
        self.0.borrow().defined_in.clone()
    }

    pub fn is_vector(&self) -> bool {
        let name = self.name();
        name == "Vector" || name.starts_with("Vector<")
    }

    /// The element type of a memoized `Vector<T>` instance.
    pub fn element_type(&self) -> Option<Type> {
        self.0.borrow().generics.first().cloned()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.0.borrow().fields.clone()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.0
            .borrow()
            .fields
            .iter()
            .position(|field| field.name == name)
    }

    pub fn field(&self, name: &str) -> Option<Field> {
        self.0
            .borrow()
            .fields
            .iter()
            .find(|field| field.name == name)
            .cloned()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_index(name).is_some()
    }

    pub fn push_field(&self, field: Field) {
        self.0.borrow_mut().fields.push(field);
    }

    pub fn methods(&self) -> Vec<Method> {
        self.0.borrow().methods.clone()
    }

    pub fn find_method(&self, path_key: &str, name: &str) -> Option<Method> {
        self.0
            .borrow()
            .methods
            .iter()
            .find(|method| method.name == name && method.path_key() == path_key)
            .cloned()
    }

    pub fn has_method(&self, path_key: &str, name: &str) -> bool {
        self.find_method(path_key, name).is_some()
    }

    pub fn push_method(&self, method: Method) {
        self.0.borrow_mut().methods.push(method);
    }

    pub fn set_methods(&self, methods: Vec<Method>) {
        self.0.borrow_mut().methods = methods;
    }

    pub fn initializer_visibility(&self) -> Visibility {
        self.0.borrow().initializer_visibility
    }

    pub fn set_initializer_visibility(&self, visibility: Visibility) {
        self.0.borrow_mut().initializer_visibility = visibility;
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{IntType, Type};

    use super::*;

    fn usize_type() -> Type {
        Type::Int(IntType {
            name: "usize",
            width: 64,
            signed: false,
        })
    }

    #[test]
    fn indexers_collapse_in_the_path_key() {
        let by_index = vec![PathSegment::Indexer {
            name: "index".to_string(),
            ty: usize_type(),
        }];
        let by_position = vec![PathSegment::Indexer {
            name: "position".to_string(),
            ty: usize_type(),
        }];

        assert_eq!(path_key(&by_index), path_key(&by_position));
        assert_eq!(path_key(&by_index), "{Indexer}");
    }

    #[test]
    fn mangling_renders_indexers_as_type_names() {
        let segments = vec![PathSegment::Indexer {
            name: "index".to_string(),
            ty: usize_type(),
        }];

        assert_eq!(
            mangled_method_name("Vector", &segments, "get"),
            "Vector_{usize}_get"
        );
        assert_eq!(mangled_method_name("Vector", &[], "add"), "Vector_add");
        assert_eq!(
            mangled_method_name(
                "Vector",
                &[PathSegment::Named("size".to_string())],
                "get"
            ),
            "Vector_size_get"
        );
    }

    #[test]
    fn field_indices_follow_declaration_order() {
        let resource = ResourceType::new("Point", Some("a.reso".to_string()), vec![]);
        resource.push_field(Field {
            name: "x".to_string(),
            ty: usize_type(),
            is_const: false,
            visibility: crate::ast::Visibility::Global,
        });
        resource.push_field(Field {
            name: "y".to_string(),
            ty: usize_type(),
            is_const: false,
            visibility: crate::ast::Visibility::Global,
        });

        assert_eq!(resource.field_index("x"), Some(0));
        assert_eq!(resource.field_index("y"), Some(1));
        assert_eq!(resource.field_index("z"), None);
    }
}
