//! Symbol table: a stack of lexical scopes for variables, the global
//! namespaces for functions, resources and primitive method tables, the
//! function-return-type stack, and the access-context stack that backs
//! file-private visibility.
//!
//! User-visible failures (redefinitions, missing symbols) are returned to
//! the caller for reporting; violations of internal invariants (popping
//! the global scope, defining a variable outside any function) panic.

use std::collections::HashMap;

use inkwell::values::PointerValue;

use crate::{
    ast::Visibility,
    types::{Method, ResourceType, Type},
};

/// A local binding: its storage is always an `alloca` slot in the
/// enclosing function. Readable only once initialized.
#[derive(Debug, Clone)]
pub struct VariableSymbol<'ctx> {
    pub name: String,
    pub ty: Type,
    pub storage: PointerValue<'ctx>,
    pub is_const: bool,
    pub is_initialized: bool,
}

/// How a function call is lowered.
#[derive(Debug, Clone)]
pub enum FunctionBody {
    /// A declared LLVM function, called by symbol.
    Declared { symbol: String },
    /// The `Vector()` constructor, producing an untyped empty vector.
    VectorConstructor,
}

#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<(String, Type)>,
    pub visibility: Visibility,
    /// Unit that defined the function; `None` for built-ins.
    pub defined_in: Option<String>,
    pub body: FunctionBody,
}

#[derive(Debug, Default)]
struct Scope<'ctx> {
    variables: HashMap<String, VariableSymbol<'ctx>>,
}

#[derive(Debug, Clone)]
struct AccessContext {
    level: Visibility,
    file: Option<String>,
}

#[derive(Debug)]
pub struct SymbolTable<'ctx> {
    scopes: Vec<Scope<'ctx>>,
    function_returns: Vec<Type>,
    access_contexts: Vec<AccessContext>,
    functions: HashMap<String, FunctionSymbol>,
    resources: HashMap<String, ResourceType>,
    /// Method tables of non-resource types (the primitive `to_string`s).
    type_methods: HashMap<String, Vec<Method>>,
}

impl Default for SymbolTable<'_> {
    fn default() -> Self {
        SymbolTable {
            scopes: vec![Scope::default()],
            function_returns: Vec::new(),
            access_contexts: vec![AccessContext {
                level: Visibility::Global,
                file: None,
            }],
            functions: HashMap::new(),
            resources: HashMap::new(),
            type_methods: HashMap::new(),
        }
    }
}

impl<'ctx> SymbolTable<'ctx> {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    // === Scopes ===

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn exit_scope(&mut self) {
        if self.scopes.len() <= 1 {
            panic!("attempted to exit the global scope");
        }
        self.scopes.pop();
    }

    pub fn enter_function_scope(&mut self, return_type: Type) {
        self.enter_scope();
        self.function_returns.push(return_type);
    }

    pub fn exit_function_scope(&mut self) {
        self.exit_scope();
        self.function_returns
            .pop()
            .expect("exited a function scope without entering one");
    }

    /// The declared return type of the innermost enclosing function.
    pub fn current_return_type(&self) -> Option<Type> {
        self.function_returns.last().cloned()
    }

    // === Variables ===

    pub fn define_variable(&mut self, symbol: VariableSymbol<'ctx>) {
        if self.scopes.len() <= 1 {
            panic!("variable '{}' defined at global scope", symbol.name);
        }
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .variables
            .insert(symbol.name.clone(), symbol);
    }

    pub fn find_variable(&self, name: &str) -> Option<VariableSymbol<'ctx>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name))
            .cloned()
    }

    /// A variable usable as an rvalue: defined *and* initialized.
    pub fn find_readable_variable(&self, name: &str) -> Option<VariableSymbol<'ctx>> {
        self.find_variable(name)
            .filter(|variable| variable.is_initialized)
    }

    pub fn mark_initialized(&mut self, name: &str) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(variable) = scope.variables.get_mut(name) {
                variable.is_initialized = true;
                return;
            }
        }
    }

    // === Functions ===

    /// Registers a function in the global namespace. Returns the previous
    /// symbol when the name is already taken.
    pub fn define_function(&mut self, symbol: FunctionSymbol) -> Result<(), FunctionSymbol> {
        if let Some(existing) = self.functions.get(&symbol.name) {
            return Err(existing.clone());
        }
        self.functions.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn find_function(&self, name: &str) -> Option<FunctionSymbol> {
        self.functions.get(name).cloned()
    }

    // === Resources and type method tables ===

    /// Registers a resource definition. Returns `Err` when the name was
    /// already defined (the duplicate-resource diagnostic).
    pub fn define_resource(&mut self, resource: ResourceType) -> Result<(), ()> {
        let name = resource.name();
        if self.resources.contains_key(&name) {
            return Err(());
        }
        self.resources.insert(name, resource);
        Ok(())
    }

    pub fn find_resource(&self, name: &str) -> Option<ResourceType> {
        self.resources.get(name).cloned()
    }

    pub fn define_type_methods(&mut self, type_name: impl ToString, methods: Vec<Method>) {
        self.type_methods.insert(type_name.to_string(), methods);
    }

    pub fn find_type_method(&self, ty: &Type, path_key: &str, name: &str) -> Option<Method> {
        self.type_methods.get(&ty.name()).and_then(|methods| {
            methods
                .iter()
                .find(|method| method.name == name && method.path_key() == path_key)
                .cloned()
        })
    }

    // === Access contexts ===

    pub fn enter_file_context(&mut self, file: impl ToString) {
        self.access_contexts.push(AccessContext {
            level: Visibility::FilePrivate,
            file: Some(file.to_string()),
        });
    }

    pub fn exit_file_context(&mut self) {
        if self.access_contexts.len() <= 1 {
            panic!("attempted to exit the root access context");
        }
        self.access_contexts.pop();
    }

    /// Whether a symbol with the given visibility, defined in
    /// `target_file`, is accessible from the current context.
    pub fn can_access(&self, visibility: Visibility, target_file: Option<&str>) -> bool {
        match visibility {
            Visibility::Global => true,
            Visibility::FilePrivate => {
                let current = self
                    .access_contexts
                    .last()
                    .expect("access context stack is never empty");
                current.level == Visibility::FilePrivate
                    && current.file.as_deref() == target_file
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i32_type() -> Type {
        Type::Int(crate::types::IntType {
            name: "i32",
            width: 32,
            signed: true,
        })
    }

    #[test]
    fn file_private_symbols_are_invisible_across_files() {
        let mut table = SymbolTable::new();

        table.enter_file_context("a.reso");
        assert!(table.can_access(Visibility::FilePrivate, Some("a.reso")));
        assert!(!table.can_access(Visibility::FilePrivate, Some("b.reso")));
        assert!(table.can_access(Visibility::Global, Some("b.reso")));
        table.exit_file_context();

        // At the root context only global symbols resolve.
        assert!(!table.can_access(Visibility::FilePrivate, Some("a.reso")));
    }

    #[test]
    fn duplicate_function_definitions_are_rejected() {
        let mut table = SymbolTable::new();
        let symbol = FunctionSymbol {
            name: "helper".to_string(),
            return_type: i32_type(),
            parameters: vec![],
            visibility: Visibility::FilePrivate,
            defined_in: Some("a.reso".to_string()),
            body: FunctionBody::Declared {
                symbol: "helper".to_string(),
            },
        };

        assert!(table.define_function(symbol.clone()).is_ok());
        assert!(table.define_function(symbol).is_err());
    }

    #[test]
    fn return_type_stack_follows_function_scopes() {
        let mut table = SymbolTable::new();
        assert_eq!(table.current_return_type(), None);

        table.enter_function_scope(i32_type());
        assert_eq!(table.current_return_type(), Some(i32_type()));

        table.enter_function_scope(Type::Unit);
        assert_eq!(table.current_return_type(), Some(Type::Unit));

        table.exit_function_scope();
        assert_eq!(table.current_return_type(), Some(i32_type()));
        table.exit_function_scope();
        assert_eq!(table.current_return_type(), None);
    }

    #[test]
    #[should_panic(expected = "exit the global scope")]
    fn popping_the_global_scope_is_a_bug() {
        let mut table = SymbolTable::new();
        table.exit_scope();
    }
}
