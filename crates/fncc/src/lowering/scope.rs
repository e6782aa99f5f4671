//! Lexical scopes used while lowering.
//!
//! Scopes live in an arena and are addressed by [ScopeId]. Each scope points at a variable table
//! and a function table, tables are chained to their parents for lookups. Conditional and loop
//! bodies get their own variable table but share the function table of the scope they are in,
//! so a function defined inside an `if` stays callable after it. A function body starts a fresh
//! variable table, only functions are visible from the enclosing scopes.

use std::collections::HashMap;

use fnc_ir::{Signature, Value};

/// Identifies a scope in [Scopes]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// What a variable name is bound to
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A stack slot that is loaded on read and can be stored to
    Slot(Value),
    /// A value used as is, like a parameter. Can not be assigned to.
    Direct(Value),
}

/// A function that can be called by name
#[derive(Debug, Clone, PartialEq)]
pub struct Callee {
    pub symbol: String,
    pub signature: Signature,
}

impl Callee {
    pub fn new(symbol: impl Into<String>, signature: Signature) -> Self {
        Self {
            symbol: symbol.into(),
            signature,
        }
    }

    pub fn arity(&self) -> usize {
        self.signature.params.len()
    }
}

#[derive(Debug)]
struct Table<T> {
    parent: Option<usize>,
    entries: HashMap<String, T>,
}

impl<T> Table<T> {
    fn new(parent: Option<usize>) -> Self {
        Self {
            parent,
            entries: HashMap::new(),
        }
    }
}

#[derive(Debug)]
struct Scope {
    vars: usize,
    functions: usize,
    /// Symbol of the function this scope is in, nested function symbols extend it
    function_symbol: String,
}

/// The arena of all scopes of a lowering pass
#[derive(Debug)]
pub struct Scopes {
    scopes: Vec<Scope>,
    var_tables: Vec<Table<Binding>>,
    fn_tables: Vec<Table<Callee>>,
}

impl Scopes {
    /// Index of the function table holding the builtins
    const GLOBAL_FUNCTIONS: usize = 0;

    /// Creates an arena with only the global function table
    pub fn new() -> Self {
        Self {
            scopes: vec![],
            var_tables: vec![],
            fn_tables: vec![Table::new(None)],
        }
    }

    /// Binds a function in the global table
    pub fn declare_global_function(&mut self, name: &str, callee: Callee) {
        self.fn_tables[Self::GLOBAL_FUNCTIONS]
            .entries
            .insert(name.to_string(), callee);
    }

    fn push(&mut self, vars: usize, functions: usize, function_symbol: String) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            vars,
            functions,
            function_symbol,
        });
        id
    }

    fn new_var_table(&mut self, parent: Option<usize>) -> usize {
        self.var_tables.push(Table::new(parent));
        self.var_tables.len() - 1
    }

    fn new_fn_table(&mut self, parent: Option<usize>) -> usize {
        self.fn_tables.push(Table::new(parent));
        self.fn_tables.len() - 1
    }

    /// The top level scope of the program. Functions defined here go straight into the global
    /// function table.
    pub fn main_scope(&mut self, function_symbol: &str) -> ScopeId {
        let vars = self.new_var_table(None);
        self.push(vars, Self::GLOBAL_FUNCTIONS, function_symbol.to_string())
    }

    /// A scope nested in `parent` within the same function
    pub fn child(&mut self, parent: ScopeId) -> ScopeId {
        let Scope {
            vars,
            functions,
            ref function_symbol,
        } = self.scopes[parent.0];
        let function_symbol = function_symbol.clone();
        let vars = self.new_var_table(Some(vars));
        self.push(vars, functions, function_symbol)
    }

    /// The body scope of a function defined in `defining`
    pub fn function_scope(&mut self, defining: ScopeId, function_symbol: &str) -> ScopeId {
        let parent_functions = self.scopes[defining.0].functions;
        let vars = self.new_var_table(None);
        let functions = self.new_fn_table(Some(parent_functions));
        self.push(vars, functions, function_symbol.to_string())
    }

    pub fn function_symbol(&self, scope: ScopeId) -> &str {
        &self.scopes[scope.0].function_symbol
    }

    /// Binds a variable in `scope`, shadowing any binding from outer scopes
    pub fn declare_var(&mut self, scope: ScopeId, name: &str, binding: Binding) {
        let table = self.scopes[scope.0].vars;
        self.var_tables[table]
            .entries
            .insert(name.to_string(), binding);
    }

    /// Finds the innermost binding of `name` visible from `scope`
    pub fn lookup_var(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        lookup(&self.var_tables, self.scopes[scope.0].vars, name)
    }

    pub fn declare_function(&mut self, scope: ScopeId, name: &str, callee: Callee) {
        let table = self.scopes[scope.0].functions;
        self.fn_tables[table]
            .entries
            .insert(name.to_string(), callee);
    }

    pub fn lookup_function(&self, scope: ScopeId, name: &str) -> Option<&Callee> {
        lookup(&self.fn_tables, self.scopes[scope.0].functions, name)
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a, T>(tables: &'a [Table<T>], start: usize, name: &str) -> Option<&'a T> {
    let mut current = Some(start);
    while let Some(index) = current {
        let table = &tables[index];
        if let Some(found) = table.entries.get(name) {
            return Some(found);
        }
        current = table.parent;
    }
    None
}
