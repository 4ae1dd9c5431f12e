//! User-declared names: types, constructors, and callables.

use std::collections::{HashMap, HashSet};

/// Owning type and ordered field list of a declared constructor.
#[derive(Debug, Clone)]
struct Constructor {
    type_name: String,
    fields: Vec<String>,
}

/// The symbol table built by the parser and linter.
///
/// By the time the compiler runs, every name it will ask about has been
/// declared and validated; the table is queried read-only. Field order is
/// authoritative: pattern binds and structure construction both follow the
/// order given at declaration.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    constructors: HashMap<String, Constructor>,
    procedures: HashSet<String>,
    functions: HashSet<String>,
    fields: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a constructor of `type_name` with its fields in source
    /// order. The field names also become field-accessor candidates.
    pub fn declare_constructor(
        &mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        fields: Vec<String>,
    ) {
        for field in &fields {
            self.fields.insert(field.clone());
        }
        self.constructors.insert(
            name.into(),
            Constructor {
                type_name: type_name.into(),
                fields,
            },
        );
    }

    pub fn declare_procedure(&mut self, name: impl Into<String>) {
        self.procedures.insert(name.into());
    }

    pub fn declare_function(&mut self, name: impl Into<String>) {
        self.functions.insert(name.into());
    }

    /// The type that owns `constructor`.
    pub fn constructor_type(&self, constructor: &str) -> Option<&str> {
        self.constructors
            .get(constructor)
            .map(|c| c.type_name.as_str())
    }

    /// Field names of `constructor`, in declaration order.
    pub fn constructor_fields(&self, constructor: &str) -> Option<&[String]> {
        self.constructors
            .get(constructor)
            .map(|c| c.fields.as_slice())
    }

    pub fn is_procedure(&self, name: &str) -> bool {
        self.procedures.contains(name)
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    pub fn is_field(&self, name: &str) -> bool {
        self.fields.contains(name)
    }
}
