//! Registry of function-pointer aliases and plain type aliases.

use crate::c_ast::{Ast, Declaration, TagKind, TypeId};
use crate::naming::convert_name;
use crate::type_resolver::function_signature;
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::trace;
use std::collections::HashMap;

/// Suffix of aliases synthesized from struct fields.
pub const FIELD_ALIAS_SUFFIX: &str = "Fn";

/// Returns the alias name synthesized for a function pointer field.
pub fn field_alias_name(field_name: &str) -> String {
  format!("{}{}", convert_name(field_name, false), FIELD_ALIAS_SUFFIX)
}

/// Aliases keyed by declaration name, in registration order.
///
/// Each name is registered at most once; later registrations of the same
/// name are ignored. Distinct names may refer to structurally equal
/// signatures and still get separate aliases.
#[derive(Debug, Default, Clone)]
pub struct FunctionAliasTable {
  function_aliases: IndexMap<String, TypeId>,
  first_alias_of_function: HashMap<TypeId, String>,
  type_aliases: IndexMap<String, TypeId>,
}

impl FunctionAliasTable {
  pub fn new() -> Self {
    FunctionAliasTable::default()
  }

  /// Runs the collection pass over all translation units of `ast`.
  pub fn collect(ast: &Ast) -> Self {
    let mut table = FunctionAliasTable::new();
    for declaration in ast.declarations() {
      match declaration {
        Declaration::TypeAlias(alias) => {
          match function_signature(&ast.types, alias.aliased_type) {
            Some(function) => {
              table.register_function(&alias.name, function);
            }
            None => {
              table.register_type_alias(&alias.name, alias.aliased_type);
            }
          }
        }
        Declaration::Struct(decl) if decl.kind == TagKind::Struct => {
          for field in &decl.fields {
            if let Some(function) = function_signature(&ast.types, field.field_type) {
              table.register_function(&field_alias_name(&field.name), function);
            }
          }
        }
        _ => {}
      }
    }
    table
  }

  /// Registers a function-pointer alias. Returns false if `name` was
  /// already taken.
  pub fn register_function(&mut self, name: &str, function: TypeId) -> bool {
    match self.function_aliases.entry(name.to_string()) {
      Entry::Occupied(_) => {
        trace!("function alias already registered: {}", name);
        false
      }
      Entry::Vacant(entry) => {
        entry.insert(function);
        self
          .first_alias_of_function
          .entry(function)
          .or_insert_with(|| name.to_string());
        true
      }
    }
  }

  /// Registers a non-function type alias. Returns false if `name` was
  /// already taken.
  pub fn register_type_alias(&mut self, name: &str, aliased_type: TypeId) -> bool {
    match self.type_aliases.entry(name.to_string()) {
      Entry::Occupied(_) => false,
      Entry::Vacant(entry) => {
        entry.insert(aliased_type);
        true
      }
    }
  }

  /// Name of the first alias registered for the function type `function`.
  pub fn alias_of(&self, function: TypeId) -> Option<&str> {
    self
      .first_alias_of_function
      .get(&function)
      .map(|s| s.as_str())
  }

  pub fn function(&self, name: &str) -> Option<TypeId> {
    self.function_aliases.get(name).cloned()
  }

  pub fn function_aliases(&self) -> impl Iterator<Item = (&str, TypeId)> {
    self
      .function_aliases
      .iter()
      .map(|(name, &function)| (name.as_str(), function))
  }

  pub fn type_aliases(&self) -> impl Iterator<Item = (&str, TypeId)> {
    self
      .type_aliases
      .iter()
      .map(|(name, &aliased)| (name.as_str(), aliased))
  }

  pub fn function_alias_count(&self) -> usize {
    self.function_aliases.len()
  }

  pub fn type_alias_count(&self) -> usize {
    self.type_aliases.len()
  }
}
