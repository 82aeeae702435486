//! Canonicalization of C types and their conversion to Beef type names.

use crate::alias_table::FunctionAliasTable;
use crate::c_ast::{CType, TypeArena, TypeId};
use crate::naming::{convert_name, TypeMap};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};

/// Name used when a type can't be expressed.
pub const FALLBACK_TYPE: &str = "void*";

/// Dereferences typedefs, pointers and arrays until a non-derived type
/// is reached. Stops at the last seen type if the chain loops.
pub fn canonical_type(types: &TypeArena, id: TypeId) -> TypeId {
  canonicalize(types, id, |_| false)
}

/// Same as `canonical_type`, but doesn't go through typedefs for which
/// `stop_at_typedef` returns true.
fn canonicalize<F: Fn(&str) -> bool>(types: &TypeArena, id: TypeId, stop_at_typedef: F) -> TypeId {
  let mut visited = HashSet::new();
  let mut current = id;
  loop {
    if !visited.insert(current) {
      trace!("type cycle detected at {}", types.display_name(current));
      return current;
    }
    let next = match *types.get(current) {
      CType::Typedef { ref name, .. } if stop_at_typedef(name) => None,
      _ => types.desugar(current),
    };
    match next {
      Some(next) => current = next,
      None => return current,
    }
  }
}

/// Counts pointer layers on the outside of the type. Typedefs are not
/// followed.
pub fn pointer_depth(types: &TypeArena, id: TypeId) -> usize {
  let mut depth = 0;
  let mut current = id;
  while let CType::Pointer { pointee, .. } = *types.get(current) {
    depth += 1;
    current = pointee;
  }
  depth
}

/// Counts every pointer layer crossed on the way to the type that
/// `resolve` names, including the ones behind typedefs. Arrays count as
/// pointers to their element. Typedefs for which `stop_at_typedef`
/// returns true end the walk.
pub fn resolved_pointer_depth<F: Fn(&str) -> bool>(
  types: &TypeArena,
  id: TypeId,
  stop_at_typedef: F,
) -> usize {
  let mut visited = HashSet::new();
  let mut depth = 0;
  let mut current = id;
  while visited.insert(current) {
    let next = match *types.get(current) {
      CType::Pointer { pointee: next, .. } | CType::Array { element: next, .. } => {
        depth += 1;
        Some(next)
      }
      CType::Typedef { ref name, .. } if stop_at_typedef(name) => None,
      _ => types.desugar(current),
    };
    match next {
      Some(next) => current = next,
      None => break,
    }
  }
  depth
}

/// Looks through pointers, arrays and typedefs for a function signature.
/// Returns the id of the function node, which is the identity used by
/// the alias table.
pub fn function_signature(types: &TypeArena, id: TypeId) -> Option<TypeId> {
  let mut visited = HashSet::new();
  let mut current = id;
  loop {
    if !visited.insert(current) {
      return None;
    }
    match *types.get(current) {
      CType::Pointer { pointee, .. } => current = pointee,
      CType::Array { element, .. } => current = element,
      CType::Typedef { aliased, .. } => current = aliased?,
      CType::Function(_) => return Some(current),
      CType::Builtin(_) | CType::Tagged { .. } | CType::Unresolved { .. } => return None,
    }
  }
}

/// Returns true if `id` is one or more pointer layers directly wrapping
/// a function type, without a typedef in between.
pub fn is_direct_function_pointer(types: &TypeArena, id: TypeId) -> bool {
  let mut current = id;
  let mut depth = 0;
  while let CType::Pointer { pointee, .. } = *types.get(current) {
    current = pointee;
    depth += 1;
  }
  depth > 0 && matches!(*types.get(current), CType::Function(_))
}

/// Converts types to Beef type names. Results are cached per type
/// identity, so one resolver must be used for one generation run.
#[derive(Debug, Default)]
pub struct TypeResolver {
  cache: HashMap<TypeId, String>,
}

impl TypeResolver {
  pub fn new() -> Self {
    TypeResolver::default()
  }

  pub fn cached_count(&self) -> usize {
    self.cache.len()
  }

  /// Returns the Beef name of the type `id` refers to, without pointer
  /// suffixes. Function pointer types resolve to the name of their
  /// registered alias.
  pub fn resolve(
    &mut self,
    types: &TypeArena,
    aliases: &FunctionAliasTable,
    type_map: &TypeMap,
    id: TypeId,
  ) -> String {
    if let Some(cached) = self.cache.get(&id) {
      return cached.clone();
    }
    let result = match function_signature(types, id) {
      Some(function) => alias_name_or_fallback(aliases, function),
      None => {
        let base = canonicalize(types, id, |name| type_map.is_known_name(name));
        match *types.get(base) {
          CType::Builtin(builtin) => type_map.convert_types(builtin.c_name()),
          CType::Typedef { ref name, .. } | CType::Tagged { ref name, .. } => {
            if name.is_empty() {
              FALLBACK_TYPE.to_string()
            } else {
              type_map.convert_types(name)
            }
          }
          CType::Function(_) => alias_name_or_fallback(aliases, base),
          CType::Pointer { .. } | CType::Array { .. } | CType::Unresolved { .. } => {
            debug!(
              "unresolved type, using {}: {}",
              FALLBACK_TYPE,
              types.display_name(id)
            );
            FALLBACK_TYPE.to_string()
          }
        }
      }
    };
    self.cache.insert(id, result.clone());
    result
  }
}

fn alias_name_or_fallback(aliases: &FunctionAliasTable, function: TypeId) -> String {
  match aliases.alias_of(function) {
    Some(alias) => convert_name(alias, false),
    None => FALLBACK_TYPE.to_string(),
  }
}
