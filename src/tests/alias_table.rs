use super::{single_unit_ast, structure, type_alias};
use crate::alias_table::{field_alias_name, FunctionAliasTable};
use crate::c_ast::{BuiltinType, Declaration, Parameter, TagKind, TypeArena};

#[test]
fn field_alias_names() {
  assert_eq!(field_alias_name("on_click"), "OnClickFn");
  assert_eq!(field_alias_name("callback"), "CallbackFn");
}

#[test]
fn collect_typedefs_and_fields() {
  let mut types = TypeArena::new();
  let void = types.builtin(BuiltinType::Void);
  let int = types.builtin(BuiltinType::Int);
  let log_fn = types.function(void, vec![Parameter::new("level", int)]);
  let log_fn_ptr = types.pointer(log_fn);
  let event_fn = types.function(void, vec![Parameter::new("code", int)]);
  let event_fn_ptr = types.pointer(event_fn);
  let handle = types.pointer(void);
  let ast = single_unit_ast(
    types,
    vec![
      type_alias("log_fn", log_fn_ptr),
      type_alias("handle_t", handle),
      Declaration::Struct(structure(
        "device",
        &[("on_event", event_fn_ptr), ("id", int)],
      )),
    ],
  );
  let table = FunctionAliasTable::collect(&ast);
  assert_eq!(table.function_alias_count(), 2);
  assert_eq!(table.function("log_fn"), Some(log_fn));
  assert_eq!(table.function("OnEventFn"), Some(event_fn));
  assert_eq!(table.function("IdFn"), None);
  assert_eq!(table.alias_of(event_fn), Some("OnEventFn"));
  let names: Vec<_> = table.function_aliases().map(|(name, _)| name).collect();
  assert_eq!(names, vec!["log_fn", "OnEventFn"]);

  assert_eq!(table.type_alias_count(), 1);
  let type_aliases: Vec<_> = table.type_aliases().collect();
  assert_eq!(type_aliases, vec![("handle_t", handle)]);
}

#[test]
fn first_registration_wins() {
  let mut types = TypeArena::new();
  let int = types.builtin(BuiltinType::Int);
  let first = types.function(int, vec![]);
  let second = types.function(int, vec![Parameter::new("x", int)]);
  let mut table = FunctionAliasTable::new();
  assert!(table.register_function("callback", first));
  assert!(!table.register_function("callback", second));
  assert_eq!(table.function("callback"), Some(first));
  assert_eq!(table.alias_of(second), None);

  assert!(table.register_function("other_name", first));
  assert_eq!(table.alias_of(first), Some("callback"));
  assert_eq!(table.function_alias_count(), 2);

  assert!(table.register_type_alias("handle", int));
  assert!(!table.register_type_alias("handle", first));
}

#[test]
fn equal_signatures_in_different_fields() {
  let mut types = TypeArena::new();
  let void = types.builtin(BuiltinType::Void);
  let on_open = types.function(void, vec![]);
  let on_open_ptr = types.pointer(on_open);
  let on_close = types.function(void, vec![]);
  let on_close_ptr = types.pointer(on_close);
  let ast = single_unit_ast(
    types,
    vec![Declaration::Struct(structure(
      "handlers",
      &[("on_open", on_open_ptr), ("on_close", on_close_ptr)],
    ))],
  );
  let table = FunctionAliasTable::collect(&ast);
  assert_eq!(table.function("OnOpenFn"), Some(on_open));
  assert_eq!(table.function("OnCloseFn"), Some(on_close));
}

#[test]
fn union_fields_are_ignored() {
  let mut types = TypeArena::new();
  let void = types.builtin(BuiltinType::Void);
  let function = types.function(void, vec![]);
  let function_ptr = types.pointer(function);
  let mut decl = structure("variant", &[("callback", function_ptr)]);
  decl.kind = TagKind::Union;
  let ast = single_unit_ast(types, vec![Declaration::Struct(decl)]);
  let table = FunctionAliasTable::collect(&ast);
  assert_eq!(table.function_alias_count(), 0);
}

#[test]
fn function_pointer_array_fields() {
  let mut types = TypeArena::new();
  let void = types.builtin(BuiltinType::Void);
  let handler = types.function(void, vec![]);
  let handler_ptr = types.pointer(handler);
  let handlers = types.array(handler_ptr, Some(4));
  let ast = single_unit_ast(
    types,
    vec![Declaration::Struct(structure("table", &[("handlers", handlers)]))],
  );
  let table = FunctionAliasTable::collect(&ast);
  assert_eq!(table.function("HandlersFn"), Some(handler));
  assert_eq!(table.alias_of(handler), Some("HandlersFn"));
}
