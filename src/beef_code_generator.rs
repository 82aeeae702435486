//! Emitters that turn the parsed header into Beef source text.
//!
//! Generation is a fixed sequence of stages (see `STAGES`). Each stage
//! appends to the context's output buffer and may fail; the first failure
//! stops the run and the buffered text is dropped.

use crate::alias_table::field_alias_name;
use crate::binding_context::{BindingContext, GeneratorOptions};
use crate::c_ast::{Ast, CType, Parameter, StructDecl, TagKind, TypeId};
use crate::errors::{ErrorKind, Result, ResultExt};
use crate::naming::{convert_name, fix_param_name, TypeMap};
use crate::type_resolver::is_direct_function_pointer;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info};
use regex::Regex;
use std::collections::HashSet;

type Stage = fn(&mut BindingContext) -> Result<()>;

/// Generation stages in output order.
const STAGES: &[(&str, Stage)] = &[
  ("usings", generate_usings),
  ("wrapper open", open_wrapper),
  ("functions", generate_functions),
  ("enums", generate_enums),
  ("structs", generate_structs),
  ("type aliases", generate_type_aliases),
  ("function aliases", generate_function_aliases),
  ("wrapper close", close_wrapper),
];

/// Generates the complete binding file for `ast`.
pub fn generate(ast: &Ast, options: &GeneratorOptions, type_map: &TypeMap) -> Result<String> {
  let mut ctx = BindingContext::new(ast, options, type_map);
  ctx.collect_aliases();
  debug!(
    "collected {} function aliases and {} type aliases",
    ctx.aliases.function_alias_count(),
    ctx.aliases.type_alias_count()
  );
  for &(name, stage) in STAGES {
    debug!("running stage: {}", name);
    stage(&mut ctx).chain_err(|| ErrorKind::StageFailed(name.to_string()))?;
  }
  info!(
    "generated {} lines ({} resolved types)",
    ctx.output.lines().len(),
    ctx.resolver.cached_count()
  );
  Ok(ctx.text())
}

fn append_comment(ctx: &mut BindingContext, comment: &Option<String>) {
  if let Some(comment) = comment {
    for line in comment.lines() {
      ctx.output.append(line.trim());
    }
  }
}

/// Writes imports and the namespace declaration.
pub fn generate_usings(ctx: &mut BindingContext) -> Result<()> {
  let namespace_regex = Regex::new(r"^[A-Za-z_]\w*(\.[A-Za-z_]\w*)*$")?;
  if !namespace_regex.is_match(&ctx.options.namespace) {
    return Err(
      ErrorKind::InvalidConfig(format!("invalid namespace: {:?}", ctx.options.namespace)).into(),
    );
  }
  ctx.output.append("using System;");
  ctx.output.append("using System.Interop;");
  ctx.output.blank();
  ctx.output.append(format!("namespace {};", ctx.options.namespace));
  ctx.output.blank();
  Ok(())
}

fn open_wrapper(ctx: &mut BindingContext) -> Result<()> {
  ctx
    .output
    .append(format!("public class {}", ctx.options.wrapper_class_name()));
  ctx.output.append("{");
  ctx.output.push_indent();
  Ok(())
}

fn close_wrapper(ctx: &mut BindingContext) -> Result<()> {
  ctx.output.pop_indent();
  ctx.output.append("}");
  Ok(())
}

/// Renders a parameter list. Names are camelCased, checked against
/// reserved words and made unique within the list.
fn parameter_list(ctx: &mut BindingContext, parameters: &[Parameter], is_variadic: bool) -> String {
  let mut used_names = HashSet::new();
  let mut items = Vec::new();
  for (index, parameter) in parameters.iter().enumerate() {
    let mut name = fix_param_name(&convert_name(&parameter.name, true));
    if !used_names.insert(name.clone()) {
      name = format!("{}{}", name, index + 1);
      used_names.insert(name.clone());
    }
    items.push(format!("{} {}", ctx.type_text(parameter.parameter_type), name));
  }
  if is_variadic {
    items.push("...".to_string());
  }
  items.iter().join(", ")
}

/// Writes an external declaration for every free function.
pub fn generate_functions(ctx: &mut BindingContext) -> Result<()> {
  let library_name = ctx.options.library_name.clone();
  if library_name.trim().is_empty() || library_name.contains('"') {
    return Err(ErrorKind::InvalidConfig(format!("invalid library name: {:?}", library_name)).into());
  }
  let ast = ctx.ast;
  for function in ast.functions() {
    if function.is_inline || function.is_operator {
      debug!("skipping function: {}", function.name);
      continue;
    }
    let return_type = ctx.type_text(function.return_type);
    let parameters = parameter_list(ctx, &function.parameters, function.is_variadic);
    append_comment(ctx, &function.comment);
    ctx
      .output
      .append(format!("[CLink, Import(\"{}\")]", library_name));
    ctx.output.append(format!(
      "public static extern {} {}({});",
      return_type,
      convert_name(&function.name, false),
      parameters
    ));
    ctx.output.blank();
  }
  Ok(())
}

/// Writes every enumeration with its items in declaration order.
/// Items of anonymous enumerations become integer constants of the
/// wrapper class.
pub fn generate_enums(ctx: &mut BindingContext) -> Result<()> {
  let ast = ctx.ast;
  for decl in ast.enums() {
    append_comment(ctx, &decl.comment);
    if decl.name.is_empty() {
      for item in &decl.items {
        append_comment(ctx, &item.comment);
        ctx
          .output
          .append(format!("public const c_int {} = {};", item.name, item.value));
      }
      ctx.output.blank();
      continue;
    }
    ctx.output.append("[AllowDuplicates]");
    ctx.output.append(format!("public enum {} : c_int", decl.name));
    ctx.output.append("{");
    ctx.output.push_indent();
    for item in &decl.items {
      append_comment(ctx, &item.comment);
      ctx
        .output
        .append(format!("case {} = {};", item.name, item.value));
    }
    ctx.output.pop_indent();
    ctx.output.append("}");
    ctx.output.blank();
  }
  Ok(())
}

/// Type of a struct field. Function pointers declared in place use the
/// alias synthesized from the field name; constant size arrays become
/// fixed arrays.
fn field_type_text(ctx: &mut BindingContext, field_name: &str, field_type: TypeId) -> String {
  let ast = ctx.ast;
  if is_direct_function_pointer(&ast.types, field_type) {
    return field_alias_name(field_name);
  }
  if let CType::Array {
    element,
    size: Some(size),
  } = *ast.types.get(field_type)
  {
    return format!("{}[{}]", field_type_text(ctx, field_name, element), size);
  }
  ctx.type_text(field_type)
}

fn generate_struct(ctx: &mut BindingContext, name: &str, decl: &StructDecl) {
  append_comment(ctx, &decl.comment);
  ctx.output.append("[CRepr]");
  ctx.output.append(format!("public struct {}", name));
  ctx.output.append("{");
  ctx.output.push_indent();

  let mut constructor_parameters = Vec::new();
  let mut assignments = IndexMap::new();
  for field in &decl.fields {
    let field_type = field_type_text(ctx, &field.name, field.field_type);
    let field_name = convert_name(&field.name, false);
    let parameter_name = fix_param_name(&convert_name(&field.name, true));
    append_comment(ctx, &field.comment);
    ctx
      .output
      .append(format!("public {} {};", field_type, field_name));
    ctx.output.blank();
    constructor_parameters.push(format!("{} {}", field_type, parameter_name));
    assignments.entry(field_name).or_insert(parameter_name);
  }

  if !decl.fields.is_empty() {
    ctx.output.append(format!(
      "public this({})",
      constructor_parameters.iter().join(", ")
    ));
    ctx.output.append("{");
    ctx.output.push_indent();
    for (field_name, parameter_name) in &assignments {
      ctx
        .output
        .append(format!("this.{} = {};", field_name, parameter_name));
    }
    ctx.output.pop_indent();
    ctx.output.append("}");
  }

  ctx.output.pop_indent();
  ctx.output.append("}");
  ctx.output.blank();
}

/// Writes every struct once, using the field list of its defining
/// declaration. Structs are written at the top indentation level.
pub fn generate_structs(ctx: &mut BindingContext) -> Result<()> {
  ctx.output.reset_indent();
  let ast = ctx.ast;
  let mut emitted = HashSet::new();
  for decl in ast.structs().filter(|s| s.kind == TagKind::Struct) {
    if decl.name.is_empty() || !emitted.insert(decl.name.as_str()) {
      continue;
    }
    let original = ast.original_struct(decl);
    if !original.is_definition {
      debug!("struct is only forward declared: {}", decl.name);
    }
    generate_struct(ctx, &decl.name, original);
  }
  Ok(())
}

/// Writes plain typedefs that don't render to their own name.
pub fn generate_type_aliases(ctx: &mut BindingContext) -> Result<()> {
  let aliases: Vec<(String, TypeId)> = ctx
    .aliases
    .type_aliases()
    .map(|(name, aliased)| (name.to_string(), aliased))
    .collect();
  for (name, aliased) in aliases {
    if ctx.type_map.is_known_name(&name) {
      continue;
    }
    let target = ctx.type_text(aliased);
    if target == name {
      continue;
    }
    ctx
      .output
      .append(format!("public typealias {} = {};", name, target));
    ctx.output.blank();
  }
  Ok(())
}

/// Writes a function type declaration for every registered alias.
pub fn generate_function_aliases(ctx: &mut BindingContext) -> Result<()> {
  let aliases: Vec<(String, TypeId)> = ctx
    .aliases
    .function_aliases()
    .map(|(name, function)| (name.to_string(), function))
    .collect();
  let ast = ctx.ast;
  for (name, function) in aliases {
    let signature = match *ast.types.get(function) {
      CType::Function(ref signature) => signature,
      _ => continue,
    };
    let return_type = ctx.type_text(signature.return_type);
    let parameters = parameter_list(ctx, &signature.parameters, signature.is_variadic);
    ctx.output.append(format!(
      "public function {} {}({});",
      return_type,
      convert_name(&name, false),
      parameters
    ));
    ctx.output.blank();
  }
  Ok(())
}
