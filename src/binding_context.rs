//! State shared by all emitters during one generation run.

use crate::alias_table::FunctionAliasTable;
use crate::c_ast::{Ast, CType, TypeId};
use crate::naming::TypeMap;
use crate::type_resolver::{
  function_signature, is_direct_function_pointer, pointer_depth, resolved_pointer_depth,
  TypeResolver,
};

/// Append-only list of output lines with an indentation counter.
#[derive(Debug, Default)]
pub struct OutputBuffer {
  lines: Vec<String>,
  indent: usize,
}

impl OutputBuffer {
  pub fn new() -> Self {
    OutputBuffer::default()
  }

  /// Appends `line` prefixed by one tab per indentation level.
  pub fn append<S: AsRef<str>>(&mut self, line: S) {
    let mut text = "\t".repeat(self.indent);
    text.push_str(line.as_ref());
    self.lines.push(text);
  }

  pub fn blank(&mut self) {
    self.lines.push(String::new());
  }

  pub fn push_indent(&mut self) {
    self.indent += 1;
  }

  /// Decrements the indentation. Stays at zero if already there.
  pub fn pop_indent(&mut self) {
    self.indent = self.indent.saturating_sub(1);
  }

  pub fn reset_indent(&mut self) {
    self.indent = 0;
  }

  pub fn indent(&self) -> usize {
    self.indent
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// Full text, one newline after every line.
  pub fn to_text(&self) -> String {
    let mut text = String::new();
    for line in &self.lines {
      text.push_str(line);
      text.push('\n');
    }
    text
  }
}

/// Names configured by the user that appear verbatim in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
  /// Dynamic library name used in every `Import` attribute
  pub library_name: String,
  /// Namespace of the generated file; its last segment also names
  /// the wrapper class
  pub namespace: String,
}

impl GeneratorOptions {
  pub fn new<S1: Into<String>, S2: Into<String>>(library_name: S1, namespace: S2) -> Self {
    GeneratorOptions {
      library_name: library_name.into(),
      namespace: namespace.into(),
    }
  }

  pub fn wrapper_class_name(&self) -> String {
    let last = self.namespace.rsplit('.').next().unwrap_or("");
    format!("{}API", last)
  }
}

/// Everything one generation run needs: the parsed header, the alias
/// registry, the type cache and the output.
pub struct BindingContext<'a> {
  pub ast: &'a Ast,
  pub options: &'a GeneratorOptions,
  pub type_map: &'a TypeMap,
  pub aliases: FunctionAliasTable,
  pub resolver: TypeResolver,
  pub output: OutputBuffer,
}

impl<'a> BindingContext<'a> {
  pub fn new(ast: &'a Ast, options: &'a GeneratorOptions, type_map: &'a TypeMap) -> Self {
    BindingContext {
      ast,
      options,
      type_map,
      aliases: FunctionAliasTable::new(),
      resolver: TypeResolver::new(),
      output: OutputBuffer::new(),
    }
  }

  /// Fills the alias table. Must run before any emission.
  pub fn collect_aliases(&mut self) {
    self.aliases = FunctionAliasTable::collect(self.ast);
  }

  pub fn resolve_type(&mut self, id: TypeId) -> String {
    self
      .resolver
      .resolve(&self.ast.types, &self.aliases, self.type_map, id)
  }

  pub fn pointer_depth(&self, id: TypeId) -> usize {
    pointer_depth(&self.ast.types, id)
  }

  /// Resolved type followed by its pointer suffix. The pointer layer
  /// that makes a function pointer is part of the alias and is not
  /// repeated. Pointers behind typedefs are kept in the suffix. Arrays are
  /// rendered as pointers to their element.
  pub fn type_text(&mut self, id: TypeId) -> String {
    let ast = self.ast;
    let types = &ast.types;
    if let CType::Array { element, .. } = *types.get(id) {
      return format!("{}*", self.type_text(element));
    }
    let suffix_depth = if function_signature(types, id).is_some() {
      let depth = self.pointer_depth(id);
      if is_direct_function_pointer(types, id) {
        depth - 1
      } else {
        depth
      }
    } else {
      let type_map = self.type_map;
      resolved_pointer_depth(types, id, |name| type_map.is_known_name(name))
    };
    format!("{}{}", self.resolve_type(id), pointer_suffix(suffix_depth))
  }

  pub fn text(&self) -> String {
    self.output.to_text()
  }
}

pub fn pointer_suffix(depth: usize) -> String {
  "*".repeat(depth)
}
