//! Identifier conversion and the C to Beef primitive type table.

use crate::errors::Result;
use regex::{NoExpand, Regex};

/// Words that can't be used as parameter names in generated code.
const RESERVED_WORDS: &[&str] = &[
  "in", "out", "ref", "mut", "this", "params", "delegate", "base", "function", "internal",
  "var", "let", "new", "delete", "default", "case", "class", "struct", "scope", "append",
];

/// Built-in substitutions, applied in order. Multi-word names must stay
/// ahead of the single words they contain, and the pointer-sized entries
/// must stay after `int` because they produce `int`/`uint`.
const BUILTIN_TYPE_TABLE: &[(&str, &str)] = &[
  ("unsigned long long", "uint64"),
  ("long long", "int64"),
  ("unsigned long", "uint32"),
  ("long double", "double"),
  ("unsigned short", "uint16"),
  ("unsigned char", "uint8"),
  ("signed char", "int8"),
  ("unsigned int", "uint32"),
  ("uint8_t", "uint8"),
  ("int8_t", "int8"),
  ("uint16_t", "uint16"),
  ("int16_t", "int16"),
  ("uint32_t", "uint32"),
  ("int32_t", "int32"),
  ("uint64_t", "uint64"),
  ("int64_t", "int64"),
  ("UChar", "uint8"),
  ("ULongLong", "uint64"),
  ("LongLong", "int64"),
  ("ULong", "uint64"),
  ("UShort", "uint16"),
  ("Short", "int16"),
  ("Long", "int64"),
  ("WideChar", "char16"),
  ("UInt", "uint32"),
  ("Int", "int32"),
  ("Char", "char8"),
  ("Bool", "bool"),
  ("Void", "void"),
  ("INT", "int32"),
  ("STRING", "char8*"),
  ("FLOAT", "float"),
  ("DOUBLE", "double"),
  ("char", "char8"),
  ("wchar_t", "char16"),
  ("char16_t", "char16"),
  ("char32_t", "char32"),
  ("long", "int32"),
  ("short", "int16"),
  ("int", "int32"),
  ("_Bool", "bool"),
  ("va_list", "void*"),
  ("size_t", "uint"),
  ("uintptr_t", "uint"),
  ("ssize_t", "int"),
  ("ptrdiff_t", "int"),
  ("intptr_t", "int"),
];

/// Converts a snake_case identifier to PascalCase, or to camelCase
/// if `is_parameter` is true.
pub fn convert_name(identifier: &str, is_parameter: bool) -> String {
  identifier
    .split('_')
    .enumerate()
    .map(|(i, segment)| {
      if i == 0 && is_parameter {
        segment.to_string()
      } else {
        capitalize(segment)
      }
    })
    .collect()
}

fn capitalize(segment: &str) -> String {
  let mut chars = segment.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Makes `name` usable as a parameter name.
pub fn fix_param_name(name: &str) -> String {
  if name.trim().is_empty() {
    return "value".to_string();
  }
  // collides with the implicit receiver of struct constructors
  if name == "this" {
    return "allocator".to_string();
  }
  if RESERVED_WORDS.contains(&name) {
    return format!("{}Value", name);
  }
  name.to_string()
}

#[derive(Debug, Clone)]
struct TypeRule {
  pattern: String,
  replacement: String,
  regex: Regex,
}

impl TypeRule {
  fn new(pattern: &str, replacement: &str) -> Result<TypeRule> {
    Ok(TypeRule {
      pattern: pattern.to_string(),
      replacement: replacement.to_string(),
      regex: Regex::new(&format!(r"\b{}\b", regex::escape(pattern)))?,
    })
  }
}

/// Ordered list of whole-word substitutions that turn C type names
/// into Beef type names.
#[derive(Debug, Clone)]
pub struct TypeMap {
  rules: Vec<TypeRule>,
}

impl TypeMap {
  /// Creates the built-in table.
  pub fn new() -> Result<TypeMap> {
    TypeMap::with_extra_rules(&[])
  }

  /// Creates a table where `extra_rules` are evaluated before the
  /// built-in ones.
  pub fn with_extra_rules(extra_rules: &[(String, String)]) -> Result<TypeMap> {
    let mut rules = Vec::new();
    for (pattern, replacement) in extra_rules {
      rules.push(TypeRule::new(pattern, replacement)?);
    }
    for &(pattern, replacement) in BUILTIN_TYPE_TABLE {
      rules.push(TypeRule::new(pattern, replacement)?);
    }
    Ok(TypeMap { rules })
  }

  /// Returns true if `name` is exactly one of the table's patterns.
  pub fn is_known_name(&self, name: &str) -> bool {
    self.rules.iter().any(|rule| rule.pattern == name)
  }

  /// Applies every substitution in order, then removes a leading `const`
  /// and a leading `unsigned` qualifier that survived the table.
  pub fn convert_types(&self, text: &str) -> String {
    let mut output = text.to_string();
    for rule in &self.rules {
      output = rule
        .regex
        .replace_all(&output, NoExpand(&rule.replacement))
        .into_owned();
    }
    while let Some(rest) = output.strip_prefix("const ") {
      output = rest.trim_start().to_string();
    }
    if output == "unsigned" {
      return "uint32".to_string();
    }
    if !output.ends_with("int") {
      if let Some(rest) = output.strip_prefix("unsigned ") {
        output = rest.trim_start().to_string();
      }
    }
    output
  }
}
